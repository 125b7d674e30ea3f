//! Camera frames and the image-analysis port.
//!
//! Frames are opaque to the controller: it only hands them to an
//! [`ImageAnalyzer`] and acts on the boolean verdict. Low-confidence
//! results are the analyzer's concern and must collapse to `false`.

use crate::error::Result;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};

/// A raw camera frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl CameraFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// A zero-filled frame of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![0; Self::pixel_count(width, height)])
    }

    /// One byte per pixel, saturating where `usize` cannot hold the product.
    pub fn pixel_count(width: u32, height: u32) -> usize {
        (width as usize).saturating_mul(height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decides whether a frame contains a cat.
pub trait ImageAnalyzer: Send + Sync {
    /// Return `true` only if a cat is found with confidence of at least
    /// `confidence_threshold` percent.
    fn contains_cat(&self, frame: &CameraFrame, confidence_threshold: f32) -> Result<bool>;
}

/// Analyzer that ignores the frame and answers at random.
///
/// Stands in for a real classification service during simulation.
#[derive(Debug, Default)]
pub struct FakeImageAnalyzer;

impl ImageAnalyzer for FakeImageAnalyzer {
    fn contains_cat(&self, _frame: &CameraFrame, _confidence_threshold: f32) -> Result<bool> {
        Ok(rand::thread_rng().gen_bool(0.5))
    }
}

/// Analyzer with a settable, fixed verdict.
#[derive(Debug, Default)]
pub struct FixedImageAnalyzer {
    verdict: AtomicBool,
}

impl FixedImageAnalyzer {
    pub fn new(verdict: bool) -> Self {
        Self {
            verdict: AtomicBool::new(verdict),
        }
    }

    pub fn set_verdict(&self, verdict: bool) {
        self.verdict.store(verdict, Ordering::SeqCst);
    }
}

impl ImageAnalyzer for FixedImageAnalyzer {
    fn contains_cat(&self, _frame: &CameraFrame, _confidence_threshold: f32) -> Result<bool> {
        Ok(self.verdict.load(Ordering::SeqCst))
    }
}
