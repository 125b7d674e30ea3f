use crate::security::DEFAULT_CONFIDENCE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split `.env` content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let mut value = value.trim();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            Some((key.trim(), value))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub controller: ControllerConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Minimum cat-detection confidence, in percent.
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_file: PathBuf,
    /// Keep state in memory only; `state_file` is ignored.
    pub in_memory: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

/// Default location of the JSON state file.
pub fn default_state_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("home-security").join("state.json"))
        .unwrap_or_else(|| PathBuf::from("security-state.json"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller: ControllerConfig {
                confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            },
            storage: StorageConfig {
                state_file: default_state_file(),
                in_memory: false,
            },
            simulation: SimulationConfig {
                enabled: true,
                interval_secs: 10,
            },
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(threshold) = std::env::var("SECURITY_CONFIDENCE_THRESHOLD")
            && let Ok(t) = threshold.parse()
        {
            config.controller.confidence_threshold = t;
        }

        // Storage configuration
        if let Ok(path) = std::env::var("SECURITY_STATE_FILE") {
            config.storage.state_file = PathBuf::from(path);
        }
        if let Ok(in_memory) = std::env::var("SECURITY_IN_MEMORY")
            && let Some(flag) = parse_flag(&in_memory)
        {
            config.storage.in_memory = flag;
        }

        // Simulation configuration
        if let Ok(enabled) = std::env::var("SECURITY_SIM_ENABLED")
            && let Some(flag) = parse_flag(&enabled)
        {
            config.simulation.enabled = flag;
        }
        if let Ok(interval) = std::env::var("SECURITY_SIM_INTERVAL_SECS")
            && let Ok(secs) = interval.parse::<u64>()
            && secs > 0
        {
            config.simulation.interval_secs = secs;
        }

        config
    }
}
