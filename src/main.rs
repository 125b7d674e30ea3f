use clap::Parser;
use home_security::config::{self, Config};
use home_security::error::Result;
use home_security::image::FakeImageAnalyzer;
use home_security::input::simulation::run_security_simulation;
use home_security::repository::{InMemoryRepository, JsonFileRepository, SecurityRepository};
use home_security::security::{AlarmController, ArmingStatus, LoggingListener, Sensor, SensorType};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;

/// Home security controller daemon.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file holding sensors and statuses
    #[arg(long, env = "SECURITY_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Keep state in memory instead of a file
    #[arg(long)]
    in_memory: bool,

    /// Arming status to apply on startup (disarmed, armed_home, armed_away)
    #[arg(long, value_parser = parse_arming_status)]
    arm: Option<ArmingStatus>,

    /// Seconds between simulation steps
    #[arg(long)]
    interval: Option<u64>,

    /// Do not run the sensor/camera simulation
    #[arg(long)]
    no_simulation: bool,
}

fn parse_arming_status(value: &str) -> std::result::Result<ArmingStatus, String> {
    ArmingStatus::parse(value).map_err(|e| e.to_string())
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn open_repository(config: &Config) -> Result<Arc<dyn SecurityRepository>> {
    let repository: Arc<dyn SecurityRepository> = if config.storage.in_memory {
        info!("Using in-memory security state");
        Arc::new(InMemoryRepository::new())
    } else {
        Arc::new(JsonFileRepository::open(&config.storage.state_file)?)
    };
    Ok(repository)
}

/// Register the default door, window and motion sensors on first start.
fn seed_sensors(controller: &AlarmController) -> Result<()> {
    if !controller.sensors()?.is_empty() {
        return Ok(());
    }
    info!("No sensors registered, adding defaults");
    controller.add_sensor(Sensor::new("Front Door", SensorType::Door))?;
    controller.add_sensor(Sensor::new("Living Room Window", SensorType::Window))?;
    controller.add_sensor(Sensor::new("Hallway Motion", SensorType::Motion))?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    config::load_dotenv();
    init_logger();
    info!("Starting Home Security Controller");

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(path) = args.state_file {
        config.storage.state_file = path;
    }
    if args.in_memory {
        config.storage.in_memory = true;
    }
    if let Some(secs) = args.interval.filter(|s| *s > 0) {
        config.simulation.interval_secs = secs;
    }
    if args.no_simulation {
        config.simulation.enabled = false;
    }

    info!("Configuration loaded:");
    info!("  State file: {}", config.storage.state_file.display());
    info!("  In memory: {}", config.storage.in_memory);
    info!(
        "  Confidence threshold: {:.1}%",
        config.controller.confidence_threshold
    );

    let repository = match open_repository(&config) {
        Ok(repository) => repository,
        Err(e) => {
            error!("Failed to open security state: {}", e);
            std::process::exit(1);
        }
    };

    let controller = Arc::new(
        AlarmController::new(repository, Arc::new(FakeImageAnalyzer))
            .with_confidence_threshold(config.controller.confidence_threshold),
    );
    controller.add_status_listener(Arc::new(LoggingListener));

    if let Err(e) = seed_sensors(&controller) {
        error!("Failed to register sensors: {}", e);
        std::process::exit(1);
    }

    if let Some(status) = args.arm
        && let Err(e) = controller.set_arming_status(status)
    {
        error!("Failed to set arming status: {}", e);
        std::process::exit(1);
    }

    match (controller.arming_status(), controller.alarm_status()) {
        (Ok(arming), Ok(alarm)) => info!(
            "Home Security Controller is running ({}, {})",
            arming.description(),
            alarm.description()
        ),
        (Err(e), _) | (_, Err(e)) => error!("Failed to read status: {}", e),
    }
    info!("  - Press Ctrl+C to exit");

    let simulation = config.simulation.enabled.then(|| {
        info!(
            "Simulating sensors and camera every {}s",
            config.simulation.interval_secs
        );
        run_security_simulation(
            controller.clone(),
            Duration::from_secs(config.simulation.interval_secs),
        )
    });

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    if let Some(task) = simulation {
        task.abort();
    }

    if let Ok(alarm) = controller.alarm_status() {
        info!("Final alarm status: {}", alarm.description());
    }
    info!("Home Security Controller stopped");
}
