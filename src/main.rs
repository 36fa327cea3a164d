use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use meter_bridge::{
    BatchBuilder, BridgeError, BridgeService, InfluxSender, MeterDevice, ModbusClient, Profile,
    ProfileRegistry, Settings, Termination,
};

const EXIT_STARTUP_FAILED: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

fn load_profile(settings: &Settings) -> Result<Profile, BridgeError> {
    let mut registry = ProfileRegistry::builtin();
    if let Some(path) = &settings.profiles_file {
        info!("📂 Loading profiles from {}", path.display());
        registry = registry.merge_file(path)?;
    }
    registry.select(settings.profile.as_deref())
}

async fn run(settings: Settings) -> Result<ExitCode> {
    let profile = match settings.validate().and_then(|_| load_profile(&settings)) {
        Ok(profile) => profile,
        Err(e) => {
            error!("❌ {}", e);
            error!("Quitting ...");
            return Ok(ExitCode::from(EXIT_CONFIG_ERROR));
        }
    };

    settings.log_summary();

    let client = match ModbusClient::new(&settings.device) {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Cannot start without the meter: {}", e);
            return Ok(ExitCode::from(EXIT_STARTUP_FAILED));
        }
    };

    let builder = BatchBuilder::new(settings.influx.measurement.as_str(), settings.influx.tags.as_str())
        .with_point_timestamps(settings.influx.point_timestamps);

    let mut service = BridgeService::new(
        profile,
        Box::new(MeterDevice::new(settings.device.slave_address, "Energy Meter")),
        Box::new(client),
        Box::new(InfluxSender::new(&settings.influx)),
        builder,
        settings.read_interval(),
    )
    .with_dry_run(settings.dry_run_enabled());

    let code = match service.run().await {
        Termination::DryRunComplete => {
            info!("👋 Dry run finished");
            ExitCode::SUCCESS
        }
        Termination::StartupFailed => ExitCode::from(EXIT_STARTUP_FAILED),
    };
    Ok(code)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let settings = Settings::parse();
    init_logging();

    info!("🖥️  Meter Bridge v{}", meter_bridge::VERSION);
    run(settings).await
}
