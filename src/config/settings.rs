use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, ValueEnum};
use log::info;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::error::BridgeError;

/// Bridge settings. Every flag falls back to the environment variable named
/// next to it, so a container can be configured purely through its env.
#[derive(Debug, Clone, Parser)]
#[command(name = "meter-bridge", version, about = "Poll an energy meter over Modbus RTU and publish readings to InfluxDB")]
pub struct Settings {
    /// Name of the parameter profile to poll
    #[arg(long = "profile", env = "DICT_TYPE")]
    pub profile: Option<String>,

    /// TOML file with additional profiles
    #[arg(long = "profiles-file", env = "PROFILES_FILE")]
    pub profiles_file: Option<PathBuf>,

    #[command(flatten)]
    pub device: DeviceSettings,

    #[command(flatten)]
    pub influx: InfluxSettings,

    /// Pause between cycles, in seconds
    #[arg(long = "read-freq", env = "READ_FREQ", default_value_t = 10)]
    pub read_freq_secs: u64,

    /// Print one batch and exit when non-zero
    #[arg(long = "dry-run", env = "DRY_RUN", default_value_t = 0)]
    pub dry_run: i64,
}

#[derive(Debug, Clone, Args)]
pub struct DeviceSettings {
    /// Serial device path
    #[arg(long = "dev-path", env = "DEV_PATH", default_value = "/dev/ttyUSB0")]
    pub path: String,

    /// Modbus slave address of the meter
    #[arg(long = "dev-slave-addr", env = "DEV_SLAVE_ADDR", default_value_t = 1)]
    pub slave_address: u8,

    #[arg(long = "dev-baudrate", env = "DEV_BAUDRATE", default_value_t = 9600)]
    pub baud_rate: u32,

    #[arg(long = "dev-bytesize", env = "DEV_BYTESIZE", default_value_t = 8)]
    pub byte_size: u8,

    #[arg(long = "dev-parity", env = "DEV_PARITY", value_enum, default_value_t = ParityConfig::None)]
    pub parity: ParityConfig,

    #[arg(long = "dev-stopbits", env = "DEV_STOPBITS", value_enum, default_value_t = StopBitsConfig::One)]
    pub stop_bits: StopBitsConfig,

    /// Per-read timeout, in seconds
    #[arg(long = "dev-timeout", env = "DEV_TIMEOUT", default_value_t = 1)]
    pub timeout_secs: u64,
}

impl DeviceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Args)]
pub struct InfluxSettings {
    /// InfluxDB base URL
    #[arg(long = "url", env = "URL")]
    pub url: String,

    /// InfluxDB port, applied when the URL has none
    #[arg(long = "port", env = "PORT")]
    pub port: u16,

    #[arg(long = "token", env = "TOKEN", hide_env_values = true)]
    pub token: String,

    #[arg(long = "org", env = "ORG")]
    pub org: String,

    #[arg(long = "bucket", env = "BUCKET")]
    pub bucket: String,

    #[arg(long = "measurement", env = "MEASUREMENT")]
    pub measurement: String,

    /// Tag set appended to the measurement, e.g. "site=home,meter=main"
    #[arg(long = "tags", env = "TAGS", default_value = "")]
    pub tags: String,

    /// Publish timeout, in seconds
    #[arg(long = "write-timeout", env = "WRITE_TIMEOUT", default_value_t = 10)]
    pub write_timeout_secs: u64,

    /// Stamp every point with the cycle time instead of the server arrival time
    #[arg(
        long = "point-timestamps",
        env = "POINT_TIMESTAMPS",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value_t = false
    )]
    pub point_timestamps: bool,
}

impl InfluxSettings {
    /// Base URL with the configured port applied unless the URL names one.
    pub fn endpoint(&self) -> String {
        let url = self.url.trim().trim_end_matches('/');
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("https", url),
        };
        let (host, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        if host_has_port(host) {
            format!("{}://{}{}", scheme, host, path)
        } else {
            format!("{}://{}:{}{}", scheme, host, self.port, path)
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

fn host_has_port(host: &str) -> bool {
    if host.ends_with(']') {
        return false;
    }
    host.rsplit_once(':')
        .map(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

impl fmt::Debug for InfluxSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxSettings")
            .field("url", &self.url)
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("measurement", &self.measurement)
            .field("tags", &self.tags)
            .field("write_timeout_secs", &self.write_timeout_secs)
            .field("point_timestamps", &self.point_timestamps)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParityConfig {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StopBitsConfig {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl Settings {
    pub fn dry_run_enabled(&self) -> bool {
        self.dry_run != 0
    }

    pub fn read_interval(&self) -> Duration {
        Duration::from_secs(self.read_freq_secs)
    }

    /// Structural checks clap cannot express.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if !(1..=247).contains(&self.device.slave_address) {
            return Err(BridgeError::ConfigError(format!(
                "Invalid slave address {}, must be 1-247",
                self.device.slave_address
            )));
        }
        if !(5..=8).contains(&self.device.byte_size) {
            return Err(BridgeError::ConfigError(format!(
                "Invalid byte size {}, must be 5-8",
                self.device.byte_size
            )));
        }
        if self.device.timeout_secs == 0 {
            return Err(BridgeError::ConfigError("Device timeout must be at least 1 second".to_string()));
        }
        if self.influx.measurement.trim().is_empty() {
            return Err(BridgeError::ConfigError("Measurement name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            "🔌 Device: {} slave {} @ {} baud",
            self.device.path, self.device.slave_address, self.device.baud_rate
        );
        info!(
            "🗄️  Store: {} org '{}' bucket '{}' measurement '{}'",
            self.influx.endpoint(),
            self.influx.org,
            self.influx.bucket,
            self.influx.measurement
        );
        info!("⏱️  Interval: {} seconds", self.read_freq_secs);
        if self.dry_run_enabled() {
            info!("🧪 Dry-run mode: one batch will be printed, nothing is sent");
        }
    }
}
