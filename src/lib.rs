//! Energy Meter Telemetry Bridge
//!
//! Polls a fixed profile of parameters from a Modbus RTU energy meter,
//! scales and rounds each value, and publishes every cycle's readings to
//! InfluxDB as one line-protocol batch. Read and write failures are counted
//! per session and per week instead of stopping the service, except on the
//! very first cycle.

pub mod config;
pub mod registry;
pub mod modbus;
pub mod devices;
pub mod output;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use devices::{Device, MeterDevice, Reading};
pub use modbus::{ModbusClient, ModbusClientTrait};
pub use output::{Batch, BatchBuilder, BatchPublisher, InfluxSender};
pub use registry::{ParameterSpec, Profile, ProfileRegistry};
pub use services::{BridgeService, CycleOutcome, ErrorCounters, Termination};
pub use utils::error::BridgeError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
