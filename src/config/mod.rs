pub mod settings;

pub use settings::{DeviceSettings, InfluxSettings, ParityConfig, Settings, StopBitsConfig};
