use async_trait::async_trait;
use log::debug;

use super::traits::Device;
use crate::modbus::client::ModbusClientTrait;
use crate::registry::ParameterSpec;
use crate::utils::error::BridgeError;

/// An energy meter on the RS485 bus exposing float registers.
#[derive(Debug, Clone)]
pub struct MeterDevice {
    pub address: u8,
    pub name: String,
}

impl MeterDevice {
    pub fn new(address: u8, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Device for MeterDevice {
    fn device_type(&self) -> &str {
        "EnergyMeter"
    }

    fn address(&self) -> u8 {
        self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn read_parameter(
        &self,
        client: &dyn ModbusClientTrait,
        spec: &ParameterSpec,
    ) -> Result<f64, BridgeError> {
        let raw = client.read_float(self.address, spec.address).await?;
        let value = spec.transform(raw as f64);
        debug!(
            "📊 Register 0x{:04X} on device {}: raw {} -> {}",
            spec.address, self.address, raw, value
        );
        Ok(value)
    }
}
