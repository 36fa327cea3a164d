use async_trait::async_trait;

use crate::modbus::client::ModbusClientTrait;
use crate::registry::ParameterSpec;
use crate::utils::error::BridgeError;

#[async_trait]
pub trait Device: Send + Sync {
    fn device_type(&self) -> &str;
    fn address(&self) -> u8;
    fn name(&self) -> &str;

    /// Read one parameter and return its scaled, rounded value.
    async fn read_parameter(
        &self,
        client: &dyn ModbusClientTrait,
        spec: &ParameterSpec,
    ) -> Result<f64, BridgeError>;
}
