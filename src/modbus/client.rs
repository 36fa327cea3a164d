use async_trait::async_trait;
use log::{debug, error, info};
use serialport::{ClearBuffer, SerialPort};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

use super::protocol::{
    build_read_request, decode_f32_be, parse_read_response, EXCEPTION_FLAG, FLOAT_REGISTERS,
};
use crate::config::settings::{DeviceSettings, ParityConfig, StopBitsConfig};
use crate::utils::error::BridgeError;

#[async_trait]
pub trait ModbusClientTrait: Send + Sync {
    async fn read_holding_registers(
        &self,
        slave_id: u8,
        start_addr: u16,
        count: u16,
    ) -> Result<Vec<u8>, BridgeError>;

    /// Read one big-endian float stored in two holding registers.
    async fn read_float(&self, slave_id: u8, address: u16) -> Result<f32, BridgeError> {
        let data = self.read_holding_registers(slave_id, address, FLOAT_REGISTERS).await?;
        decode_f32_be(&data)
    }
}

pub struct ModbusClient {
    port: Arc<Mutex<Box<dyn SerialPort>>>,
}

impl ModbusClient {
    pub fn new(settings: &DeviceSettings) -> Result<Self, BridgeError> {
        info!("🔌 Connecting to Modbus RTU port: {}", settings.path);
        info!(
            "⚙️  Configuration: {} baud, {} data bits, parity {:?}, {:?} stop bit(s), {}s timeout",
            settings.baud_rate, settings.byte_size, settings.parity, settings.stop_bits, settings.timeout_secs
        );

        let data_bits = match settings.byte_size {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(BridgeError::ConfigError(format!("Unsupported byte size: {}", other)));
            }
        };

        let parity = match settings.parity {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Even => serialport::Parity::Even,
            ParityConfig::Odd => serialport::Parity::Odd,
        };

        let stop_bits = match settings.stop_bits {
            StopBitsConfig::One => serialport::StopBits::One,
            StopBitsConfig::Two => serialport::StopBits::Two,
        };

        let port = serialport::new(settings.path.as_str(), settings.baud_rate)
            .timeout(settings.timeout())
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .open()
            .map_err(|e| {
                error!("❌ Failed to open serial port {}: {}", settings.path, e);
                BridgeError::ConnectionError(format!("Failed to open port: {}", e))
            })?;

        info!("✅ Modbus RTU connection established successfully");
        Ok(Self {
            port: Arc::new(Mutex::new(port)),
        })
    }

    fn read_frame(port: &mut Box<dyn SerialPort>) -> Result<Vec<u8>, BridgeError> {
        // slave id, function code, then either exception code or byte count
        let mut frame = vec![0u8; 3];
        port.read_exact(&mut frame)?;

        let remaining = if frame[1] & EXCEPTION_FLAG != 0 {
            2
        } else {
            frame[2] as usize + 2
        };

        let start = frame.len();
        frame.resize(start + remaining, 0);
        port.read_exact(&mut frame[start..])?;
        Ok(frame)
    }
}

#[async_trait]
impl ModbusClientTrait for ModbusClient {
    async fn read_holding_registers(
        &self,
        slave_id: u8,
        start_addr: u16,
        count: u16,
    ) -> Result<Vec<u8>, BridgeError> {
        let request = build_read_request(slave_id, start_addr, count);
        debug!("📤 Slave {} request: {}", slave_id, hex::encode(&request));

        let mut port = self.port.lock().map_err(|_| BridgeError::LockError)?;

        port.clear(ClearBuffer::All)?;
        port.write_all(&request)
            .map_err(|e| BridgeError::CommunicationError(format!("Write failed: {}", e)))?;
        port.flush()
            .map_err(|e| BridgeError::CommunicationError(format!("Flush failed: {}", e)))?;

        let response = Self::read_frame(&mut port)?;
        debug!("📥 Slave {} response: {}", slave_id, hex::encode(&response));

        parse_read_response(slave_id, count, &response)
    }
}
