pub mod client;
pub mod protocol;
pub mod crc;

pub use client::{ModbusClient, ModbusClientTrait};
pub use crc::crc16_modbus;
