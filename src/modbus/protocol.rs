use crate::modbus::crc::{append_crc, crc16_modbus};
use crate::utils::error::BridgeError;

pub const READ_HOLDING_REGISTERS: u8 = 0x03;
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Registers occupied by one 32-bit float.
pub const FLOAT_REGISTERS: u16 = 2;

pub fn build_read_request(slave_id: u8, start_addr: u16, count: u16) -> Vec<u8> {
    let mut request = vec![slave_id, READ_HOLDING_REGISTERS];
    request.extend_from_slice(&start_addr.to_be_bytes());
    request.extend_from_slice(&count.to_be_bytes());
    append_crc(&mut request);
    request
}

/// Validate a complete RTU response to a read request and return its data bytes.
pub fn parse_read_response(slave_id: u8, count: u16, frame: &[u8]) -> Result<Vec<u8>, BridgeError> {
    if frame.len() < 5 {
        return Err(BridgeError::InvalidResponse(format!("Frame too short: {} bytes", frame.len())));
    }

    let data_len = frame.len() - 2;
    let received_crc = u16::from_le_bytes([frame[data_len], frame[data_len + 1]]);
    let calculated_crc = crc16_modbus(&frame[..data_len]);
    if received_crc != calculated_crc {
        return Err(BridgeError::CrcError {
            expected: calculated_crc,
            received: received_crc,
        });
    }

    if frame[0] != slave_id {
        return Err(BridgeError::InvalidResponse(format!(
            "Reply from slave {} while talking to {}",
            frame[0], slave_id
        )));
    }

    if frame[1] == READ_HOLDING_REGISTERS | EXCEPTION_FLAG {
        return Err(BridgeError::ModbusException {
            function: READ_HOLDING_REGISTERS,
            code: frame[2],
        });
    }

    if frame[1] != READ_HOLDING_REGISTERS {
        return Err(BridgeError::InvalidResponse(format!("Unexpected function code 0x{:02X}", frame[1])));
    }

    let byte_count = frame[2] as usize;
    if byte_count != count as usize * 2 || data_len != 3 + byte_count {
        return Err(BridgeError::InvalidResponse(format!(
            "Byte count {} does not match {} requested registers",
            byte_count, count
        )));
    }

    Ok(frame[3..data_len].to_vec())
}

/// Decode a big-endian float from two consecutive registers.
pub fn decode_f32_be(data: &[u8]) -> Result<f32, BridgeError> {
    let bytes: [u8; 4] = data
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| BridgeError::InvalidData(format!("Need 4 bytes for a float, got {}", data.len())))?;

    let value = f32::from_be_bytes(bytes);
    if !value.is_finite() {
        return Err(BridgeError::InvalidData(format!(
            "Register pair 0x{} is not a finite float",
            hex::encode(bytes)
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(slave_id: u8, data: &[u8]) -> Vec<u8> {
        let mut frame = vec![slave_id, READ_HOLDING_REGISTERS, data.len() as u8];
        frame.extend_from_slice(data);
        append_crc(&mut frame);
        frame
    }

    #[test]
    fn request_frame_layout() {
        let request = build_read_request(1, 0x2006, 2);
        assert_eq!(&request[..6], &[0x01, 0x03, 0x20, 0x06, 0x00, 0x02]);
        assert_eq!(request.len(), 8);
        assert_eq!(crc16_modbus(&request), 0);
    }

    #[test]
    fn parses_valid_float_response() {
        let frame = response(1, &230.5f32.to_be_bytes());
        let data = parse_read_response(1, 2, &frame).unwrap();
        assert_eq!(decode_f32_be(&data).unwrap(), 230.5);
    }

    #[test]
    fn rejects_corrupted_crc() {
        let mut frame = response(1, &1.0f32.to_be_bytes());
        frame[4] ^= 0xFF;
        assert!(matches!(parse_read_response(1, 2, &frame), Err(BridgeError::CrcError { .. })));
    }

    #[test]
    fn rejects_wrong_slave() {
        let frame = response(2, &1.0f32.to_be_bytes());
        assert!(matches!(parse_read_response(1, 2, &frame), Err(BridgeError::InvalidResponse(_))));
    }

    #[test]
    fn maps_exception_frame() {
        let mut frame = vec![0x01, 0x83, 0x02];
        append_crc(&mut frame);
        assert!(matches!(
            parse_read_response(1, 2, &frame),
            Err(BridgeError::ModbusException { function: 0x03, code: 0x02 })
        ));
    }

    #[test]
    fn rejects_short_byte_count() {
        let frame = response(1, &[0x00, 0x01]);
        assert!(parse_read_response(1, 2, &frame).is_err());
    }

    #[test]
    fn non_finite_float_is_a_decode_error() {
        assert!(decode_f32_be(&f32::NAN.to_be_bytes()).is_err());
        assert!(decode_f32_be(&[0x00, 0x01]).is_err());
    }
}
