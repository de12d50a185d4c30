pub mod request;
pub mod response;
pub mod utils;

use crate::messages::{ModbusQuery, ModbusResponse};

use anyhow::{anyhow, Result};

/// Converts PDUs to and from the bytes handed to a transport: one function code
/// byte followed by the payload. Framing (MBAP header, CRC) belongs to the transport.
pub trait ModbusSerialize
where
    Self: Sized,
{
    fn serialize(&self) -> Result<Vec<u8>>;

    fn deserialize(data: &[u8]) -> Result<Self>;
}

impl ModbusSerialize for ModbusQuery {
    fn serialize(&self) -> Result<Vec<u8>> {
        if !self.is_valid() {
            return Err(anyhow!("Refusing to serialize an invalid request"));
        }

        let mut result = Vec::with_capacity(self.data_size() + 1);

        //Function code
        result.push(self.function_code());
        result.extend_from_slice(self.data());

        Ok(result)
    }

    fn deserialize(data: &[u8]) -> Result<Self> {
        let (function_code, body) = data
            .split_first()
            .ok_or_else(|| anyhow!("Not enough bytes to form a request PDU"))?;

        Ok(ModbusQuery::new(*function_code, body.to_vec()))
    }
}

impl ModbusSerialize for ModbusResponse {
    fn serialize(&self) -> Result<Vec<u8>> {
        let mut result = Vec::with_capacity(self.data_size() + 1);

        //Function code, exception bit included
        result.push(self.raw_function_code());
        result.extend_from_slice(self.data());

        Ok(result)
    }

    /// Only the function code byte is required; layout checks are left to the
    /// decoders so malformed payloads still reach the pending reply.
    fn deserialize(data: &[u8]) -> Result<Self> {
        let (function_code, body) = data
            .split_first()
            .ok_or_else(|| anyhow!("Not enough bytes to form a response PDU"))?;

        Ok(ModbusResponse::new(*function_code, body.to_vec()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::messages::{ExceptionCode, FunctionCode};

    #[test]
    fn query_bytes_start_with_function_code() {
        let query = ModbusQuery::new(FunctionCode::ReadCoils, vec![0x00, 0x13, 0x00, 0x25]);
        let bytes = query.serialize().unwrap();

        assert_eq!(bytes, vec![0x01, 0x00, 0x13, 0x00, 0x25]);
        assert_eq!(ModbusQuery::deserialize(&bytes).unwrap(), query);
    }

    #[test]
    fn invalid_query_is_not_serialized() {
        assert!(ModbusQuery::invalid().serialize().is_err());
    }

    #[test]
    fn exception_response_keeps_exception_bit() {
        let response = ModbusResponse::deserialize(&[0x81, 0x02]).unwrap();

        assert!(response.is_exception());
        assert_eq!(response.exception_code(), Some(ExceptionCode::IllegalDataAddress));
        assert_eq!(response.serialize().unwrap(), vec![0x81, 0x02]);
    }

    #[test]
    fn malformed_response_payload_is_kept() {
        let response = ModbusResponse::deserialize(&[0x03, 0x05, 0x00]).unwrap();
        assert_eq!(response.function_code(), 0x03);
        assert_eq!(response.data(), &[0x05, 0x00]);
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(ModbusQuery::deserialize(&[]).is_err());
        assert!(ModbusResponse::deserialize(&[]).is_err());
    }
}
