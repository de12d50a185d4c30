pub mod query;
pub mod response;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Set on the function code of a response when the server answers with an exception.
pub const EXCEPTION_BYTE: u8 = 0x80;

/// A PDU payload never exceeds 252 bytes (253 bytes minus the function code).
pub const MAX_PDU_DATA_SIZE: usize = 252;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FunctionCode {
    ReadCoils = 1,
    ReadDiscreteInputs = 2,
    ReadMultipleHoldingRegisters = 3,
    ReadInputRegisters = 4,
    WriteSingleCoil = 5,
    WriteSingleHoldingRegister = 6,
    ReadExceptionStatus = 7, //RTU ONLY
    Diagnostic = 8,          //RTU ONLY
    GetCommEventCounter = 11, //RTU ONLY
    GetCommEventLog = 12,    //RTU ONLY
    WriteMultipleCoils = 15,
    WriteMultipleHoldingRegisters = 16,
    ReportServerID = 17, //RTU ONLY
    ReadFileRecord = 20,
    WriteFileRecord = 21,
    MaskWriteRegister = 22,
    ReadWriteMultipleRegisters = 23,
    ReadFIFOQueue = 24,
    ReadDeviceIdentification = 43,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ExceptionCode {
    IllegalFunction = 1,
    IllegalDataAddress = 2,
    IllegalDataValue = 3,
    ServerDeviceFailure = 4,
    Acknowledge = 5,
    ServerDeviceBusy = 6,
    MemoryParityError = 8,
    GatewayPathUnavailable = 0xA,
    GatewayTargetDeviceFailedToRespond = 0xB,
}

impl std::fmt::Display for FunctionCode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{:?}", self)
    }
}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{:?}", self)
    }
}

/// Checks the bounds every PDU shares: a function code inside the public range
/// and a payload that fits in a single ADU.
fn has_valid_bounds(function_code: u8, data: &[u8]) -> bool {
    function_code & !EXCEPTION_BYTE != 0 && data.len() <= MAX_PDU_DATA_SIZE
}

pub use query::ModbusQuery;
pub use response::ModbusResponse;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn function_codes_map_to_their_wire_values() {
        assert_eq!(
            FunctionCode::try_from(0x03).unwrap(),
            FunctionCode::ReadMultipleHoldingRegisters
        );
        assert_eq!(FunctionCode::try_from(0x17).unwrap(), FunctionCode::ReadWriteMultipleRegisters);
        assert_eq!(u8::from(FunctionCode::WriteMultipleCoils), 0x0F);
        assert_eq!(u8::from(FunctionCode::ReadDeviceIdentification), 0x2B);
    }

    #[test]
    fn unassigned_codes_are_rejected() {
        assert!(FunctionCode::try_from(0x41).is_err());
        assert!(FunctionCode::try_from(0).is_err());
        assert!(ExceptionCode::try_from(7).is_err());
    }
}
