use super::*;

/// A request PDU: function code plus payload, independent of transport framing.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ModbusQuery {
    function_code: u8,
    data: Vec<u8>,
}

impl ModbusQuery {
    pub fn new(function_code: impl Into<u8>, data: Vec<u8>) -> Self {
        ModbusQuery {
            function_code: function_code.into(),
            data,
        }
    }

    /// The empty PDU returned by builders when a request can't be expressed.
    pub fn invalid() -> Self {
        ModbusQuery::default()
    }

    pub fn function_code(&self) -> u8 {
        self.function_code
    }

    pub fn known_function_code(&self) -> Option<FunctionCode> {
        FunctionCode::try_from(self.function_code).ok()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn is_valid(&self) -> bool {
        if self.function_code >= EXCEPTION_BYTE
            || !has_valid_bounds(self.function_code, &self.data)
        {
            return false;
        }

        match self.known_function_code() {
            Some(function_code) => self.data.len() >= Self::minimum_data_size(function_code),
            None => true,
        }
    }

    pub fn minimum_data_size(function_code: FunctionCode) -> usize {
        match function_code {
            FunctionCode::ReadCoils
            | FunctionCode::ReadDiscreteInputs
            | FunctionCode::ReadMultipleHoldingRegisters
            | FunctionCode::ReadInputRegisters
            | FunctionCode::WriteSingleCoil
            | FunctionCode::WriteSingleHoldingRegister
            | FunctionCode::Diagnostic => 4,
            FunctionCode::ReadExceptionStatus
            | FunctionCode::GetCommEventCounter
            | FunctionCode::GetCommEventLog
            | FunctionCode::ReportServerID => 0,
            FunctionCode::WriteMultipleCoils | FunctionCode::MaskWriteRegister => 6,
            FunctionCode::WriteMultipleHoldingRegisters => 7,
            FunctionCode::ReadFileRecord => 8,
            FunctionCode::WriteFileRecord => 10,
            FunctionCode::ReadWriteMultipleRegisters => 11,
            FunctionCode::ReadFIFOQueue | FunctionCode::ReadDeviceIdentification => 2,
        }
    }
}
