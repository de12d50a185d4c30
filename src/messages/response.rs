use super::*;

/// A response PDU as delivered by the transport. The exception bit stays part of
/// the stored function code so the raw wire bytes can be reproduced.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ModbusResponse {
    function_code: u8,
    data: Vec<u8>,
}

impl ModbusResponse {
    pub fn new(function_code: impl Into<u8>, data: Vec<u8>) -> Self {
        ModbusResponse {
            function_code: function_code.into(),
            data,
        }
    }

    pub fn exception(function_code: impl Into<u8>, exception_code: ExceptionCode) -> Self {
        ModbusResponse {
            function_code: function_code.into() | EXCEPTION_BYTE,
            data: vec![exception_code.into()],
        }
    }

    /// Function code with the exception bit cleared.
    pub fn function_code(&self) -> u8 {
        self.function_code & !EXCEPTION_BYTE
    }

    pub fn raw_function_code(&self) -> u8 {
        self.function_code
    }

    pub fn known_function_code(&self) -> Option<FunctionCode> {
        FunctionCode::try_from(self.function_code()).ok()
    }

    pub fn is_exception(&self) -> bool {
        self.function_code & EXCEPTION_BYTE != 0
    }

    /// The exception code carried by an exception response, if it is one the
    /// protocol defines.
    pub fn exception_code(&self) -> Option<ExceptionCode> {
        if !self.is_exception() {
            return None;
        }
        let raw = *self.data.first()?;
        ExceptionCode::try_from(raw).ok()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn is_valid(&self) -> bool {
        if !has_valid_bounds(self.function_code, &self.data) {
            return false;
        }
        if self.is_exception() {
            return self.data.len() == 1;
        }
        true
    }

    /// Minimum payload size for this response, `None` when the code has no layout
    /// known to this crate.
    pub fn minimum_data_size(&self) -> Option<usize> {
        if self.is_exception() {
            return Some(1);
        }
        self.known_function_code().map(Self::minimum_data_size_for)
    }

    pub fn minimum_data_size_for(function_code: FunctionCode) -> usize {
        match function_code {
            FunctionCode::ReadCoils
            | FunctionCode::ReadDiscreteInputs
            | FunctionCode::ReadDeviceIdentification => 2,
            FunctionCode::ReadMultipleHoldingRegisters
            | FunctionCode::ReadInputRegisters
            | FunctionCode::ReportServerID
            | FunctionCode::ReadFileRecord
            | FunctionCode::ReadWriteMultipleRegisters => 3,
            FunctionCode::WriteSingleCoil
            | FunctionCode::WriteSingleHoldingRegister
            | FunctionCode::Diagnostic
            | FunctionCode::GetCommEventCounter
            | FunctionCode::WriteMultipleCoils
            | FunctionCode::WriteMultipleHoldingRegisters => 4,
            FunctionCode::ReadExceptionStatus => 1,
            FunctionCode::MaskWriteRegister | FunctionCode::ReadFIFOQueue => 6,
            FunctionCode::GetCommEventLog => 8,
            FunctionCode::WriteFileRecord => 10,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exception_response_strips_top_bit() {
        let response =
            ModbusResponse::exception(FunctionCode::ReadCoils, ExceptionCode::IllegalDataAddress);

        assert!(response.is_exception());
        assert!(response.is_valid());
        assert_eq!(response.raw_function_code(), 0x81);
        assert_eq!(response.function_code(), 0x01);
        assert_eq!(response.data(), &[0x02]);
        assert_eq!(response.exception_code(), Some(ExceptionCode::IllegalDataAddress));
        assert_eq!(response.minimum_data_size(), Some(1));
    }

    #[test]
    fn exception_response_with_extra_bytes_is_invalid() {
        let response = ModbusResponse::new(0x83u8, vec![0x02, 0x00]);
        assert!(!response.is_valid());
    }

    #[test]
    fn unknown_exception_code_is_reported_as_none() {
        let response = ModbusResponse::new(0x83u8, vec![0x42]);
        assert!(response.is_valid());
        assert_eq!(response.exception_code(), None);
    }

    #[test]
    fn normal_response_has_no_exception_code() {
        let response =
            ModbusResponse::new(FunctionCode::WriteSingleCoil, vec![0x00, 0x05, 0xFF, 0x00]);
        assert!(!response.is_exception());
        assert_eq!(response.exception_code(), None);
        assert_eq!(response.minimum_data_size(), Some(4));
    }

    #[test]
    fn zero_function_code_is_invalid() {
        assert!(!ModbusResponse::default().is_valid());
        assert!(!ModbusResponse::new(0x80u8, vec![0x01]).is_valid());
    }

    #[test]
    fn custom_code_has_no_minimum_size() {
        assert_eq!(ModbusResponse::new(0x41u8, vec![]).minimum_data_size(), None);
    }
}
