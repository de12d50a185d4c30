use crate::codec::response::{
    process_read_coils_response, process_read_discrete_inputs_response,
    process_read_holding_registers_response, process_read_input_registers_response,
    process_read_write_multiple_registers_response, process_write_multiple_coils_response,
    process_write_multiple_registers_response, process_write_single_coil_response,
    process_write_single_register_response,
};
use crate::common::ModbusDataUnit;
use crate::communication::SlaveId;
use crate::error::{ErrorKind, ModbusError};
use crate::master::reply::{ModbusReply, ReplyType};
use crate::master::ModbusResponseExtension;
use crate::messages::{FunctionCode, ModbusQuery, ModbusResponse};

use log::debug;

/// One in-flight request as tracked by the transport queue.
#[derive(Clone, Debug)]
pub struct QueueElement {
    pub request: ModbusQuery,
    pub unit: ModbusDataUnit,
    pub reply: ModbusReply,
}

impl QueueElement {
    pub fn new(
        request: ModbusQuery,
        slave_id: SlaveId,
        unit: ModbusDataUnit,
        reply_type: ReplyType,
    ) -> Self {
        QueueElement {
            request,
            unit,
            reply: ModbusReply::new(reply_type, slave_id),
        }
    }
}

//This struct is meant to hold the state shared by every request of one master
pub struct ModbusContext {
    pub response_timeout: i32,
    error: ModbusError,
    extension: Box<dyn ModbusResponseExtension>,
}

impl ModbusContext {
    pub fn new(response_timeout: i32, extension: Box<dyn ModbusResponseExtension>) -> Self {
        ModbusContext {
            response_timeout,
            error: ModbusError::new(ErrorKind::NoError, ""),
            extension,
        }
    }

    pub fn error(&self) -> &ModbusError {
        &self.error
    }

    /// Records `kind` as the latest master level error and returns it.
    pub fn set_error(&mut self, kind: ErrorKind, message: &str) -> ModbusError {
        self.error = ModbusError::new(kind, message);
        self.error.clone()
    }

    pub fn process_response(
        &self,
        response: &ModbusResponse,
        data: Option<&mut ModbusDataUnit>,
    ) -> bool {
        let decoded = match FunctionCode::try_from(response.function_code()) {
            Ok(FunctionCode::ReadCoils) => process_read_coils_response(response, data),
            Ok(FunctionCode::ReadDiscreteInputs) => {
                process_read_discrete_inputs_response(response, data)
            }
            Ok(FunctionCode::ReadMultipleHoldingRegisters) => {
                process_read_holding_registers_response(response, data)
            }
            Ok(FunctionCode::ReadInputRegisters) => {
                process_read_input_registers_response(response, data)
            }
            Ok(FunctionCode::WriteSingleCoil) => process_write_single_coil_response(response, data),
            Ok(FunctionCode::WriteSingleHoldingRegister) => {
                process_write_single_register_response(response, data)
            }
            Ok(FunctionCode::WriteMultipleCoils) => {
                process_write_multiple_coils_response(response, data)
            }
            Ok(FunctionCode::WriteMultipleHoldingRegisters) => {
                process_write_multiple_registers_response(response, data)
            }
            Ok(FunctionCode::ReadWriteMultipleRegisters) => {
                process_read_write_multiple_registers_response(response, data)
            }
            Ok(
                FunctionCode::ReadExceptionStatus
                | FunctionCode::Diagnostic
                | FunctionCode::GetCommEventCounter
                | FunctionCode::GetCommEventLog
                | FunctionCode::ReportServerID
                | FunctionCode::ReadFileRecord
                | FunctionCode::WriteFileRecord
                | FunctionCode::MaskWriteRegister
                | FunctionCode::ReadFIFOQueue
                | FunctionCode::ReadDeviceIdentification,
            )
            | Err(_) => return self.extension.process_private_response(response, data),
        };

        match decoded {
            Ok(()) => true,
            Err(error) => {
                debug!(
                    "Invalid response for function code {:#04X}: {}",
                    response.function_code(),
                    error
                );
                false
            }
        }
    }

    pub fn process_queue_element(&self, response: &ModbusResponse, element: &QueueElement) {
        element.reply.set_raw_result(response.clone());

        if response.is_exception() {
            let message = match response.exception_code() {
                Some(exception_code) => format!("Modbus Exception Response: {}.", exception_code),
                None => "Modbus Exception Response.".to_string(),
            };
            debug!("{} (function code {:#04X})", message, response.function_code());
            element.reply.set_error(ErrorKind::ProtocolError, message);
            return;
        }

        if element.reply.reply_type() == ReplyType::Raw {
            element.reply.set_finished(true);
            return;
        }

        let mut unit = element.unit.clone();
        if !self.process_response(response, Some(&mut unit)) {
            element
                .reply
                .set_error(ErrorKind::UnknownError, "An invalid response has been received.");
            return;
        }

        element.reply.set_result(unit);
        element.reply.set_finished(true);
    }
}
