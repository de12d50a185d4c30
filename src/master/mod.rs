use crate::codec::request::{
    create_raw_request, create_read_request, create_read_write_request, create_write_request,
};
use crate::common::ModbusDataUnit;
use crate::communication::{ConnectionState, ModbusTransport, SlaveId};
use crate::error::{ErrorKind, ModbusError};
use crate::messages::{ModbusQuery, ModbusResponse};
use context::ModbusContext;

use log::{debug, warn};
use tokio::time::Duration;

mod context;
mod reply;

pub use context::QueueElement;
pub use reply::{ModbusReply, ReplyState, ReplyType};

pub const DEFAULT_RESPONSE_TIMEOUT_MS: i32 = 200;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModbusMasterConnectionParams {
    /// Milliseconds to wait for a response, negative disables the timeout.
    pub response_timeout: i32,
}

impl Default for ModbusMasterConnectionParams {
    fn default() -> Self {
        ModbusMasterConnectionParams {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl ModbusMasterConnectionParams {
    pub fn response_timeout_duration(&self) -> Option<Duration> {
        u64::try_from(self.response_timeout)
            .ok()
            .map(Duration::from_millis)
    }
}

/// Decoding hook for function codes without a built in decoder: diagnostics,
/// file records, vendor specific codes and the like.
pub trait ModbusResponseExtension {
    /// Decodes `response` into `data`. The default rejects every response.
    fn process_private_response(
        &self,
        _response: &ModbusResponse,
        _data: Option<&mut ModbusDataUnit>,
    ) -> bool {
        false
    }
}

pub struct DefaultResponseExtension;

impl ModbusResponseExtension for DefaultResponseExtension {}

pub struct ModbusMasterConnection {
    transport: Box<dyn ModbusTransport>,
    context: ModbusContext,
}

impl ModbusMasterConnection {
    pub fn new(transport: Box<dyn ModbusTransport>) -> Self {
        Self::with_params(transport, ModbusMasterConnectionParams::default())
    }

    pub fn with_params(
        transport: Box<dyn ModbusTransport>,
        params: ModbusMasterConnectionParams,
    ) -> Self {
        Self::with_extension(transport, params, Box::new(DefaultResponseExtension))
    }

    pub fn with_extension(
        transport: Box<dyn ModbusTransport>,
        params: ModbusMasterConnectionParams,
        extension: Box<dyn ModbusResponseExtension>,
    ) -> Self {
        ModbusMasterConnection {
            transport,
            context: ModbusContext::new(params.response_timeout, extension),
        }
    }

    pub fn transport(&self) -> &dyn ModbusTransport {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> &mut dyn ModbusTransport {
        self.transport.as_mut()
    }

    pub fn timeout(&self) -> i32 {
        self.context.response_timeout
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        ModbusMasterConnectionParams {
            response_timeout: self.context.response_timeout,
        }
        .response_timeout_duration()
    }

    /// Changes the response timeout for requests scheduled from now on. Returns
    /// true when the value changed.
    pub fn set_timeout(&mut self, response_timeout: i32) -> bool {
        if self.context.response_timeout == response_timeout {
            return false;
        }
        debug!(
            "Response timeout changed from {} ms to {} ms",
            self.context.response_timeout, response_timeout
        );
        self.context.response_timeout = response_timeout;
        true
    }

    pub fn error(&self) -> ErrorKind {
        self.context.error().kind
    }

    pub fn error_string(&self) -> &str {
        &self.context.error().message
    }

    pub fn send_read_request(
        &mut self,
        read: &ModbusDataUnit,
        slave_id: SlaveId,
    ) -> Result<ModbusReply, ModbusError> {
        self.check_connected()?;
        let request = create_read_request(read);
        self.send_request(request, slave_id, Some(read))
    }

    pub fn send_write_request(
        &mut self,
        write: &ModbusDataUnit,
        slave_id: SlaveId,
    ) -> Result<ModbusReply, ModbusError> {
        self.check_connected()?;
        let request = create_write_request(write);
        self.send_request(request, slave_id, Some(write))
    }

    /// Function 23: writes `write` then reads `read`, both holding register ranges.
    /// The reply decodes against `read`.
    pub fn send_read_write_request(
        &mut self,
        read: &ModbusDataUnit,
        write: &ModbusDataUnit,
        slave_id: SlaveId,
    ) -> Result<ModbusReply, ModbusError> {
        self.check_connected()?;
        let request = create_read_write_request(read, write);
        self.send_request(request, slave_id, Some(read))
    }

    /// Sends `request` as is. The reply only carries the raw response.
    pub fn send_raw_request(
        &mut self,
        request: &ModbusQuery,
        slave_id: SlaveId,
    ) -> Result<ModbusReply, ModbusError> {
        self.check_connected()?;
        let request = create_raw_request(request);
        self.send_request(request, slave_id, None)
    }

    /// Runs the decoder registered for the response's function code.
    pub fn process_response(
        &self,
        response: &ModbusResponse,
        data: Option<&mut ModbusDataUnit>,
    ) -> bool {
        self.context.process_response(response, data)
    }

    /// Completes the pending request `element` with `response`.
    pub fn process_queue_element(&self, response: &ModbusResponse, element: &QueueElement) {
        self.context.process_queue_element(response, element)
    }

    fn check_connected(&mut self) -> Result<(), ModbusError> {
        if !self.transport.is_open() || self.transport.state() != ConnectionState::Connected {
            warn!("Device is not connected");
            return Err(self
                .context
                .set_error(ErrorKind::ConnectionError, "Device not connected."));
        }
        Ok(())
    }

    fn send_request(
        &mut self,
        request: ModbusQuery,
        slave_id: SlaveId,
        unit: Option<&ModbusDataUnit>,
    ) -> Result<ModbusReply, ModbusError> {
        if !request.is_valid() {
            warn!("Refuse to send invalid request.");
            return Err(self
                .context
                .set_error(ErrorKind::WriteError, "Invalid Modbus request."));
        }

        let (unit, reply_type) = match unit {
            Some(unit) => (unit.clone(), ReplyType::Common),
            None => (ModbusDataUnit::default(), ReplyType::Raw),
        };

        self.transport
            .enqueue_request(request, slave_id, unit, reply_type)
            .ok_or_else(|| {
                warn!("Request for slave {} was refused by the queue", slave_id);
                self.context
                    .set_error(ErrorKind::ReplyAbortedError, "Request could not be queued.")
            })
    }
}
