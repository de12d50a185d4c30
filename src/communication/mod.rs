use crate::common::ModbusDataUnit;
use crate::master::{ModbusReply, ReplyType};
use crate::messages::ModbusQuery;

pub type SlaveId = u8;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ConnectionState {
    #[default]
    Unconnected,
    Connecting,
    Connected,
    Closing,
    Closed,
}

/// The connection and request queue a master sends through. Implementations own
/// framing, the in-flight queue and response timeouts; once bytes for a pending
/// request arrive they hand the response and its `QueueElement` back to
/// `ModbusMasterConnection::process_queue_element`.
pub trait ModbusTransport {
    fn is_open(&self) -> bool;

    fn state(&self) -> ConnectionState;

    /// Queues `request` for `slave_id`. `unit` is the decode context for the reply,
    /// `ModbusDataUnit::default()` for raw requests. `None` when the queue refuses
    /// the request.
    fn enqueue_request(
        &mut self,
        request: ModbusQuery,
        slave_id: SlaveId,
        unit: ModbusDataUnit,
        reply_type: ReplyType,
    ) -> Option<ModbusReply>;
}
