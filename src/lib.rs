pub mod codec;
pub mod common;
pub mod communication;
pub mod error;
pub mod master;
pub mod messages;

pub use common::{ModbusDataType, ModbusDataUnit, ModbusTable};
pub use communication::{ConnectionState, ModbusTransport, SlaveId};
pub use error::{ErrorKind, ModbusError};
pub use master::{
    DefaultResponseExtension, ModbusMasterConnection, ModbusMasterConnectionParams, ModbusReply,
    ModbusResponseExtension, QueueElement, ReplyState, ReplyType,
};
pub use messages::{ExceptionCode, FunctionCode, ModbusQuery, ModbusResponse};
