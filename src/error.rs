use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum ErrorKind {
    #[default]
    NoError,
    ConnectionError,
    WriteError,
    ProtocolError,
    UnknownError,
    TimeoutError,
    ReplyAbortedError,
}

#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[error("{kind:?}: {message}")]
pub struct ModbusError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ModbusError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ModbusError {
            kind,
            message: message.into(),
        }
    }
}
