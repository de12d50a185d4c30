use crate::common::ModbusDataUnit;
use crate::communication::SlaveId;
use crate::error::ErrorKind;
use crate::messages::ModbusResponse;

use log::debug;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReplyType {
    /// Only the raw response is reported.
    Raw,
    /// The response is decoded into a `ModbusDataUnit`.
    Common,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ReplyState {
    #[default]
    Pending,
    Finished,
    Errored,
}

impl ReplyState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReplyState::Pending)
    }
}

#[derive(Clone, Debug, Default)]
struct ReplyOutcome {
    state: ReplyState,
    raw_result: Option<ModbusResponse>,
    result: Option<ModbusDataUnit>,
    error: ErrorKind,
    error_string: String,
}

/// Outcome of one sent request. Clones share the same outcome, so the transport
/// can keep one for completion while the caller observes another.
#[derive(Clone, Debug)]
pub struct ModbusReply {
    reply_type: ReplyType,
    slave_id: SlaveId,
    outcome: Arc<watch::Sender<ReplyOutcome>>,
}

impl ModbusReply {
    pub fn new(reply_type: ReplyType, slave_id: SlaveId) -> Self {
        let (outcome, _) = watch::channel(ReplyOutcome::default());
        ModbusReply {
            reply_type,
            slave_id,
            outcome: Arc::new(outcome),
        }
    }

    pub fn reply_type(&self) -> ReplyType {
        self.reply_type
    }

    pub fn server_address(&self) -> SlaveId {
        self.slave_id
    }

    pub fn state(&self) -> ReplyState {
        self.outcome.borrow().state
    }

    /// True once the reply finished or errored.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn error(&self) -> ErrorKind {
        self.outcome.borrow().error
    }

    pub fn error_string(&self) -> String {
        self.outcome.borrow().error_string.clone()
    }

    pub fn result(&self) -> Option<ModbusDataUnit> {
        self.outcome.borrow().result.clone()
    }

    pub fn raw_result(&self) -> Option<ModbusResponse> {
        self.outcome.borrow().raw_result.clone()
    }

    /// Applies `change` unless the reply already reached a terminal state.
    fn update(&self, change: impl FnOnce(&mut ReplyOutcome)) {
        let applied = self.outcome.send_if_modified(|outcome| {
            if outcome.state.is_terminal() {
                return false;
            }
            change(outcome);
            true
        });

        if !applied {
            debug!("Ignoring update of already completed reply from slave {}", self.slave_id);
        }
    }

    pub fn set_raw_result(&self, response: ModbusResponse) {
        self.update(|outcome| outcome.raw_result = Some(response));
    }

    pub fn set_result(&self, unit: ModbusDataUnit) {
        self.update(|outcome| outcome.result = Some(unit));
    }

    pub fn set_error(&self, error: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        self.update(|outcome| {
            outcome.error = error;
            outcome.error_string = message;
            outcome.state = ReplyState::Errored;
        });
    }

    pub fn set_finished(&self, finished: bool) {
        if finished {
            self.update(|outcome| outcome.state = ReplyState::Finished);
        }
    }

    /// Resolves once the reply finished or errored.
    pub async fn finished(&self) -> ReplyState {
        let mut receiver = self.outcome.subscribe();
        let state = match receiver.wait_for(|outcome| outcome.state.is_terminal()).await {
            Ok(outcome) => outcome.state,
            Err(_) => self.state(),
        };
        state
    }

    /// Waits for completion for at most `timeout`, `None` waits forever. When the
    /// deadline passes first the reply errors with `TimeoutError`.
    pub async fn wait_with_timeout(&self, timeout: Option<Duration>) -> ReplyState {
        let Some(timeout) = timeout else {
            return self.finished().await;
        };

        match tokio::time::timeout(timeout, self.finished()).await {
            Ok(state) => state,
            Err(_) => {
                debug!("Reply from slave {} timed out after {:?}", self.slave_id, timeout);
                self.set_error(ErrorKind::TimeoutError, "Request timeout.");
                self.state()
            }
        }
    }
}
