//! Per-command transaction state
//!
//! A transaction tracks one command from connect to result:
//! - lifecycle state
//! - bytes accumulated from the indicator
//! - the result slot, filled exactly once
//!
//! It performs no I/O; the async driver feeds it socket events.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::{
    command::Command,
    error::{Error, Result},
    frame::Reply,
    response::{self, Failure, FailureKind, TransactionResult},
};

/// Transaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Created, nothing attempted
    Idle,

    /// Opening the connection
    Connecting,

    /// Writing the command frame
    Sending,

    /// Collecting reply bytes
    AwaitingData,

    /// Connection finished normally
    Closed,

    /// Hard timeout elapsed before a result
    TimedOut,

    /// Socket-level failure
    ConnectionError,
}

impl TransactionState {
    /// Check if no further events are accepted
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::TimedOut | Self::ConnectionError)
    }
}

/// One command exchange with the indicator
#[derive(Debug)]
pub struct Transaction {
    command: Command,
    state: TransactionState,
    received: BytesMut,
    result: Option<TransactionResult>,
}

impl Transaction {
    /// Create an idle transaction for `command`
    pub fn new(command: Command) -> Self {
        Self {
            command,
            state: TransactionState::Idle,
            received: BytesMut::with_capacity(64),
            result: None,
        }
    }

    /// Command being executed
    pub fn command(&self) -> Command {
        self.command
    }

    /// Get current state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Check if the result slot is filled
    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    /// Bytes received so far
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Lowercase hex of the bytes received so far, `None` when nothing arrived
    pub fn raw_hex(&self) -> Option<String> {
        (!self.received.is_empty()).then(|| hex::encode(&self.received))
    }

    /// Idle -> Connecting
    pub fn begin(&mut self) -> Result<()> {
        self.transition(TransactionState::Idle, TransactionState::Connecting)
    }

    /// Connecting -> Sending, returns the frame to write
    pub fn connected(&mut self) -> Result<Bytes> {
        self.transition(TransactionState::Connecting, TransactionState::Sending)?;
        Ok(self.command.frame())
    }

    /// Sending -> AwaitingData
    pub fn sent(&mut self) -> Result<()> {
        self.transition(TransactionState::Sending, TransactionState::AwaitingData)
    }

    /// Accumulate a chunk of reply bytes
    ///
    /// Classifies as soon as a whole reply is buffered. Returns the follow-up
    /// command the driver must write on the same connection, if any. Bytes
    /// arriving after classification are ignored.
    pub fn on_data(&mut self, chunk: &[u8]) -> Result<Option<Command>> {
        if self.state != TransactionState::AwaitingData {
            return Err(Error::InvalidTransactionState(format!(
                "Cannot accept data in state: {:?}",
                self.state
            )));
        }

        if self.is_resolved() {
            trace!(len = chunk.len(), "Ignoring bytes after classification");
            return Ok(None);
        }

        self.received.extend_from_slice(chunk);
        trace!(len = chunk.len(), total = self.received.len(), "Accumulated reply bytes");

        if !Reply::is_complete(&self.received) {
            return Ok(None);
        }

        Ok(self.classify_received())
    }

    /// Peer closed the connection, or the driver finished after classification
    pub fn close(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        if !self.is_resolved() && Reply::has_end_marker(&self.received) {
            // connection is going away, so a follow-up write is moot
            if let Some(follow_up) = self.classify_received() {
                debug!(%follow_up, "Peer closed before follow-up");
            }
        }

        if !self.is_resolved() {
            let failure = match self.raw_hex() {
                Some(raw) => Failure::new(
                    FailureKind::InvalidResponse,
                    format!("No response parsed, raw: {}", raw),
                )
                .with_raw(raw),
                None => Failure::new(
                    FailureKind::InvalidResponse,
                    "Connection closed without response",
                ),
            };
            self.resolve(TransactionResult::Error(failure));
        }

        self.enter(TransactionState::Closed);
    }

    /// Socket-level failure
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }

        let mut failure = Failure::new(FailureKind::Connection, message);
        failure.raw_hex = self.raw_hex();
        self.resolve(TransactionResult::Error(failure));
        self.enter(TransactionState::ConnectionError);
    }

    /// Hard timeout elapsed
    pub fn time_out(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        let raw = self.raw_hex();
        let mut failure = Failure::new(
            FailureKind::Timeout,
            format!(
                "No response from scale, raw: {}",
                raw.as_deref().unwrap_or("none")
            ),
        );
        failure.raw_hex = raw;
        self.resolve(TransactionResult::Error(failure));
        self.enter(TransactionState::TimedOut);
    }

    /// Consume the transaction and hand out its result
    ///
    /// A transaction that never reached a terminal state is closed first, so
    /// the caller always receives exactly one result.
    pub fn finish(mut self) -> TransactionResult {
        self.close();

        self.result.unwrap_or_else(|| {
            TransactionResult::failure(FailureKind::InvalidResponse, "Connection closed without response")
        })
    }

    fn classify_received(&mut self) -> Option<Command> {
        let reply = Reply::new(self.received.clone().freeze());
        debug!(command = %self.command, ?reply, "Classifying reply");

        let classification = response::classify(&reply, &self.command);
        self.resolve(classification.result);

        classification.follow_up
    }

    /// Fill the result slot once; later results are dropped
    fn resolve(&mut self, result: TransactionResult) {
        if self.result.is_some() {
            trace!(dropped = result.type_name(), "Result already set");
            return;
        }

        debug!(command = %self.command, result = result.type_name(), "Transaction resolved");
        self.result = Some(result);
    }

    fn transition(&mut self, from: TransactionState, to: TransactionState) -> Result<()> {
        if self.state != from {
            return Err(Error::InvalidTransactionState(format!(
                "Cannot enter {:?} from state: {:?}",
                to, self.state
            )));
        }

        self.enter(to);
        Ok(())
    }

    fn enter(&mut self, to: TransactionState) {
        trace!(command = %self.command, from = ?self.state, to = ?to, "Transaction state");
        self.state = to;
    }
}
