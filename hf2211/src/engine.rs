//! Transaction engine
//!
//! Runs one [`Transaction`] over one fresh connection: connect, write the
//! frame, accumulate the reply, write the follow-up command when the reply
//! asks for one, close. The whole exchange races a hard timer; whichever
//! finishes first decides the result, and the connection is closed either way.

use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use hf2211_core::{Command, Transaction, TransactionResult, constants::DEFAULT_TIMEOUT_MS};
use hf2211_transport::{TcpTransport, Transport};
use hf2211_types::DeviceDescriptor;

use crate::error::Result;

/// Executes commands, one connection per command
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    timeout: Duration,
}

impl TransactionEngine {
    /// Create an engine with the default 2000 ms limit
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set the per-transaction limit
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the per-transaction limit
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open a TCP connection to `device` and execute `command` on it
    pub async fn execute_on(&self, device: &DeviceDescriptor, command: Command) -> TransactionResult {
        info!("Sending {} to {}", command, device);

        let mut transport =
            TcpTransport::new(device.host.clone(), device.port).with_connect_timeout(self.timeout);

        self.execute(&mut transport, command).await
    }

    /// Execute `command` over an unconnected transport
    ///
    /// Never fails: connection errors and timeouts come back as the error
    /// variant of the result.
    pub async fn execute(&self, transport: &mut dyn Transport, command: Command) -> TransactionResult {
        let started = Instant::now();
        let mut txn = Transaction::new(command);

        let outcome = timeout(self.timeout, drive(transport, &mut txn)).await;
        match outcome {
            Ok(Ok(())) => txn.close(),
            Ok(Err(e)) => {
                warn!("Connection error for {}: {}", transport.remote_addr(), e);
                txn.fail(e.result_message());
            }
            Err(_) => {
                warn!(
                    "No response from {} within {:?} ({} bytes received)",
                    transport.remote_addr(),
                    self.timeout,
                    txn.received().len()
                );
                txn.time_out();
            }
        }

        if let Err(e) = transport.disconnect().await {
            debug!("Disconnect failed: {}", e);
        }

        let state = txn.state();
        let result = txn.finish();

        debug!(
            command = %command,
            ?state,
            result = result.type_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Transaction finished"
        );

        result
    }
}

impl Default for TransactionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Connect, send and read until the transaction is resolved or the peer closes
async fn drive(transport: &mut dyn Transport, txn: &mut Transaction) -> Result<()> {
    txn.begin()?;
    transport.connect().await?;

    let frame = txn.connected()?;
    debug!("Sending command: {}", hex::encode(&frame));
    transport.send(&frame).await?;
    txn.sent()?;

    let mut buf = BytesMut::with_capacity(128);
    loop {
        buf.clear();

        if transport.receive(&mut buf).await? == 0 {
            return Ok(());
        }

        debug!("Raw response: {}", hex::encode(&buf));

        if let Some(follow_up) = txn.on_data(&buf)? {
            info!("Sending {} after {}", follow_up, txn.command());
            transport.send(&follow_up.frame()).await?;
        }

        if txn.is_resolved() {
            return Ok(());
        }
    }
}
