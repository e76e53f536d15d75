//! TCP transport

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{Transport, error::*};

/// TCP transport for HF2211 indicators
///
/// One transport is one connection; it is never reused once disconnected.
pub struct TcpTransport {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// First address the host name resolves to
    async fn lookup(&self) -> Result<SocketAddr> {
        let endpoint = self.remote_addr();

        tokio::net::lookup_host(endpoint.as_str())
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", endpoint, e)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", endpoint)))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.lookup().await?;
        debug!(%addr, "Connecting");

        let stream = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(connected) => connected?,
            Err(_) => return Err(Error::ConnectionTimeout),
        };

        // frames are a few dozen bytes; no batching
        stream.set_nodelay(true)?;
        debug!(%addr, "Connected");

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        debug!("Closing connection to {}", self.remote_addr());
        if let Err(e) = stream.shutdown().await {
            trace!("Shutdown of {} failed: {}", self.remote_addr(), e);
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!(len = data.len(), "Writing frame");
        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn receive(&mut self, buf: &mut BytesMut) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let start = buf.len();
        let n = stream.read_buf(buf).await?;

        if n == 0 {
            debug!("Connection closed by {}", self.remote_addr());
            return Ok(0);
        }

        trace!("Received {} bytes: {:02X?}", n, &buf[start..start + n.min(48)]);

        Ok(n)
    }

    fn remote_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!("Connection to {} dropped without disconnect", self.remote_addr());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn test_tcp_transport_create() {
        let transport = TcpTransport::new("192.168.1.11", 9999);
        assert!(!transport.is_connected());
        assert_eq!(transport.remote_addr(), "192.168.1.11:9999");
    }

    #[tokio::test]
    async fn test_tcp_transport_invalid_address() {
        let mut transport = TcpTransport::new("invalid..address", 9999)
            .with_connect_timeout(Duration::from_millis(100));

        let result = transport.connect().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tcp_transport_refused() {
        let (listener, port) = listener().await;
        drop(listener);

        let mut transport = TcpTransport::new("127.0.0.1", port);
        let err = transport.connect().await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_tcp_transport_exchange() {
        let (listener, port) = listener().await;

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4];
            stream.read_exact(&mut request).await.unwrap();
            stream.write_all(b"pong").await.unwrap();
            request
        });

        let mut transport = TcpTransport::new("127.0.0.1", port);
        transport.connect().await.unwrap();
        assert!(transport.is_connected());
        assert!(matches!(transport.connect().await, Err(Error::AlreadyConnected)));

        transport.send(b"ping").await.unwrap();

        let mut buf = BytesMut::new();
        while buf.len() < 4 {
            assert!(transport.receive(&mut buf).await.unwrap() > 0);
        }
        assert_eq!(&buf[..], b"pong");
        assert_eq!(&server.await.unwrap(), b"ping");

        // server task dropped its stream
        assert_eq!(transport.receive(&mut buf).await.unwrap(), 0);

        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());
        assert!(matches!(transport.send(b"x").await, Err(Error::NotConnected)));
    }
}
