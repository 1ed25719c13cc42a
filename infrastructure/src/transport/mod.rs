//! Transport layer: moving opaque frames between a client and a host.
//!
//! A [`Transport`] owns one bidirectional byte channel and preserves message
//! boundaries. It knows nothing about JSON-RPC; the session engines on both
//! sides serialize and parse frames themselves.
//!
//! | Transport | Channel |
//! |-----------|---------|
//! | [`StdioTransport`] | this process's stdin/stdout (host side of a spawned child) |
//! | [`ChildProcessTransport`] | a spawned host's stdout/stdin (client side) |
//! | [`TcpTransport`] | a TCP connection |
//! | [`FramedTransport`] | any `AsyncRead` + `AsyncWrite` pair, e.g. `tokio::io::duplex` |

pub mod child;
pub mod error;
pub mod framed;
pub mod framing;

pub use child::ChildProcessTransport;
pub use error::TransportError;
pub use framed::{FramedTransport, StdioTransport, TcpTransport};
pub use framing::{DEFAULT_MAX_FRAME_SIZE, Framing};

use async_trait::async_trait;

/// A message-boundary-preserving, bidirectional frame channel.
///
/// Any error is fatal to the owning session; implementations never retry.
#[async_trait]
pub trait Transport: Send {
    /// Send one frame.
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Receive the next frame. `Ok(None)` signals end of stream.
    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Close the channel. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        (**self).send(frame).await
    }

    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).receive().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        (**self).close().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
