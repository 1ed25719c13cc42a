//! [`FramedTransport`]: a [`Transport`] over any async reader/writer pair.

use super::Transport;
use super::error::TransportError;
use super::framing::{DEFAULT_MAX_FRAME_SIZE, Framing, read_frame, write_frame};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::trace;

/// Frames messages over a split byte channel (stdio, TCP halves, pipes).
pub struct FramedTransport<R, W> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
    framing: Framing,
    max_frame_size: usize,
    closed: bool,
    label: String,
}

impl<R, W> FramedTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, framing: Framing) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            framing,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            closed: false,
            label: "stream".to_string(),
        }
    }

    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }
}

/// Transport over the current process's stdin/stdout.
pub type StdioTransport = FramedTransport<tokio::io::Stdin, tokio::io::Stdout>;

impl StdioTransport {
    pub fn stdio(framing: Framing) -> Self {
        FramedTransport::new(tokio::io::stdin(), tokio::io::stdout(), framing).with_label("stdio")
    }
}

/// Transport over a TCP connection.
pub type TcpTransport = FramedTransport<OwnedReadHalf, OwnedWriteHalf>;

impl TcpTransport {
    pub fn from_stream(stream: TcpStream, framing: Framing) -> Self {
        let label = stream
            .peer_addr()
            .map(|a| format!("tcp://{}", a))
            .unwrap_or_else(|_| "tcp".to_string());
        let (read_half, write_half) = stream.into_split();
        FramedTransport::new(read_half, write_half, framing).with_label(label)
    }

    /// Connect to a listening host.
    pub async fn connect(addr: &str, framing: Framing) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream, framing))
    }
}

#[async_trait]
impl<R, W> Transport for FramedTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        trace!(transport = %self.label, "send: {}", String::from_utf8_lossy(frame));
        write_frame(&mut self.writer, self.framing, frame, self.max_frame_size).await
    }

    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let frame = read_frame(&mut self.reader, self.framing, self.max_frame_size).await?;
        if let Some(ref bytes) = frame {
            trace!(transport = %self.label, "recv: {}", String::from_utf8_lossy(bytes));
        }
        Ok(frame)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.shutdown().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
