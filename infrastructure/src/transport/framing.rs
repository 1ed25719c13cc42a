//! Message framing over a byte stream.
//!
//! Two framings are supported:
//!
//! - **JSON lines**: one compact JSON object per `\n`-terminated line.
//!   Blank lines are skipped. Compact JSON never contains a raw newline, so
//!   the delimiter cannot appear inside a frame.
//! - **Content-Length**: `Content-Length: N\r\n\r\n` followed by exactly
//!   `N` bytes, as spoken by LSP-style peers.

use super::error::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default upper bound on a single frame (8 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;

/// Framing mode for a transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    #[default]
    JsonLines,
    ContentLength,
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::JsonLines => "json_lines",
            Framing::ContentLength => "content_length",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "json_lines" | "jsonl" | "lines" => Ok(Framing::JsonLines),
            "content_length" | "lsp" => Ok(Framing::ContentLength),
            other => Err(format!(
                "unknown framing '{}' (expected json_lines or content_length)",
                other
            )),
        }
    }
}

/// Read one frame. `Ok(None)` means the peer closed the stream cleanly
/// between frames.
pub async fn read_frame<R>(
    reader: &mut R,
    framing: Framing,
    max_size: usize,
) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncBufRead + Unpin + Send,
{
    match framing {
        Framing::JsonLines => read_line_frame(reader, max_size).await,
        Framing::ContentLength => read_content_length_frame(reader, max_size).await,
    }
}

/// Write one frame and flush.
pub async fn write_frame<W>(
    writer: &mut W,
    framing: Framing,
    frame: &[u8],
    max_size: usize,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin + Send,
{
    if frame.len() > max_size {
        return Err(TransportError::FrameTooLarge {
            size: frame.len(),
            max: max_size,
        });
    }

    match framing {
        Framing::JsonLines => {
            if frame.contains(&b'\n') {
                return Err(TransportError::InvalidHeader(
                    "json_lines frame contains a newline".into(),
                ));
            }
            writer.write_all(frame).await?;
            writer.write_all(b"\n").await?;
        }
        Framing::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", frame.len());
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(frame).await?;
        }
    }
    writer.flush().await?;
    Ok(())
}

async fn read_line_frame<R>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = Vec::new();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            // EOF: a trailing line without '\n' still counts as a frame
            let trimmed = trim_ascii(&line);
            if trimmed.is_empty() {
                return Ok(None);
            }
            return Ok(Some(trimmed.to_vec()));
        }

        let (chunk, found_newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (&available[..=pos], true),
            None => (available, false),
        };
        let consumed = chunk.len();
        line.extend_from_slice(chunk);
        reader.consume(consumed);

        if line.len() > max_size + 2 {
            return Err(TransportError::FrameTooLarge {
                size: line.len(),
                max: max_size,
            });
        }

        if found_newline {
            let trimmed = trim_ascii(&line);
            if trimmed.is_empty() {
                line.clear();
                continue;
            }
            if trimmed.len() > max_size {
                return Err(TransportError::FrameTooLarge {
                    size: trimmed.len(),
                    max: max_size,
                });
            }
            return Ok(Some(trimmed.to_vec()));
        }
    }
}

async fn read_content_length_frame<R>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = String::new();
    let mut content_length: Option<usize> = None;
    let mut seen_header = false;

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            if seen_header {
                return Err(TransportError::Closed);
            }
            return Ok(None);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if seen_header {
                break;
            }
            // Stray blank line between frames
            continue;
        }
        seen_header = true;

        if let Some((name, value)) = trimmed.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            let len = value.trim().parse::<usize>().map_err(|_| {
                TransportError::InvalidHeader(format!("bad Content-Length value: {}", value.trim()))
            })?;
            content_length = Some(len);
        }
        // Other headers (Content-Type, ...) are ignored
    }

    let len = content_length
        .ok_or_else(|| TransportError::InvalidHeader("missing Content-Length header".into()))?;
    if len > max_size {
        return Err(TransportError::FrameTooLarge {
            size: len,
            max: max_size,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &bytes[start..end]
}
