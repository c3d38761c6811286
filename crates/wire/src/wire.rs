//! Length-prefixed JSON framing (§6.1): a 4-byte big-endian length prefix
//! followed by the JSON payload, used for both the worker-facing transport
//! and the embedder control surface.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::request::Request;
use crate::response::Response;

/// Frames larger than this are treated as malformed rather than trusted —
/// a worker cannot legitimately need more than this for one message.
pub const MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error on wire: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame of {size} bytes exceeds the {MAX_FRAME_BYTES} byte limit")]
    FrameTooLarge { size: usize },
}

/// Serialize `value` to its raw JSON payload, with no length prefix.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a raw JSON payload (no length prefix).
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed frame's payload off `reader`.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge { size: len });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write `payload` as one length-prefixed frame to `writer`.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    if payload.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge { size: payload.len() });
    }
    let len = (payload.len() as u32).to_be_bytes();
    writer.write_all(&len).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode one `Request` frame — the boundary's read side of the
/// worker-facing transport.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    let bytes = read_message(reader).await?;
    decode(&bytes)
}

/// Encode and write one `Response` frame — the boundary's reply side.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    write_message(writer, &bytes).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
