use serde::{Serialize, de::DeserializeOwned};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::errors::{Result, SerializationError};

/// Maximum allowed frame body (1MB) to prevent unbounded allocation.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Encode `value` as one frame: `u32` little-endian length, then the bincode
/// body.
pub fn encode_frame<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let body = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(SerializationError::MessageTooLarge {
            actual: body.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let size = u32::try_from(body.len()).map_err(|_| SerializationError::MessageTooLarge {
        actual: body.len(),
        max: MAX_MESSAGE_SIZE,
    })?;
    let mut buf = Vec::with_capacity(4 + body.len());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend(body);
    Ok(buf)
}

/// Decode a frame body. The whole body must be consumed.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let (value, read) = bincode::serde::decode_from_slice(body, bincode::config::standard())?;
    if read != body.len() {
        return Err(SerializationError::InvalidFormat(format!(
            "{} trailing byte(s) after message",
            body.len() - read
        )));
    }
    Ok(value)
}

pub async fn read_prefixed<T, R>(reader: &mut R) -> Result<T>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut len_bytes = [0; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    // Check before allocating.
    if len > MAX_MESSAGE_SIZE {
        return Err(SerializationError::MessageTooLarge {
            actual: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut body = vec![0; len];
    reader.read_exact(&mut body).await?;
    decode_body(&body)
}

pub async fn write_prefixed<T, W>(writer: &mut W, value: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    // Length and body go out in a single write so a reader never sees a
    // prefix without its body.
    let frame = encode_frame(value)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
