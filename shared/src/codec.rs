//! Length-prefixed packet framing.
//!
//! Every packet travels as a 4-byte big-endian body length followed by the
//! bincode-encoded [`Packet`]. A peer may close the stream between frames;
//! closing inside a frame is an error.

use crate::{Packet, MAX_FRAME_LEN};
use bincode::{deserialize, serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const HEADER_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode packet: {0}")]
    Encode(bincode::Error),

    #[error("malformed packet: {0}")]
    Decode(bincode::Error),

    #[error("frame of {0} bytes exceeds the {max} byte limit", max = MAX_FRAME_LEN)]
    FrameTooLarge(usize),

    #[error("connection closed in the middle of a frame")]
    UnexpectedEof,

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("connection closed by peer")]
    ConnectionClosed,
}

/// Serializes a packet into a complete frame, header included.
pub fn encode_frame(packet: &Packet) -> Result<Vec<u8>, ProtocolError> {
    let body = serialize(packet).map_err(ProtocolError::Encode)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(body.len()));
    }

    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Deserializes a frame body (without its length header).
pub fn decode_body(body: &[u8]) -> Result<Packet, ProtocolError> {
    deserialize(body).map_err(ProtocolError::Decode)
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads the next packet. Returns `Ok(None)` when the peer closed the stream
/// cleanly on a frame boundary.
pub async fn read_packet<R>(reader: &mut R) -> Result<Option<Packet>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(ProtocolError::UnexpectedEof)
            };
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::UnexpectedEof
        } else {
            ProtocolError::Io(e)
        }
    })?;

    decode_body(&body).map(Some)
}
