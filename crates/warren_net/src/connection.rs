//! Length-prefixed framing over a byte stream.
//!
//! Every message travels as a `u32` big-endian length prefix followed by
//! that many bytes of MessagePack payload. The functions are generic over
//! the stream halves so sessions can frame their read and write sides
//! independently.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec;
use crate::error::NetError;

/// Upper bound on a single frame's payload.
pub const MAX_FRAME: usize = 1 << 20;

/// Encode `message` and write it as one frame.
///
/// # Errors
///
/// Returns [`NetError`] on encoding failure, an oversized message, or a
/// socket error.
pub async fn write_frame<T, W>(stream: &mut W, message: &T) -> Result<(), NetError>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let payload = codec::encode(message)?;
    if payload.len() > MAX_FRAME {
        return Err(NetError::FrameTooLarge(payload.len()));
    }
    stream.write_u32(payload.len() as u32).await?;
    stream.write_all(&payload).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one frame and decode it.
///
/// # Errors
///
/// Returns [`NetError::ConnectionClosed`] when the peer closes the stream
/// between frames, [`NetError::FrameTooLarge`] for an oversized length
/// prefix, and decode/socket errors otherwise.
pub async fn read_frame<T, R>(stream: &mut R) -> Result<T, NetError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let len = match stream.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(NetError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME {
        return Err(NetError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    codec::decode(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ClientMessage;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        let msg = ClientMessage::Hello {
            name: "tester".to_string(),
        };
        write_frame(&mut client, &msg).await.unwrap();
        let restored: ClientMessage = read_frame(&mut server).await.unwrap();
        assert_eq!(restored, msg);
    }

    #[tokio::test]
    async fn test_multiple_frames_in_order() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        for name in ["a", "b", "c"] {
            let msg = ClientMessage::Hello {
                name: name.to_string(),
            };
            write_frame(&mut client, &msg).await.unwrap();
        }
        for name in ["a", "b", "c"] {
            let restored: ClientMessage = read_frame(&mut server).await.unwrap();
            assert_eq!(
                restored,
                ClientMessage::Hello {
                    name: name.to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_closed_stream_reports_connection_closed() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);
        let result: Result<ClientMessage, _> = read_frame(&mut server).await;
        assert!(matches!(result, Err(NetError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_oversized_length_prefix_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_u32(u32::MAX).await.unwrap();
        let result: Result<ClientMessage, _> = read_frame(&mut server).await;
        assert!(matches!(result, Err(NetError::FrameTooLarge(_))));
    }
}
