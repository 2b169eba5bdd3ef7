//! Wire-layer error types.

/// Errors that can occur while encoding, decoding, or framing messages.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to MessagePack.
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a message from MessagePack.
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Socket read or write failed.
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),

    /// An incoming frame declared a length beyond the cap.
    #[error("frame of {0} bytes exceeds the maximum")]
    FrameTooLarge(usize),

    /// The peer closed the connection between frames.
    #[error("connection closed")]
    ConnectionClosed,
}
