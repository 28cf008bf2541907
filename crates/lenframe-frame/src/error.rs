/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The configured header kind has no wire encoding.
    #[error("unknown header type")]
    UnknownHeader,

    /// The payload is longer than the header width can express.
    #[error("payload length {size} does not fit the header (max {max})")]
    ValueOverflow { size: usize, max: u64 },

    /// A decoded length exceeds the reader's configured limit.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The stream ended cleanly between frames.
    #[error("connection closed")]
    ConnectionClosed,

    /// The stream ended part way through a length prefix or payload.
    #[error("connection closed mid-frame ({received} of {expected} bytes)")]
    Truncated { expected: usize, received: usize },

    /// Reading the length prefix or payload failed.
    #[error("frame read failed: {0}")]
    Read(#[source] std::io::Error),

    /// Writing a frame failed.
    #[error("frame write failed: {0}")]
    Write(#[source] std::io::Error),

    /// An I/O error surfaced through the async codec adapters.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True for every failure that happened while reading a frame,
    /// including a clean end-of-stream.
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            FrameError::ConnectionClosed
                | FrameError::Truncated { .. }
                | FrameError::Read(_)
                | FrameError::PayloadTooLarge { .. }
        )
    }

    /// True only when the peer closed the stream on a frame boundary.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, FrameError::ConnectionClosed)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
