use lenframe_frame::FrameError;

/// Errors that end a pump run.
#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    /// Frame-level error on the send path, or a rejected configuration.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The network side failed with something other than a clean close.
    #[error("receive failed: {0}")]
    Receive(FrameError),

    /// Transport-level error while preparing the connection.
    #[error("transport error: {0}")]
    Transport(#[from] lenframe_transport::TransportError),

    /// Reading the local input failed (other than reaching its end).
    #[error("local input failed: {0}")]
    Input(std::io::Error),

    /// The connection could not be split into reader and writer handles.
    #[error("connection setup failed: {0}")]
    Setup(std::io::Error),
}

pub type Result<T> = std::result::Result<T, PumpError>;
