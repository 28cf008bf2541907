use lenframe_frame::HeaderKind;

/// Configuration for interactive mode.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Length prefix used for every frame in both directions.
    pub header: HeaderKind,
    /// Surface each local line to the sink before sending it.
    pub echo: bool,
    /// Optional cap on inbound payload length.
    pub max_payload_size: Option<usize>,
}

impl PumpConfig {
    pub fn new(header: HeaderKind) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            header: HeaderKind::TwoByteUnsigned,
            echo: false,
            max_payload_size: None,
        }
    }
}

/// Configuration for a single request/response turn.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Length prefix used for both frames.
    pub header: HeaderKind,
    /// Receive first and then reply, instead of sending first.
    pub listen_first: bool,
    /// The one outbound message.
    pub message: String,
}

impl ExchangeConfig {
    pub fn new(header: HeaderKind, listen_first: bool, message: impl Into<String>) -> Self {
        Self {
            header,
            listen_first,
            message: message.into(),
        }
    }
}
