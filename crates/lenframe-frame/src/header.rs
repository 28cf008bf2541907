//! Length-prefix header kinds.
//!
//! Two widths exist on the wire; `Unknown` is what an unsupported
//! configured width maps to, and every codec operation rejects it.

use std::fmt;

/// Width and encoding of the big-endian length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderKind {
    /// No supported width was configured.
    #[default]
    Unknown,
    /// 2-byte big-endian unsigned length (max 65535).
    TwoByteUnsigned,
    /// 4-byte big-endian unsigned length (max 4294967295).
    FourByteUnsigned,
}

impl HeaderKind {
    /// Map a configured byte width to a header kind.
    pub fn from_width(width: u64) -> Self {
        match width {
            2 => HeaderKind::TwoByteUnsigned,
            4 => HeaderKind::FourByteUnsigned,
            _ => HeaderKind::Unknown,
        }
    }

    /// Number of prefix bytes on the wire.
    pub fn width(self) -> Option<usize> {
        match self {
            HeaderKind::TwoByteUnsigned => Some(2),
            HeaderKind::FourByteUnsigned => Some(4),
            HeaderKind::Unknown => None,
        }
    }

    /// Largest payload length the prefix can express.
    pub fn max_payload(self) -> Option<u64> {
        match self {
            HeaderKind::TwoByteUnsigned => Some(u64::from(u16::MAX)),
            HeaderKind::FourByteUnsigned => Some(u64::from(u32::MAX)),
            HeaderKind::Unknown => None,
        }
    }

    /// False only for `Unknown`, which has no wire encoding.
    pub fn is_known(self) -> bool {
        self != HeaderKind::Unknown
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderKind::TwoByteUnsigned => "two-byte unsigned",
            HeaderKind::FourByteUnsigned => "four-byte unsigned",
            HeaderKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
