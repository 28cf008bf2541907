//! Length-prefixed message framing.
//!
//! Every message on the wire is:
//! - a big-endian unsigned length prefix, 2 or 4 bytes wide (see [`HeaderKind`])
//! - exactly that many payload bytes, with no delimiter, padding or checksum
//!
//! The free functions in [`codec`] work over any `Read`/`Write`;
//! [`FrameReader`] and [`FrameWriter`] carry a [`FrameConfig`] for callers
//! that read or write many frames on one stream.

pub mod codec;
pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::LengthPrefixCodec;
pub use codec::{
    decode_length, decode_message, encode_length, encode_message, read_exact, FrameConfig,
};
pub use error::{FrameError, Result};
pub use header::HeaderKind;
pub use reader::FrameReader;
pub use writer::FrameWriter;
