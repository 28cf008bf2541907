use std::io::Write;

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_frame, write_frame_bytes, FrameConfig};
use crate::error::Result;
use crate::header::HeaderKind;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
///
/// Reuses one scratch buffer across sends; each frame still goes out as a
/// single assembled buffer.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a frame writer for the given header kind.
    pub fn new(inner: T, header: HeaderKind) -> Self {
        Self::with_config(inner, FrameConfig::new(header))
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one payload (blocking).
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(payload, self.config.header, &mut self.buf)?;
        write_frame_bytes(&mut self.inner, &self.buf)?;
        trace!(size = payload.len(), "frame written");
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
