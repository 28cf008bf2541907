use std::io::Read;

use bytes::Bytes;
use tracing::trace;

use crate::codec::{decode_length, read_exact, FrameConfig};
use crate::error::{FrameError, Result};
use crate::header::HeaderKind;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete payloads.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a frame reader for the given header kind.
    pub fn new(inner: T, header: HeaderKind) -> Self {
        Self::with_config(inner, FrameConfig::new(header))
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached on a
    /// frame boundary.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let length = decode_length(&mut self.inner, self.config.header)?;

        if let Some(max) = self.config.max_payload_size {
            if length > max {
                return Err(FrameError::PayloadTooLarge { size: length, max });
            }
        }

        let payload = read_exact(&mut self.inner, length)?;
        trace!(size = payload.len(), "frame decoded");
        Ok(payload)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: Option<usize>) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Bytes>;

    /// Yields payloads until the stream closes cleanly; any other failure is
    /// yielded once as an error.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(payload) => Some(Ok(payload)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
