//! `tokio_util::codec` adapter for the same wire format.
//!
//! Lets async callers use `Framed`/`FramedRead`/`FramedWrite` over any
//! `AsyncRead`/`AsyncWrite` with identical prefix semantics and limits.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, INITIAL_PAYLOAD_CAPACITY};
use crate::error::{FrameError, Result};
use crate::header::HeaderKind;

#[derive(Debug, Clone, Copy)]
enum DecodeState {
    Head,
    Data(usize),
}

/// Length-prefix codec for `tokio_util::codec`.
#[derive(Debug, Clone)]
pub struct LengthPrefixCodec {
    header: HeaderKind,
    max_payload_size: Option<usize>,
    state: DecodeState,
}

impl LengthPrefixCodec {
    pub fn new(header: HeaderKind) -> Self {
        Self {
            header,
            max_payload_size: None,
            state: DecodeState::Head,
        }
    }

    /// Reject decoded lengths above `max` with `PayloadTooLarge`.
    pub fn with_max_payload_size(mut self, max: usize) -> Self {
        self.max_payload_size = Some(max);
        self
    }

    pub fn header(&self) -> HeaderKind {
        self.header
    }

    fn decode_head(&mut self, src: &mut BytesMut) -> Result<Option<usize>> {
        let width = self.header.width().ok_or(FrameError::UnknownHeader)?;
        if src.len() < width {
            return Ok(None);
        }

        let length = match self.header {
            HeaderKind::TwoByteUnsigned => src.get_u16() as usize,
            HeaderKind::FourByteUnsigned => src.get_u32() as usize,
            HeaderKind::Unknown => return Err(FrameError::UnknownHeader),
        };

        if let Some(max) = self.max_payload_size {
            if length > max {
                return Err(FrameError::PayloadTooLarge { size: length, max });
            }
        }

        Ok(Some(length))
    }
}

impl Decoder for LengthPrefixCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        let length = match self.state {
            DecodeState::Data(length) => length,
            DecodeState::Head => match self.decode_head(src)? {
                Some(length) => {
                    self.state = DecodeState::Data(length);
                    length
                }
                None => return Ok(None),
            },
        };

        if src.len() < length {
            // The prefix is peer-controlled; grow with the data instead.
            src.reserve((length - src.len()).min(INITIAL_PAYLOAD_CAPACITY));
            return Ok(None);
        }

        self.state = DecodeState::Head;
        Ok(Some(src.split_to(length).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(payload) = self.decode(src)? {
            return Ok(Some(payload));
        }

        match self.state {
            DecodeState::Head if src.is_empty() => Ok(None),
            DecodeState::Head => Err(FrameError::Truncated {
                expected: self.header.width().unwrap_or_default(),
                received: src.len(),
            }),
            DecodeState::Data(expected) => Err(FrameError::Truncated {
                expected,
                received: src.len(),
            }),
        }
    }
}

impl Encoder<Bytes> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        encode_frame(&item, self.header, dst)
    }
}

impl<'a> Encoder<&'a [u8]> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &'a [u8], dst: &mut BytesMut) -> Result<()> {
        encode_frame(item, self.header, dst)
    }
}
