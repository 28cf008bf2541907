use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::header::HeaderKind;

/// Upper bound on the initial payload allocation; the buffer grows with
/// the bytes actually received after that.
pub(crate) const INITIAL_PAYLOAD_CAPACITY: usize = 8 * 1024;

/// Read a length prefix of the configured width.
///
/// Fails with [`FrameError::UnknownHeader`] before touching the stream when
/// `header` is `Unknown`. End-of-stream before the first prefix byte is
/// [`FrameError::ConnectionClosed`]; end-of-stream after some prefix bytes is
/// [`FrameError::Truncated`].
pub fn decode_length<R: Read + ?Sized>(stream: &mut R, header: HeaderKind) -> Result<usize> {
    let width = header.width().ok_or(FrameError::UnknownHeader)?;

    let mut prefix = [0u8; 4];
    fill_prefix(stream, &mut prefix[..width])?;

    let mut src = &prefix[..width];
    let length = match header {
        HeaderKind::TwoByteUnsigned => src.get_u16() as usize,
        HeaderKind::FourByteUnsigned => src.get_u32() as usize,
        HeaderKind::Unknown => return Err(FrameError::UnknownHeader),
    };
    Ok(length)
}

/// Read exactly `length` payload bytes.
///
/// Never returns a short buffer: if the stream ends first the partial bytes
/// are dropped and [`FrameError::Truncated`] is returned.
pub fn read_exact<R: Read + ?Sized>(stream: &mut R, length: usize) -> Result<Bytes> {
    let mut buf = Vec::with_capacity(length.min(INITIAL_PAYLOAD_CAPACITY));
    let received = Read::take(&mut *stream, length as u64)
        .read_to_end(&mut buf)
        .map_err(FrameError::Read)?;

    if received < length {
        return Err(FrameError::Truncated {
            expected: length,
            received,
        });
    }

    Ok(Bytes::from(buf))
}

/// Read one complete frame: the prefix, then exactly that many payload bytes.
pub fn decode_message<R: Read + ?Sized>(stream: &mut R, header: HeaderKind) -> Result<Bytes> {
    let length = decode_length(stream, header)?;
    read_exact(stream, length)
}

/// Append the big-endian length prefix for a `len`-byte payload to `dst`.
pub fn encode_length(len: usize, header: HeaderKind, dst: &mut BytesMut) -> Result<()> {
    let max = header.max_payload().ok_or(FrameError::UnknownHeader)?;
    let overflow = || FrameError::ValueOverflow { size: len, max };

    match header {
        HeaderKind::TwoByteUnsigned => dst.put_u16(u16::try_from(len).map_err(|_| overflow())?),
        HeaderKind::FourByteUnsigned => dst.put_u32(u32::try_from(len).map_err(|_| overflow())?),
        HeaderKind::Unknown => return Err(FrameError::UnknownHeader),
    }
    Ok(())
}

/// Build a complete frame (prefix + payload) into `dst`.
pub(crate) fn encode_frame(payload: &[u8], header: HeaderKind, dst: &mut BytesMut) -> Result<()> {
    let width = header.width().ok_or(FrameError::UnknownHeader)?;
    dst.reserve(width + payload.len());
    encode_length(payload.len(), header, dst)?;
    dst.put_slice(payload);
    Ok(())
}

/// Encode `payload` as one frame and write it to `stream`.
///
/// The prefix and payload are assembled into a single buffer first so the
/// frame goes out as one logical write. Concurrent callers on the same
/// stream must serialize themselves; there is no internal lock.
pub fn encode_message<W: Write + ?Sized>(
    stream: &mut W,
    payload: &[u8],
    header: HeaderKind,
) -> Result<()> {
    let mut buf = BytesMut::new();
    encode_frame(payload, header, &mut buf)?;
    write_frame_bytes(stream, &buf)
}

pub(crate) fn write_frame_bytes<W: Write + ?Sized>(stream: &mut W, frame: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < frame.len() {
        match stream.write(&frame[offset..]) {
            Ok(0) => return Err(FrameError::Write(ErrorKind::WriteZero.into())),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Write(err)),
        }
    }

    loop {
        match stream.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Write(err)),
        }
    }
}

fn fill_prefix<R: Read + ?Sized>(stream: &mut R, prefix: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < prefix.len() {
        match stream.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Err(FrameError::ConnectionClosed),
            Ok(0) => {
                return Err(FrameError::Truncated {
                    expected: prefix.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Read(err)),
        }
    }
    Ok(())
}

/// Configuration for [`FrameReader`](crate::FrameReader) and
/// [`FrameWriter`](crate::FrameWriter).
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Length prefix kind.
    pub header: HeaderKind,
    /// Optional cap on decoded payload length, below the header's own limit.
    pub max_payload_size: Option<usize>,
}

impl FrameConfig {
    pub fn new(header: HeaderKind) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            header: HeaderKind::TwoByteUnsigned,
            max_payload_size: None,
        }
    }
}
