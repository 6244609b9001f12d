//! Frame encoding and decoding.
//!
//! Every message on the wire is one frame:
//!
//! ```text
//! ┌────────────┬──────────────────┬─────────────────────────┐
//! │ tag: u16 LE│ payload_len: u32 LE │ payload: payload_len bytes │
//! └────────────┴──────────────────┴─────────────────────────┘
//!   bytes 0..2     bytes 2..6          bytes 6..6+payload_len
//! ```
//!
//! There is no padding, no checksum, and no terminator. Decoding consumes
//! exactly `6 + payload_len` bytes and never looks inside the payload;
//! interpreting it is [`ClientMessage::decode`](crate::ClientMessage::decode)'s
//! job.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{MessageType, ProtocolError};

/// Size of the fixed frame header (tag + payload length).
pub const HEADER_LEN: usize = 6;

/// Largest payload a [`FrameCodec`] accepts by default (1 MiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: u32 = 1 << 20;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One complete wire-protocol unit: a type tag plus raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The raw 16-bit tag. Kept raw (not a [`MessageType`]) so frames with
    /// unknown tags survive decoding.
    pub tag: u16,
    /// The payload, exactly as it appeared on the wire.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame from a tag and payload.
    pub fn new(tag: impl Into<u16>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: tag.into(),
            payload: payload.into(),
        }
    }

    /// Creates a frame with no payload.
    pub fn empty(tag: impl Into<u16>) -> Self {
        Self::new(tag, Vec::new())
    }

    /// The known message type for this frame's tag, if any.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_tag(self.tag)
    }

    /// Serializes the frame to its exact wire representation.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Framing`] if the payload is too long for
    /// the 32-bit length field. The payload is never truncated.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let len = u32::try_from(self.payload.len()).map_err(|_| {
            ProtocolError::Framing(format!(
                "payload of {} bytes exceeds the 32-bit length field",
                self.payload.len()
            ))
        })?;

        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.tag.to_le_bytes());
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }
}

/// Encodes a tag and payload into frame bytes.
///
/// Shorthand for `Frame::new(tag, payload).encode()`.
pub fn encode(tag: u16, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    Frame::new(tag, payload).encode()
}

/// Decodes one frame from the front of `bytes`, with no payload limit.
///
/// Returns the frame and the number of bytes consumed. Trailing bytes
/// after the frame are left untouched.
pub fn decode(bytes: &[u8]) -> Result<(Frame, usize), ProtocolError> {
    FrameCodec::unbounded().decode(bytes)
}

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// Frame reader/writer with a payload size limit.
///
/// The limit is checked against the *declared* length before any buffer
/// is allocated, so a hostile length field can't make the server reserve
/// gigabytes.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_payload_len: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_LEN)
    }
}

impl FrameCodec {
    /// Creates a codec that rejects payloads longer than `max_payload_len`.
    pub fn new(max_payload_len: u32) -> Self {
        Self { max_payload_len }
    }

    /// A codec that accepts any length the header can express.
    pub fn unbounded() -> Self {
        Self::new(u32::MAX)
    }

    /// The configured payload limit.
    pub fn max_payload_len(&self) -> u32 {
        self.max_payload_len
    }

    /// Decodes one frame from the front of `bytes`.
    ///
    /// # Errors
    /// [`ProtocolError::Framing`] when the header is incomplete, the
    /// declared length exceeds the limit, or the buffer ends before the
    /// declared payload does.
    pub fn decode(&self, bytes: &[u8]) -> Result<(Frame, usize), ProtocolError> {
        let Some((header, rest)) = bytes.split_first_chunk::<HEADER_LEN>() else {
            return Err(ProtocolError::Framing(format!(
                "incomplete header: need {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        };
        let (tag, len) = self.parse_header(header)?;

        if rest.len() < len {
            return Err(ProtocolError::Framing(format!(
                "short read: declared {len} payload bytes, got {}",
                rest.len()
            )));
        }

        let frame = Frame {
            tag,
            payload: rest[..len].to_vec(),
        };
        Ok((frame, HEADER_LEN + len))
    }

    /// Reads exactly one frame from an async byte stream.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly *between* frames.
    /// A stream that ends partway through a header or payload is a
    /// [`ProtocolError::Framing`] error.
    pub async fn read_frame<R>(&self, reader: &mut R) -> Result<Option<Frame>, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = [0u8; HEADER_LEN];

        // A zero-length read on the first byte is the only clean EOF.
        if reader.read(&mut header[..1]).await? == 0 {
            return Ok(None);
        }
        read_exact_or_framing(reader, &mut header[1..], "header").await?;

        let (tag, len) = self.parse_header(&header)?;
        let mut payload = vec![0u8; len];
        read_exact_or_framing(reader, &mut payload, "payload").await?;

        Ok(Some(Frame { tag, payload }))
    }

    /// Writes one frame to an async byte stream and flushes it.
    pub async fn write_frame<W>(&self, writer: &mut W, frame: &Frame) -> Result<(), ProtocolError>
    where
        W: AsyncWrite + Unpin,
    {
        let bytes = frame.encode()?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    fn parse_header(&self, header: &[u8; HEADER_LEN]) -> Result<(u16, usize), ProtocolError> {
        let tag = u16::from_le_bytes([header[0], header[1]]);
        let len = u32::from_le_bytes([header[2], header[3], header[4], header[5]]);
        if len > self.max_payload_len {
            return Err(ProtocolError::Framing(format!(
                "declared payload length {len} exceeds limit {}",
                self.max_payload_len
            )));
        }
        Ok((tag, len as usize))
    }
}

async fn read_exact_or_framing<R>(
    reader: &mut R,
    buf: &mut [u8],
    part: &str,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ProtocolError::Framing(
            format!("stream ended inside frame {part} ({} bytes expected)", buf.len()),
        )),
        Err(e) => Err(ProtocolError::Io(e)),
    }
}
