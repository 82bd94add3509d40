use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{PayloadSize, SendError};
use bytes::BytesMut;

use tokio_util::codec::Encoder;
use tracing::warn;

/// encode payload for response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// have no body with the response
    NoBody,

    /// no declared length, bytes are written verbatim until the connection closes
    CloseDelimited,
}

impl From<PayloadSize> for PayloadEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(size) => PayloadEncoder::fix_length(size),
            PayloadSize::Chunked => PayloadEncoder::chunked(),
            PayloadSize::Empty => PayloadEncoder::empty(),
            PayloadSize::CloseDelimited => PayloadEncoder::close_delimited(),
        }
    }
}

impl PayloadEncoder {
    /// create an empty `PayloadEncoder`
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// create a `PayloadEncoder` passing bytes through unframed
    pub fn close_delimited() -> Self {
        Self { kind: Kind::CloseDelimited }
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    /// create a fixed length `PayloadEncoder`
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthEncoder::new(size)) }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    /// Writes the zero length chunk of a chunked body.
    pub fn encode_last_chunk(&mut self, dst: &mut BytesMut) -> Result<(), SendError> {
        match &mut self.kind {
            Kind::Chunked(encoder) => {
                encoder.encode_last_chunk(dst);
                Ok(())
            }
            Kind::Length(_) | Kind::NoBody | Kind::CloseDelimited => Err(SendError::NotChunked),
        }
    }

    /// Checks a fixed length body is complete.
    ///
    /// Chunked bodies are completed by the caller, which knows whether
    /// trailers are still to be written.
    pub fn finish(&self) -> Result<(), SendError> {
        match &self.kind {
            Kind::Length(encoder) => encoder.finish(),
            Kind::Chunked(_) | Kind::NoBody | Kind::CloseDelimited => Ok(()),
        }
    }
}

impl Encoder<&[u8]> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, bytes: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(bytes, dst),
            Kind::Chunked(encoder) => encoder.encode(bytes, dst),
            Kind::CloseDelimited => {
                dst.extend_from_slice(bytes);
                Ok(())
            }
            Kind::NoBody if bytes.is_empty() => Ok(()),
            Kind::NoBody => {
                warn!(size = bytes.len(), "response declared no body but got body bytes");
                Err(SendError::body_length_mismatch(0, bytes.len() as u64))
            }
        }
    }
}
