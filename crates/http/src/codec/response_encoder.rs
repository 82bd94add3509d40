//! HTTP response encoder module
//!
//! [`ResponseEncoder`] turns a sequence of [`ResponsePart`]s into wire bytes
//! and tracks the [`WriterPhase`] of the response. Parts arriving out of order
//! are rejected before anything is written, so a misbehaving caller gets an
//! error instead of a corrupt response.

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{PayloadSize, ResponsePart, SendError, WriterPhase};
use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::{error, trace};

/// Encodes one response, enforcing status → headers → body → trailers.
#[derive(Debug)]
pub struct ResponseEncoder {
    phase: WriterPhase,
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn phase(&self) -> WriterPhase {
        self.phase
    }

    /// The framing chosen by the header section, once it was written.
    pub fn is_chunked(&self) -> bool {
        self.payload_encoder.as_ref().is_some_and(PayloadEncoder::is_chunked)
    }

    fn require(&self, expected: WriterPhase) -> Result<(), SendError> {
        if self.phase == expected {
            Ok(())
        } else {
            error!(expected = ?expected, actual = ?self.phase, "out of order response write");
            Err(SendError::out_of_order(expected, self.phase))
        }
    }

    fn payload_encoder(&mut self) -> Result<&mut PayloadEncoder, SendError> {
        self.require(WriterPhase::AwaitingBody)?;
        // the header section installs a payload encoder when entering AwaitingBody
        self.payload_encoder
            .as_mut()
            .ok_or_else(|| SendError::out_of_order(WriterPhase::AwaitingHeaders, WriterPhase::AwaitingBody))
    }

    fn encode_finish(&mut self, dst: &mut BytesMut) -> Result<(), SendError> {
        match self.phase {
            WriterPhase::Closed => Ok(()),
            WriterPhase::AwaitingBody => {
                let payload_encoder = self.payload_encoder()?;
                if payload_encoder.is_chunked() {
                    payload_encoder.encode_last_chunk(dst)?;
                    // no trailers
                    dst.extend_from_slice(b"\r\n");
                } else {
                    payload_encoder.finish()?;
                }
                self.phase = WriterPhase::Closed;
                Ok(())
            }
            WriterPhase::AwaitingTrailers => {
                dst.extend_from_slice(b"\r\n");
                self.phase = WriterPhase::Closed;
                Ok(())
            }
            phase @ (WriterPhase::AwaitingStatus | WriterPhase::AwaitingHeaders) => {
                error!(phase = ?phase, "finish response before its head was written");
                Err(SendError::out_of_order(WriterPhase::AwaitingBody, phase))
            }
        }
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { phase: WriterPhase::AwaitingStatus, header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl Encoder<ResponsePart<'_>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponsePart<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            ResponsePart::StatusLine(status) => {
                self.require(WriterPhase::AwaitingStatus)?;
                self.header_encoder.encode(status, dst)?;
                self.phase = WriterPhase::AwaitingHeaders;
            }

            ResponsePart::Headers(headers) => match self.phase {
                WriterPhase::AwaitingHeaders => {
                    let payload_size = PayloadSize::from_headers(headers);
                    trace!(payload_size = ?payload_size, "encode header section");
                    self.header_encoder.encode(headers, dst)?;
                    self.payload_encoder = Some(payload_size.into());
                    self.phase = WriterPhase::AwaitingBody;
                }
                WriterPhase::AwaitingTrailers => {
                    trace!(trailers = headers.len(), "encode trailer section");
                    self.header_encoder.encode(headers, dst)?;
                    self.phase = WriterPhase::Closed;
                }
                _ => {
                    self.require(WriterPhase::AwaitingHeaders)?;
                }
            },

            ResponsePart::Body(bytes) => {
                self.payload_encoder()?.encode(bytes, dst)?;
            }

            ResponsePart::LastChunk => {
                self.payload_encoder()?.encode_last_chunk(dst)?;
                self.phase = WriterPhase::AwaitingTrailers;
            }

            ResponsePart::Finish => self.encode_finish(dst)?,
        }

        Ok(())
    }
}
