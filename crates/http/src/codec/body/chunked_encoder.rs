use crate::codec::header::FastWrite;
use crate::protocol::SendError;
use bytes::BytesMut;
use std::io::Write;

use tokio_util::codec::Encoder;

/// Frames body writes as `<HEX-SIZE>\r\n<data>\r\n` chunks, refer:
/// <https://www.rfc-editor.org/rfc/rfc7230#section-4.1>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    /// Writes the zero length chunk, trailers or a blank line must follow.
    pub fn encode_last_chunk(&mut self, dst: &mut BytesMut) {
        if !self.eof {
            self.eof = true;
            dst.extend_from_slice(b"0\r\n");
        }
    }
}

impl Encoder<&[u8]> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, bytes: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        // a zero length chunk would end the body
        if self.eof || bytes.is_empty() {
            return Ok(());
        }

        dst.reserve(bytes.len() + 12);
        write!(FastWrite(dst), "{:X}\r\n", bytes.len())?;
        dst.extend_from_slice(bytes);
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
