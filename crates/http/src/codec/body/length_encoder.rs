use crate::protocol::SendError;
use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes a body whose size was declared up front with `content-length`.
///
/// Bytes are written verbatim. The encoder refuses to write past the declared
/// length, and [`LengthEncoder::finish`] reports a body that fell short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    written: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, written: 0 }
    }

    pub fn is_finish(&self) -> bool {
        self.written == self.length
    }

    /// Checks that exactly the declared number of bytes was written.
    pub fn finish(&self) -> Result<(), SendError> {
        if self.is_finish() {
            Ok(())
        } else {
            warn!(declared = self.length, written = self.written, "response body shorter than content-length");
            Err(SendError::body_length_mismatch(self.length, self.written))
        }
    }
}

impl Encoder<&[u8]> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, bytes: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        let total = self.written + bytes.len() as u64;
        if total > self.length {
            warn!(declared = self.length, total, "response body exceeds content-length");
            return Err(SendError::body_length_mismatch(self.length, total));
        }

        dst.extend_from_slice(bytes);
        self.written = total;
        Ok(())
    }
}
