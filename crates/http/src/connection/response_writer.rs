use crate::codec::ResponseEncoder;
use crate::protocol::{Headers, ResponsePart, SendError, WriterPhase, default_headers};
use bytes::BytesMut;
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Writes a single response onto an output sink.
///
/// Calls must follow the protocol order: [`write_status_line`], then
/// [`write_headers`], then any number of [`write_body`] calls. When the header
/// section announced `transfer-encoding: chunked`, every body write becomes a
/// chunk and the body ends with [`write_chunked_body_done`] followed by a
/// second [`write_headers`] carrying the trailers. Out of order calls fail
/// with [`SendError::OutOfOrder`] and write nothing.
///
/// The status line is only buffered, it goes out together with the header
/// section. Everything from the header section on is flushed to the sink
/// before the call returns.
///
/// [`write_status_line`]: ResponseWriter::write_status_line
/// [`write_headers`]: ResponseWriter::write_headers
/// [`write_body`]: ResponseWriter::write_body
/// [`write_chunked_body_done`]: ResponseWriter::write_chunked_body_done
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new() }
    }

    /// Headers for a plain text body of `content_length` bytes, see [`default_headers`].
    pub fn default_headers(content_length: u64) -> Headers {
        default_headers(content_length)
    }

    #[inline]
    pub fn phase(&self) -> WriterPhase {
        self.encoder.phase()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.phase() == WriterPhase::Closed
    }

    /// Returns true while nothing of the response has reached the sink.
    #[inline]
    pub fn is_pristine(&self) -> bool {
        matches!(self.phase(), WriterPhase::AwaitingStatus | WriterPhase::AwaitingHeaders)
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Buffers `HTTP/1.1 <code> <reason>\r\n`.
    ///
    /// # Errors
    ///
    /// [`SendError::UnrecognizedStatus`] for a status without a canonical
    /// reason phrase.
    pub fn write_status_line(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.encoder.encode(ResponsePart::StatusLine(status), &mut self.buffer)
    }

    /// Writes a header block: the header section, or after
    /// [`write_chunked_body_done`](Self::write_chunked_body_done) the trailers.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), SendError> {
        self.encoder.encode(ResponsePart::Headers(headers), &mut self.buffer)?;
        self.flush().await
    }

    /// Writes body bytes, as a single chunk when the body is chunked.
    ///
    /// # Errors
    ///
    /// [`SendError::BodyLengthMismatch`] when a fixed length body would grow
    /// past its `content-length`.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, SendError> {
        self.encoder.encode(ResponsePart::Body(body), &mut self.buffer)?;
        self.flush().await?;
        Ok(body.len())
    }

    /// Writes `body` as consecutive chunks of at most `chunk_size` bytes.
    pub async fn write_chunks(&mut self, body: &[u8], chunk_size: usize) -> Result<usize, SendError> {
        if !self.encoder.is_chunked() {
            return Err(SendError::NotChunked);
        }

        for chunk in body.chunks(chunk_size.max(1)) {
            self.encoder.encode(ResponsePart::Body(chunk), &mut self.buffer)?;
        }
        self.flush().await?;
        Ok(body.len())
    }

    /// Writes the zero length chunk ending a chunked body.
    ///
    /// The trailer section has to follow with [`write_headers`](Self::write_headers),
    /// or [`finish`](Self::finish) for none.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), SendError> {
        self.encoder.encode(ResponsePart::LastChunk, &mut self.buffer)?;
        self.flush().await
    }

    /// Ends a chunked body with `trailers` as its trailer section.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), SendError> {
        if self.phase() == WriterPhase::AwaitingBody {
            self.encoder.encode(ResponsePart::LastChunk, &mut self.buffer)?;
        }
        self.encoder.encode(ResponsePart::Headers(trailers), &mut self.buffer)?;
        self.flush().await
    }

    /// Completes the response.
    ///
    /// A fixed length body must have been written in full, an open chunked
    /// body is ended without trailers. Finishing a closed response only
    /// flushes.
    pub async fn finish(&mut self) -> Result<(), SendError> {
        self.encoder.encode(ResponsePart::Finish, &mut self.buffer)?;
        self.flush().await
    }

    /// Drops anything buffered and starts over with a fresh response.
    ///
    /// Only meaningful while [`is_pristine`](Self::is_pristine), afterwards
    /// part of the response is already on the wire.
    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
        self.encoder = ResponseEncoder::new();
    }

    #[inline]
    pub async fn flush(&mut self) -> Result<(), SendError> {
        if !self.buffer.is_empty() {
            self.writer.write_all(self.buffer.as_ref()).await?;
            self.buffer.clear();
        }

        Ok(self.writer.flush().await?)
    }

    /// Flushes and shuts down the write side of the sink.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.flush().await?;
        Ok(self.writer.shutdown().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunked_headers() -> Headers {
        let mut headers = ResponseWriter::<Vec<u8>>::default_headers(0);
        headers.delete("content-length");
        headers.set("transfer-encoding", "chunked");
        headers
    }

    #[tokio::test]
    async fn fixed_length_body() {
        let mut writer = ResponseWriter::new(Vec::new());
        let body = b"<html>hi</html>";

        let mut headers = ResponseWriter::<Vec<u8>>::default_headers(0);
        headers.replace("content-length", body.len().to_string());
        headers.replace("content-type", mime::TEXT_HTML.as_ref());

        writer.write_status_line(StatusCode::OK).unwrap();
        writer.write_headers(&headers).await.unwrap();
        assert_eq!(writer.write_body(body).await.unwrap(), body.len());
        writer.finish().await.unwrap();

        assert!(writer.is_closed());
        assert_eq!(
            writer.into_inner(),
            b"HTTP/1.1 200 OK\r\ncontent-length: 15\r\nconnection: close\r\ncontent-type: text/html\r\n\r\n<html>hi</html>"
        );
    }

    #[tokio::test]
    async fn body_without_content_length_ends_with_connection() {
        let mut writer = ResponseWriter::new(Vec::new());

        let mut headers = ResponseWriter::<Vec<u8>>::default_headers(0);
        headers.delete("content-length");

        writer.write_status_line(StatusCode::OK).unwrap();
        writer.write_headers(&headers).await.unwrap();
        assert_eq!(writer.write_body(b"hello").await.unwrap(), 5);
        assert_eq!(writer.write_body(b" world").await.unwrap(), 6);
        writer.finish().await.unwrap();

        assert!(writer.is_closed());
        assert_eq!(
            writer.into_inner(),
            b"HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nhello world"
        );
    }

    #[tokio::test]
    async fn short_fixed_length_body_fails_finish() {
        let mut writer = ResponseWriter::new(Vec::new());

        writer.write_status_line(StatusCode::OK).unwrap();
        writer.write_headers(&ResponseWriter::<Vec<u8>>::default_headers(4)).await.unwrap();
        writer.write_body(b"ab").await.unwrap();

        assert!(matches!(writer.finish().await, Err(SendError::BodyLengthMismatch { declared: 4, actual: 2 })));
        assert!(matches!(writer.write_body(b"abc").await, Err(SendError::BodyLengthMismatch { declared: 4, actual: 5 })));
    }

    #[tokio::test]
    async fn chunk_framing_35_bytes_by_32() {
        let body = [b'x'; 35];
        let mut writer = ResponseWriter::new(Vec::new());

        writer.write_status_line(StatusCode::OK).unwrap();
        writer.write_headers(&chunked_headers()).await.unwrap();
        let head_len = writer.get_mut().len();

        writer.write_chunks(&body, 32).await.unwrap();
        writer.write_chunked_body_done().await.unwrap();

        let mut trailers = Headers::new();
        trailers.set("X-Content-Length", body.len().to_string());
        writer.write_headers(&trailers).await.unwrap();

        let mut expected = b"20\r\n".to_vec();
        expected.extend_from_slice(&[b'x'; 32]);
        expected.extend_from_slice(b"\r\n3\r\nxxx\r\n0\r\nx-content-length: 35\r\n\r\n");

        assert!(writer.is_closed());
        assert_eq!(&writer.into_inner()[head_len..], &expected[..]);
    }

    #[tokio::test]
    async fn write_trailers_adds_last_chunk() {
        let mut writer = ResponseWriter::new(Vec::new());

        writer.write_status_line(StatusCode::OK).unwrap();
        writer.write_headers(&chunked_headers()).await.unwrap();
        let head_len = writer.get_mut().len();
        writer.write_body(b"hello").await.unwrap();

        let trailers: Headers = [("X-Checksum", "abc")].into_iter().collect();
        writer.write_trailers(&trailers).await.unwrap();

        assert_eq!(&writer.into_inner()[head_len..], &b"5\r\nhello\r\n0\r\nx-checksum: abc\r\n\r\n"[..]);
    }

    #[tokio::test]
    async fn write_chunks_requires_chunked_body() {
        let mut writer = ResponseWriter::new(Vec::new());

        writer.write_status_line(StatusCode::OK).unwrap();
        writer.write_headers(&ResponseWriter::<Vec<u8>>::default_headers(3)).await.unwrap();

        assert!(matches!(writer.write_chunks(b"abc", 1).await, Err(SendError::NotChunked)));
    }

    #[tokio::test]
    async fn status_line_is_buffered_until_headers() {
        let mut writer = ResponseWriter::new(Vec::new());

        writer.write_status_line(StatusCode::BAD_REQUEST).unwrap();
        assert!(writer.get_mut().is_empty());
        assert!(writer.is_pristine());

        writer.reset();
        writer.write_status_line(StatusCode::INTERNAL_SERVER_ERROR).unwrap();
        writer.write_headers(&ResponseWriter::<Vec<u8>>::default_headers(0)).await.unwrap();

        assert!(writer.get_mut().starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(!writer.is_pristine());
    }

    #[tokio::test]
    async fn out_of_order_writes_nothing() {
        let mut writer = ResponseWriter::new(Vec::new());

        assert!(matches!(writer.write_body(b"body first").await, Err(SendError::OutOfOrder { .. })));
        assert!(matches!(writer.write_headers(&Headers::new()).await, Err(SendError::OutOfOrder { .. })));
        assert!(writer.into_inner().is_empty());
    }
}
