//! Response encoding for the pinwire wire protocol.
//!
//! Response format:
//! ```text
//! HTTP/1.1 <CODE> <REASON>\r\n
//! Content-Type: text/plain\r\n
//! <fixed CORS and connection headers>\r\n
//! \r\n
//! <body>\r\n
//! ```

use core::fmt::{self, Write};

use heapless::{String, Vec};

/// Maximum response body size in bytes
pub const MAX_BODY_SIZE: usize = 1024;

/// Room reserved for the status line and fixed headers
const HEAD_RESERVE: usize = 256;

/// Maximum encoded response size
pub const MAX_RESPONSE_SIZE: usize = MAX_BODY_SIZE + HEAD_RESERVE;

const PROTOCOL: &str = "HTTP/1.1";
const CONTENT_TYPE: &str = "text/plain";

// Browsers talk to the device from arbitrary origins.
const CORS_ALLOW_ORIGIN: &str = "*";
const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Errors that can occur during response encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Buffer too small for the encoded response
    BufferTooSmall,
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// 200
    Ok,
    /// 400: malformed input, bad method for a known path, unparseable parameter
    BadRequest,
    /// 404: path not recognized
    NotFound,
    /// 406: well-formed request that violates a pin precondition
    NotAcceptable,
    /// 500: validated operation failed in hardware or storage
    InternalServerError,
}

impl Status {
    /// Numeric status code
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::NotAcceptable => 406,
            Status::InternalServerError => 500,
        }
    }

    /// Reason phrase
    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::NotAcceptable => "Not Acceptable",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// A response ready to be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,
    /// Plain-text body
    pub body: String<MAX_BODY_SIZE>,
}

impl Response {
    /// Create a response with an empty body
    pub fn new(status: Status) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    /// Create a response with a text body
    ///
    /// Text beyond [`MAX_BODY_SIZE`] is cut at the last whole character.
    pub fn text(status: Status, text: &str) -> Self {
        let mut response = Self::new(status);
        response.push_str_lossy(text);
        response
    }

    /// Append text to the body, dropping whatever does not fit
    pub fn push_str_lossy(&mut self, text: &str) {
        for ch in text.chars() {
            if self.body.push(ch).is_err() {
                break;
            }
        }
    }

    /// Append formatted text to the body, dropping whatever does not fit
    ///
    /// Text written before a failing `Display` impl is kept.
    pub fn push_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.writer().write_fmt(args);
    }

    /// `fmt::Write` into the body that never fails; overflow is dropped
    pub fn writer(&mut self) -> BodyWriter<'_> {
        BodyWriter(self)
    }

    /// Encode this response into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let mut out = SliceWriter { buf: buffer, len: 0 };
        core::write!(
            out,
            "{} {} {}\r\n\
             Content-Type: {}\r\n\
             Access-Control-Allow-Origin: {}\r\n\
             Access-Control-Allow-Methods: {}\r\n\
             Access-Control-Allow-Headers: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}\r\n",
            PROTOCOL,
            self.status.code(),
            self.status.reason(),
            CONTENT_TYPE,
            CORS_ALLOW_ORIGIN,
            CORS_ALLOW_METHODS,
            CORS_ALLOW_HEADERS,
            self.body,
        )
        .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out.len)
    }

    /// Encode this response into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_RESPONSE_SIZE>, EncodeError> {
        let mut vec = Vec::new();
        vec.resize_default(MAX_RESPONSE_SIZE)
            .map_err(|_| EncodeError::BufferTooSmall)?;
        let len = self.encode(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }
}

/// Lossy writer returned by [`Response::writer`]
pub struct BodyWriter<'a>(&'a mut Response);

impl Write for BodyWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.push_str_lossy(s);
        Ok(())
    }
}

/// `fmt::Write` adapter over a fixed byte slice
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(Status::Ok.code(), 200);
        assert_eq!(Status::NotAcceptable.code(), 406);
        assert_eq!(Status::NotAcceptable.reason(), "Not Acceptable");
        assert_eq!(Status::InternalServerError.reason(), "Internal Server Error");
    }

    #[test]
    fn test_encode_wire_format() {
        let response = Response::text(Status::NotFound, "no such path");
        let encoded = response.encode_to_vec().unwrap();
        let text = core::str::from_utf8(&encoded).unwrap();

        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nno such path\r\n"));
    }

    #[test]
    fn test_encode_empty_body() {
        let response = Response::new(Status::Ok);
        let encoded = response.encode_to_vec().unwrap();
        assert!(encoded.ends_with(b"\r\n\r\n\r\n"));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let response = Response::text(Status::Ok, "hello");
        let mut buffer = [0u8; 16];
        assert_eq!(response.encode(&mut buffer), Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_full_body_fits_response() {
        let mut response = Response::new(Status::Ok);
        for _ in 0..MAX_BODY_SIZE + 10 {
            response.push_str_lossy("x");
        }
        assert_eq!(response.body.len(), MAX_BODY_SIZE);
        assert!(response.encode_to_vec().is_ok());
    }

    #[test]
    fn test_push_fmt() {
        let mut response = Response::new(Status::Ok);
        response.push_fmt(format_args!("pin {} set to {}\n", 3, "high"));
        assert_eq!(response.body.as_str(), "pin 3 set to high\n");
    }

    #[test]
    fn test_push_fmt_drops_overflow() {
        let mut response = Response::new(Status::Ok);
        for _ in 0..MAX_BODY_SIZE - 2 {
            response.push_str_lossy("a");
        }
        response.push_fmt(format_args!("{}{}", "xyz", 42));
        assert_eq!(response.body.len(), MAX_BODY_SIZE);
        assert!(response.body.ends_with("axy"));
    }

    #[test]
    fn test_text_truncates_on_char_boundary() {
        let mut response = Response::new(Status::Ok);
        for _ in 0..MAX_BODY_SIZE - 1 {
            response.push_str_lossy("a");
        }
        response.push_str_lossy("é");
        assert_eq!(response.body.len(), MAX_BODY_SIZE - 1);
    }
}
