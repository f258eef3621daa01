//! Request parsing for the pinwire wire protocol.
//!
//! Request format:
//! ```text
//! <METHOD> <PATH> <PROTOCOL>\r\n
//! <header block>\r\n
//! \r\n
//! <body>
//! ```
//!
//! Method, path and protocol are ASCII-lowercased. The header block is kept
//! as opaque bytes. The body is taken verbatim.
//!
//! When a delimiter never shows up the field being read simply extends to the
//! end of the input, and all later fields stay empty.

use heapless::{String, Vec};

/// Maximum method token length
pub const MAX_METHOD_LEN: usize = 8;

/// Maximum path token length
pub const MAX_PATH_LEN: usize = 64;

/// Maximum protocol token length
pub const MAX_PROTOCOL_LEN: usize = 16;

/// Header bytes retained; anything beyond is dropped
pub const MAX_HEADERS_LEN: usize = 512;

/// Maximum body length
pub const MAX_BODY_LEN: usize = 256;

/// Errors that can occur while parsing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// No bytes were received at all
    Empty,
    /// Method or path missing, or not valid UTF-8
    Malformed,
    /// A field exceeded its capacity
    TooLong,
}

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Options,
    /// Anything else; routed as an unsupported method
    Other,
}

impl Method {
    /// Classify a lowercased method token
    pub fn parse(token: &str) -> Self {
        match token {
            "get" => Method::Get,
            "post" => Method::Post,
            "put" => Method::Put,
            "delete" => Method::Delete,
            "options" => Method::Options,
            _ => Method::Other,
        }
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Lowercased method token
    pub method: String<MAX_METHOD_LEN>,
    /// Lowercased path token
    pub path: String<MAX_PATH_LEN>,
    /// Lowercased protocol token, recorded but unused
    pub protocol: String<MAX_PROTOCOL_LEN>,
    /// Raw header block, possibly truncated
    pub headers: Vec<u8, MAX_HEADERS_LEN>,
    /// Body, verbatim
    pub body: String<MAX_BODY_LEN>,
}

impl Request {
    /// Classified method
    pub fn method(&self) -> Method {
        Method::parse(&self.method)
    }
}

/// State machine for parsing an incoming request byte by byte
#[derive(Debug, Clone)]
pub struct RequestParser {
    state: ParseState,
    method: Vec<u8, MAX_METHOD_LEN>,
    path: Vec<u8, MAX_PATH_LEN>,
    protocol: Vec<u8, MAX_PROTOCOL_LEN>,
    headers: Vec<u8, MAX_HEADERS_LEN>,
    body: Vec<u8, MAX_BODY_LEN>,
    /// Non-CR bytes on the current header line
    line_len: usize,
    fed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Reading the method token, up to the first space
    Method,
    /// Reading the path token, up to the next space
    Path,
    /// Reading the protocol token, up to end of line
    Protocol,
    /// Reading header lines, up to the first blank line
    Headers,
    /// Everything else is body
    Body,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// Create a new request parser
    pub fn new() -> Self {
        Self {
            state: ParseState::Method,
            method: Vec::new(),
            path: Vec::new(),
            protocol: Vec::new(),
            headers: Vec::new(),
            body: Vec::new(),
            line_len: 0,
            fed: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed a single byte to the parser
    pub fn feed(&mut self, byte: u8) -> Result<(), RequestError> {
        self.fed += 1;

        match self.state {
            ParseState::Method => {
                if byte == b' ' {
                    self.state = ParseState::Path;
                    return Ok(());
                }
                push_lower(&mut self.method, byte)
            }
            ParseState::Path => {
                if byte == b' ' {
                    self.state = ParseState::Protocol;
                    return Ok(());
                }
                push_lower(&mut self.path, byte)
            }
            ParseState::Protocol => {
                if byte == b'\n' {
                    trim_line_end(&mut self.protocol);
                    self.state = ParseState::Headers;
                    self.line_len = 0;
                    return Ok(());
                }
                push_lower(&mut self.protocol, byte)
            }
            ParseState::Headers => {
                match byte {
                    b'\n' if self.line_len == 0 => {
                        // Blank line: the header block is over
                        trim_line_end(&mut self.headers);
                        self.state = ParseState::Body;
                        return Ok(());
                    }
                    b'\n' => self.line_len = 0,
                    b'\r' => {}
                    _ => self.line_len += 1,
                }
                // Overflow is dropped; only the body length is enforced
                let _ = self.headers.push(byte);
                Ok(())
            }
            ParseState::Body => self.body.push(byte).map_err(|_| RequestError::TooLong),
        }
    }

    /// Feed multiple bytes to the parser
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<(), RequestError> {
        for &byte in bytes {
            self.feed(byte)?;
        }
        Ok(())
    }

    /// Finish parsing at end of input and take the request out
    ///
    /// The parser is reset afterwards, whatever the outcome.
    pub fn finish(&mut self) -> Result<Request, RequestError> {
        let parser = core::mem::take(self);

        if parser.fed == 0 {
            return Err(RequestError::Empty);
        }
        if parser.method.is_empty() || parser.path.is_empty() {
            return Err(RequestError::Malformed);
        }

        let mut headers = parser.headers;
        if parser.state == ParseState::Headers {
            trim_line_end(&mut headers);
        }

        Ok(Request {
            method: String::from_utf8(parser.method).map_err(|_| RequestError::Malformed)?,
            path: String::from_utf8(parser.path).map_err(|_| RequestError::Malformed)?,
            protocol: String::from_utf8(parser.protocol).map_err(|_| RequestError::Malformed)?,
            headers,
            body: String::from_utf8(parser.body).map_err(|_| RequestError::Malformed)?,
        })
    }
}

fn push_lower<const N: usize>(field: &mut Vec<u8, N>, byte: u8) -> Result<(), RequestError> {
    field
        .push(byte.to_ascii_lowercase())
        .map_err(|_| RequestError::TooLong)
}

fn trim_line_end<const N: usize>(field: &mut Vec<u8, N>) {
    while matches!(field.last(), Some(b'\r') | Some(b'\n')) {
        field.pop();
    }
}
