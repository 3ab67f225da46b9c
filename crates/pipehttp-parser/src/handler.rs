//! Handler interfaces and the borrowed request-line view.
//!
//! The parser reports what it consumed through these callbacks instead of
//! building a request object, decoupling parsing from any particular
//! representation. Every span handed to a handler borrows from the
//! caller's buffer (or the parser's line scratch) and is valid only for
//! the duration of the callback.

use crate::tokens::{Method, Version};

/// A zero-copy view of a parsed request line.
///
/// Borrows from the buffer being parsed; must not be retained past the
/// callback it is delivered to.
#[derive(Debug, Clone, Copy)]
pub struct RequestLine<'a> {
    pub(crate) method: Method,
    pub(crate) version: Version,
    pub(crate) target: &'a [u8],
    pub(crate) path: &'a [u8],
    pub(crate) query: Option<&'a [u8]>,
    pub(crate) custom_method: Option<&'a [u8]>,
    pub(crate) path_encoded: bool,
}

impl<'a> RequestLine<'a> {
    /// The recognized method, or [`Method::Custom`].
    #[inline]
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The recognized HTTP version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// The full target: path plus `?query` when one is present.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &'a [u8] {
        self.target
    }

    /// The path portion of the target.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &'a [u8] {
        self.path
    }

    /// The query portion of the target, without the leading `?`.
    #[inline]
    #[must_use]
    pub fn query(&self) -> Option<&'a [u8]> {
        self.query
    }

    /// Raw method bytes when the method is [`Method::Custom`].
    #[inline]
    #[must_use]
    pub fn custom_method(&self) -> Option<&'a [u8]> {
        self.custom_method
    }

    /// True when the path contains percent-encoding the receiver may need
    /// to decode. Decoding is the receiver's concern, not the parser's.
    #[inline]
    #[must_use]
    pub fn path_encoded(&self) -> bool {
        self.path_encoded
    }
}

/// Receives the request line once it has been fully parsed.
pub trait RequestLineHandler {
    /// Called exactly once per successfully parsed request line.
    fn on_request_line(&mut self, line: &RequestLine<'_>);
}

/// Receives each header of a well-formed header block.
pub trait HeadersHandler {
    /// Called once per header line, in order. `value` has optional
    /// whitespace around it trimmed; `name` is reported as written.
    fn on_header(&mut self, name: &[u8], value: &[u8]);
}

/// Receives a response status line once it has been fully parsed.
pub trait ResponseLineHandler {
    /// Called exactly once per successfully parsed status line. `reason`
    /// may be empty.
    fn on_status_line(&mut self, version: Version, status: u16, reason: &[u8]);
}
