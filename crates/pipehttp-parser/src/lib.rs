//! Zero-copy, incremental HTTP/1.x request parsing over segmented buffers.
//!
//! This crate parses request lines and header blocks directly out of a
//! pooled, non-contiguous receive buffer (any [`SegmentedSequence`]),
//! without copying bytes into a staging area and without heap allocation
//! on the hot path.
//!
//! # Features
//!
//! - Pull-based and resumable: [`ParseStatus::Incomplete`] means "feed me
//!   more", with nothing consumed and no callbacks fired
//! - Callback handlers receive borrowed spans, decoupling parsing from
//!   any request representation
//! - Masked-integer fast paths for known methods, versions, and schemes
//! - Strict wire grammar; malformed input is a typed [`BadRequest`],
//!   never a panic
//!
//! # Example
//!
//! ```
//! use pipehttp_parser::{HeadersHandler, HttpParser, RequestLine, RequestLineHandler};
//!
//! #[derive(Default)]
//! struct Collect {
//!     path: Vec<u8>,
//!     headers: usize,
//! }
//!
//! impl RequestLineHandler for Collect {
//!     fn on_request_line(&mut self, line: &RequestLine<'_>) {
//!         self.path = line.path().to_vec();
//!     }
//! }
//!
//! impl HeadersHandler for Collect {
//!     fn on_header(&mut self, _name: &[u8], _value: &[u8]) {
//!         self.headers += 1;
//!     }
//! }
//!
//! let mut parser = HttpParser::new();
//! let mut collect = Collect::default();
//!
//! let buffer = b"GET /items HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let status = parser
//!     .parse_request_line(&mut collect, buffer.as_slice())
//!     .expect("well-formed request");
//! assert!(status.is_complete());
//! assert_eq!(collect.path, b"/items");
//! ```
//!
//! The transport owns all I/O: it hands the parser a view of the bytes
//! received so far, discards what `Complete` marks consumed, and retries
//! on `Incomplete` after the next read.

#![deny(unsafe_code)]

mod error;
mod handler;
mod parser;
pub mod tokens;

pub use error::{BadRequest, RejectionReason};
pub use handler::{HeadersHandler, RequestLine, RequestLineHandler, ResponseLineHandler};
pub use parser::{HttpParser, ParseLimits, ParseStatus};
pub use tokens::{Method, Scheme, Version};

pub use pipehttp_buffers::{BufferCursor, Position, SegmentedSequence, SliceSequence};
