//! The request-line, header-block, and status-line parsers.
//!
//! All three entry points share the same shape: locate the terminating
//! LF with the cursor (cheap local scan first, following segments only on
//! a miss), materialize the line as one contiguous span (borrowed
//! straight from the segment on the hot path, stitched into a reused
//! scratch buffer only when it straddles a boundary), and parse the span.
//!
//! On `Incomplete` nothing is consumed and no callbacks fire; the caller
//! retains the region and calls again once more data arrived. The parsers
//! rescan from the start of the region on every call rather than saving
//! partial progress; request heads are small and bounded by the limits,
//! so the simpler contract wins.

use crate::error::{BadRequest, RejectionReason};
use crate::handler::{HeadersHandler, RequestLine, RequestLineHandler, ResponseLineHandler};
use crate::tokens::{self, Method, Version};

use pipehttp_buffers::{text, BufferCursor, Position, SegmentedSequence};

/// Parsing limits for request lines and header blocks.
#[derive(Debug, Clone)]
pub struct ParseLimits {
    /// Maximum request-line length in bytes (CRLF included).
    pub max_request_line_len: usize,
    /// Maximum length of a custom method token.
    pub max_method_len: usize,
    /// Maximum length of a single header line (CRLF included).
    pub max_header_line_len: usize,
    /// Maximum number of headers in a block.
    pub max_header_count: usize,
    /// Maximum total header-block size (terminator included).
    pub max_headers_size: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_request_line_len: 8 * 1024, // 8KB
            max_method_len: 64,
            max_header_line_len: 8 * 1024, // 8KB
            max_header_count: 100,
            max_headers_size: 64 * 1024, // 64KB
        }
    }
}

/// Outcome of a parse attempt that did not reject the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The element was fully parsed and reported to the handler.
    Complete {
        /// First byte the caller may discard up to (exclusive).
        consumed: Position,
        /// How far the parser looked; equals `consumed` on completion.
        examined: Position,
        /// Bytes consumed from the start of the region.
        bytes: usize,
    },
    /// Not enough data yet. Nothing was consumed and no callbacks fired;
    /// retry with the same region once more data is available.
    Incomplete {
        /// How far the parser looked (the end of the available data).
        examined: Position,
    },
}

impl ParseStatus {
    /// True for [`ParseStatus::Complete`].
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Incremental HTTP/1.x parser over a [`SegmentedSequence`].
///
/// Created once per connection and reused across reads; the only state it
/// owns is a scratch buffer for lines that straddle a segment boundary,
/// so the contiguous hot path never allocates. Single-threaded and
/// non-reentrant; "waiting for data" is expressed purely as
/// [`ParseStatus::Incomplete`].
pub struct HttpParser {
    limits: ParseLimits,
    /// Reused stitch buffer for boundary-straddling lines.
    line_buf: Vec<u8>,
}

impl HttpParser {
    /// Create a parser with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limits: ParseLimits::default(),
            line_buf: Vec::new(),
        }
    }

    /// Set all parsing limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Clear internal parse scratch for the next message on the same
    /// connection. Buffer positions are the caller's; this never touches
    /// them.
    pub fn reset(&mut self) {
        self.line_buf.clear();
    }

    /// Parse one request line from the front of `buffer`.
    ///
    /// On success the start-line handler is invoked exactly once and the
    /// returned status carries the position just past the line's CRLF.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] on any syntactic violation, including an
    /// unrecognized HTTP version and a line exceeding
    /// the configured maximum length.
    pub fn parse_request_line<H, S>(
        &mut self,
        handler: &mut H,
        buffer: &S,
    ) -> Result<ParseStatus, BadRequest>
    where
        H: RequestLineHandler,
        S: SegmentedSequence + ?Sized,
    {
        let start = BufferCursor::new(buffer);
        let line_at = start.position();

        let mut cursor = start;
        if cursor.find_byte(b'\n').is_none() {
            if cursor.remaining() > self.limits.max_request_line_len {
                return Err(BadRequest::new(RejectionReason::RequestLineTooLong, line_at));
            }
            return Ok(ParseStatus::Incomplete {
                examined: cursor.end_position(),
            });
        }
        let length = cursor.consumed();
        if length > self.limits.max_request_line_len {
            return Err(BadRequest::new(RejectionReason::RequestLineTooLong, line_at));
        }

        let line = line_slice(&start, length, &mut self.line_buf);
        parse_request_line_span(line, &self.limits, line_at, handler)?;

        Ok(ParseStatus::Complete {
            consumed: cursor.position(),
            examined: cursor.position(),
            bytes: length,
        })
    }

    /// Parse a header block terminated by a bare CRLF.
    ///
    /// Valid for request and response header blocks alike. The headers
    /// handler is invoked once per line, in order, only after the whole
    /// block has been validated; an `Incomplete` result therefore never
    /// emits callbacks, which keeps retries idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] on any syntactic violation. Malformed lines
    /// reject as soon as they are complete, even when the block
    /// terminator has not arrived yet.
    pub fn parse_headers<H, S>(
        &mut self,
        handler: &mut H,
        buffer: &S,
    ) -> Result<ParseStatus, BadRequest>
    where
        H: HeadersHandler,
        S: SegmentedSequence + ?Sized,
    {
        let start = BufferCursor::new(buffer);

        // Validation pass: walk lines up to the terminator without
        // emitting anything.
        let mut probe = start;
        let mut header_count = 0usize;
        let terminated = loop {
            match probe.peek() {
                None => break false,
                Some(b'\r') => {
                    let line_at = probe.position();
                    let mut pair = probe;
                    pair.take();
                    match pair.take() {
                        None => break false,
                        Some(b'\n') => break true,
                        Some(_) => {
                            return Err(BadRequest::new(
                                RejectionReason::HeadersNotCrlfTerminated,
                                line_at,
                            ));
                        }
                    }
                }
                Some(_) => {
                    let line_at = probe.position();
                    let line_cursor = probe;
                    if probe.find_byte(b'\n').is_none() {
                        if probe.remaining() > self.limits.max_header_line_len {
                            return Err(BadRequest::new(
                                RejectionReason::HeaderLineTooLong,
                                line_at,
                            ));
                        }
                        break false;
                    }
                    let length = probe.consumed() - line_cursor.consumed();
                    if length > self.limits.max_header_line_len {
                        return Err(BadRequest::new(RejectionReason::HeaderLineTooLong, line_at));
                    }
                    let line = line_slice(&line_cursor, length, &mut self.line_buf);
                    split_header_line(line).map_err(|reason| BadRequest::new(reason, line_at))?;
                    header_count += 1;
                    if header_count > self.limits.max_header_count {
                        return Err(BadRequest::new(RejectionReason::TooManyHeaders, line_at));
                    }
                    if probe.consumed() > self.limits.max_headers_size {
                        return Err(BadRequest::new(RejectionReason::HeadersTooLarge, line_at));
                    }
                }
            }
        };

        if !terminated {
            if start.remaining() > self.limits.max_headers_size {
                return Err(BadRequest::new(
                    RejectionReason::HeadersTooLarge,
                    start.position(),
                ));
            }
            return Ok(ParseStatus::Incomplete {
                examined: start.end_position(),
            });
        }

        // Emit pass: the block is well formed.
        let mut cursor = start;
        while cursor.peek() != Some(b'\r') {
            let line_at = cursor.position();
            let line_cursor = cursor;
            let found = cursor.find_byte(b'\n');
            debug_assert!(found.is_some(), "line terminators were validated");
            let length = cursor.consumed() - line_cursor.consumed();
            let line = line_slice(&line_cursor, length, &mut self.line_buf);
            let (name, value) =
                split_header_line(line).map_err(|reason| BadRequest::new(reason, line_at))?;
            handler.on_header(name, value);
        }
        cursor.skip(2);

        Ok(ParseStatus::Complete {
            consumed: cursor.position(),
            examined: cursor.position(),
            bytes: cursor.consumed(),
        })
    }

    /// Parse one response status line from the front of `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] when the line violates
    /// `HTTP/1.x SP status-code SP reason CRLF` (the reason phrase may be
    /// empty) or exceeds the request-line length limit.
    pub fn parse_response_line<H, S>(
        &mut self,
        handler: &mut H,
        buffer: &S,
    ) -> Result<ParseStatus, BadRequest>
    where
        H: ResponseLineHandler,
        S: SegmentedSequence + ?Sized,
    {
        let start = BufferCursor::new(buffer);
        let line_at = start.position();

        let mut cursor = start;
        if cursor.find_byte(b'\n').is_none() {
            if cursor.remaining() > self.limits.max_request_line_len {
                return Err(BadRequest::new(RejectionReason::InvalidStatusLine, line_at));
            }
            return Ok(ParseStatus::Incomplete {
                examined: cursor.end_position(),
            });
        }
        let length = cursor.consumed();
        if length > self.limits.max_request_line_len {
            return Err(BadRequest::new(RejectionReason::InvalidStatusLine, line_at));
        }

        let line = line_slice(&start, length, &mut self.line_buf);
        parse_status_line_span(line, line_at, handler)?;

        Ok(ParseStatus::Complete {
            consumed: cursor.position(),
            examined: cursor.position(),
            bytes: length,
        })
    }
}

impl Default for HttpParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Materialize `length` bytes at the cursor as one contiguous span:
/// borrowed from the current segment when possible, otherwise stitched
/// into `scratch` (reused across calls, so this allocates at most once
/// per connection for the largest straddling line).
fn line_slice<'b, 'a: 'b, S>(
    cursor: &BufferCursor<'a, S>,
    length: usize,
    scratch: &'b mut Vec<u8>,
) -> &'b [u8]
where
    S: SegmentedSequence + ?Sized,
{
    let unread = cursor.unread();
    if unread.len() >= length {
        return &unread[..length];
    }
    scratch.clear();
    scratch.resize(length, 0);
    let copied = cursor.peek_copy(scratch);
    debug_assert_eq!(copied, length);
    &scratch[..]
}

/// RFC 7230 `token` characters, for custom method validation.
fn is_token_char(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'
    )
}

/// Scan a custom method token up to its terminating space.
fn unknown_method_token(line: &[u8], max_len: usize) -> Option<&[u8]> {
    for (index, &byte) in line.iter().enumerate() {
        if byte == b' ' {
            if index == 0 {
                return None;
            }
            return Some(&line[..index]);
        }
        if index >= max_len || !is_token_char(byte) {
            return None;
        }
    }
    None
}

/// Parse a complete request line (trailing LF included in `line`).
fn parse_request_line_span<H: RequestLineHandler>(
    line: &[u8],
    limits: &ParseLimits,
    at: Position,
    handler: &mut H,
) -> Result<(), BadRequest> {
    let invalid = || BadRequest::new(RejectionReason::InvalidRequestLine, at);

    if memchr::memchr(0, line).is_some() {
        return Err(invalid());
    }

    let (method, known_length) = tokens::known_method(line);
    let (custom_method, method_length) = if method == Method::Custom {
        let token = unknown_method_token(line, limits.max_method_len).ok_or_else(invalid)?;
        (Some(token), token.len())
    } else {
        (None, known_length)
    };

    // Skip the space.
    let mut offset = method_length + 1;

    // Target: path, then optional query. An empty path or one led by `%`
    // is illegal; `%` anywhere later only flags the path as encoded.
    let mut path_encoded = false;
    let mut path_start = None;
    let mut ch = 0u8;
    while offset < line.len() {
        ch = line[offset];
        if ch == b' ' || ch == b'?' {
            if path_start.is_none() {
                return Err(invalid());
            }
            break;
        }
        if ch == b'%' {
            if path_start.is_none() {
                return Err(invalid());
            }
            path_encoded = true;
        } else if path_start.is_none() {
            path_start = Some(offset);
        }
        offset += 1;
    }
    let Some(path_start) = path_start else {
        return Err(invalid());
    };
    let path = &line[path_start..offset];

    let query_mark = offset;
    if ch == b'?' {
        while offset < line.len() && line[offset] != b' ' {
            offset += 1;
        }
    }
    if offset == line.len() {
        // No space before the end of the line.
        return Err(invalid());
    }
    let target = &line[path_start..offset];
    let query = if ch == b'?' {
        Some(&line[query_mark + 1..offset])
    } else {
        None
    };

    // Consume the space; the rest must be exactly `HTTP/1.x CRLF`.
    offset += 1;
    let rest = &line[offset..];
    if rest.len() != 10 || rest[8] != b'\r' || rest[9] != b'\n' {
        return Err(invalid());
    }
    let version = match tokens::known_version(rest) {
        Version::Unknown => {
            return Err(BadRequest::new(RejectionReason::UnrecognizedVersion, at));
        }
        version => version,
    };

    handler.on_request_line(&RequestLine {
        method,
        version,
        target,
        path,
        query,
        custom_method,
        path_encoded,
    });
    Ok(())
}

/// Split a complete header line (trailing LF included) into its
/// name and OWS-trimmed value.
fn split_header_line(line: &[u8]) -> Result<(&[u8], &[u8]), RejectionReason> {
    if line.len() < 2 || line[line.len() - 2] != b'\r' {
        return Err(RejectionReason::HeadersNotCrlfTerminated);
    }
    let content = &line[..line.len() - 2];
    let Some(colon) = memchr::memchr(b':', content) else {
        return Err(RejectionReason::InvalidHeaderLine);
    };
    let name = &content[..colon];
    if name.is_empty() {
        return Err(RejectionReason::EmptyHeaderName);
    }
    if name
        .iter()
        .any(|&byte| byte == b' ' || byte == b'\t' || byte == b'\r')
    {
        return Err(RejectionReason::InvalidHeaderLine);
    }
    let value = &content[colon + 1..];
    if value.is_empty() {
        // Colon immediately followed by CR.
        return Err(RejectionReason::EmptyHeaderValue);
    }
    if memchr::memchr(b'\r', value).is_some() {
        return Err(RejectionReason::InvalidHeaderLine);
    }
    Ok((name, trim_ows(value)))
}

/// Trim optional whitespace (SP / HTAB) from both ends of a value.
fn trim_ows(value: &[u8]) -> &[u8] {
    let start = value
        .iter()
        .position(|&byte| byte != b' ' && byte != b'\t')
        .unwrap_or(value.len());
    let end = value
        .iter()
        .rposition(|&byte| byte != b' ' && byte != b'\t')
        .map_or(start, |last| last + 1);
    &value[start..end]
}

/// Parse a complete status line (trailing LF included in `line`).
fn parse_status_line_span<H: ResponseLineHandler>(
    line: &[u8],
    at: Position,
    handler: &mut H,
) -> Result<(), BadRequest> {
    let invalid = || BadRequest::new(RejectionReason::InvalidStatusLine, at);

    if line.len() < 2 || line[line.len() - 2] != b'\r' {
        return Err(invalid());
    }
    let content = &line[..line.len() - 2];
    if content.len() < 9 || content[8] != b' ' {
        return Err(invalid());
    }
    let version = match tokens::known_version_token(content) {
        Version::Unknown => return Err(invalid()),
        version => version,
    };
    let rest = &content[9..];
    let Some((status, used)) = text::parse_u16(rest) else {
        return Err(invalid());
    };
    let reason: &[u8] = match rest.get(used).copied() {
        None => &[],
        Some(b' ') => &rest[used + 1..],
        Some(_) => return Err(invalid()),
    };

    handler.on_status_line(version, status, reason);
    Ok(())
}
