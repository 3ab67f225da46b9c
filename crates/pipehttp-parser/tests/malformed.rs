//! Malformed-input corpus: every entry must reject as `BadRequest`,
//! never report `Incomplete`, and never panic, including when the
//! violating bytes straddle a segment boundary.

use pipehttp_parser::{
    HeadersHandler, HttpParser, RejectionReason, RequestLine, RequestLineHandler, SliceSequence,
};

#[derive(Default)]
struct Sink {
    lines: usize,
    headers: usize,
}

impl RequestLineHandler for Sink {
    fn on_request_line(&mut self, _line: &RequestLine<'_>) {
        self.lines += 1;
    }
}

impl HeadersHandler for Sink {
    fn on_header(&mut self, _name: &[u8], _value: &[u8]) {
        self.headers += 1;
    }
}

fn reject_request_line(input: &[u8]) -> RejectionReason {
    let mut parser = HttpParser::new();
    let mut sink = Sink::default();
    let error = parser
        .parse_request_line(&mut sink, input)
        .expect_err("must reject");
    assert_eq!(sink.lines, 0, "no callback on rejection");
    error.reason
}

fn reject_headers(input: &[u8]) -> RejectionReason {
    let mut parser = HttpParser::new();
    let mut sink = Sink::default();
    let error = parser
        .parse_headers(&mut sink, input)
        .expect_err("must reject");
    assert_eq!(sink.headers, 0, "no callback on rejection");
    error.reason
}

#[test]
fn missing_space_after_method() {
    assert_eq!(
        reject_request_line(b"GET/ HTTP/1.1\r\n"),
        RejectionReason::InvalidRequestLine
    );
}

#[test]
fn missing_crlf_after_version() {
    assert_eq!(
        reject_request_line(b"GET / HTTP/1.1\n"),
        RejectionReason::InvalidRequestLine
    );
    assert_eq!(
        reject_request_line(b"GET / HTTP/1.1 \r\n"),
        RejectionReason::InvalidRequestLine
    );
}

#[test]
fn unknown_eight_byte_version_token() {
    assert_eq!(
        reject_request_line(b"GET / HTTP/2.2\r\n"),
        RejectionReason::UnrecognizedVersion
    );
    assert_eq!(
        reject_request_line(b"GET / HXTP/1.1\r\n"),
        RejectionReason::UnrecognizedVersion
    );
}

#[test]
fn header_line_without_a_colon() {
    // With and without the block terminator: the line is complete, so it
    // rejects either way instead of hiding behind Incomplete.
    assert_eq!(
        reject_headers(b"Host example.com\r\n\r\n"),
        RejectionReason::InvalidHeaderLine
    );
    assert_eq!(
        reject_headers(b"Host example.com\r\n"),
        RejectionReason::InvalidHeaderLine
    );
}

#[test]
fn colon_immediately_followed_by_cr() {
    assert_eq!(reject_headers(b"Host:\r\n\r\n"), RejectionReason::EmptyHeaderValue);
    assert_eq!(reject_headers(b"Host:\r\n"), RejectionReason::EmptyHeaderValue);
}

#[test]
fn empty_header_name() {
    assert_eq!(
        reject_headers(b": value\r\n\r\n"),
        RejectionReason::EmptyHeaderName
    );
    assert_eq!(
        reject_headers(b": value\r\n"),
        RejectionReason::EmptyHeaderName
    );
}

#[test]
fn whitespace_inside_a_header_name() {
    assert_eq!(
        reject_headers(b"Bad Name: value\r\n\r\n"),
        RejectionReason::InvalidHeaderLine
    );
}

#[test]
fn stray_cr_inside_a_header_value() {
    assert_eq!(
        reject_headers(b"A: b\rc\r\n\r\n"),
        RejectionReason::InvalidHeaderLine
    );
}

#[test]
fn header_line_ending_in_bare_lf() {
    assert_eq!(
        reject_headers(b"Host: example.com\n\r\n"),
        RejectionReason::HeadersNotCrlfTerminated
    );
}

#[test]
fn cr_not_followed_by_lf_at_block_level() {
    assert_eq!(
        reject_headers(b"\rjunk"),
        RejectionReason::HeadersNotCrlfTerminated
    );
}

#[test]
fn corpus_still_rejects_when_split_across_segments() {
    let mut parser = HttpParser::new();
    let mut sink = Sink::default();

    let input = b"GET / HTTP/2.2\r\n";
    for split in 1..input.len() {
        let segments: [&[u8]; 2] = [&input[..split], &input[split..]];
        let sequence = SliceSequence::new(&segments);
        let error = parser
            .parse_request_line(&mut sink, &sequence)
            .expect_err("must reject");
        assert_eq!(error.reason, RejectionReason::UnrecognizedVersion, "split {split}");
    }

    let input = b"Host:\r\n\r\n";
    for split in 1..input.len() {
        let segments: [&[u8]; 2] = [&input[..split], &input[split..]];
        let sequence = SliceSequence::new(&segments);
        let error = parser
            .parse_headers(&mut sink, &sequence)
            .expect_err("must reject");
        assert_eq!(error.reason, RejectionReason::EmptyHeaderValue, "split {split}");
    }

    assert_eq!(sink.lines, 0);
    assert_eq!(sink.headers, 0);
}

#[test]
fn rejection_carries_the_failure_position() {
    let mut parser = HttpParser::new();
    let mut sink = Sink::default();

    // The second header line is the malformed one.
    let error = parser
        .parse_headers(&mut sink, b"Host: h\r\nbroken\r\n\r\n".as_slice())
        .expect_err("must reject");
    assert_eq!(error.reason, RejectionReason::InvalidHeaderLine);
    assert_eq!(error.at.offset(), 9);
}
