//! Parse a pipelined pair of requests out of a segmented buffer, the way
//! a transport would drive the parser from its receive loop.

use pipehttp_parser::{
    HeadersHandler, HttpParser, ParseStatus, RequestLine, RequestLineHandler, SliceSequence,
};

#[derive(Default)]
struct Printer;

impl RequestLineHandler for Printer {
    fn on_request_line(&mut self, line: &RequestLine<'_>) {
        println!(
            "{} {} {}",
            line.method(),
            String::from_utf8_lossy(line.target()),
            line.version().as_str().unwrap_or("?"),
        );
    }
}

impl HeadersHandler for Printer {
    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        println!(
            "  {}: {}",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(value)
        );
    }
}

fn main() {
    // Two reads landed in two pooled segments, splitting the first
    // request's header block down the middle.
    let first: &[u8] = b"GET /items?page=2 HTTP/1.1\r\nHost: exam";
    let second: &[u8] = b"ple.com\r\nAccept: */*\r\n\r\nDELETE /items/7 HTTP/1.1\r\n\r\n";
    let mut segments = vec![first, second];

    let mut parser = HttpParser::new();
    let mut printer = Printer;

    loop {
        let sequence = SliceSequence::new(&segments);
        let Ok(ParseStatus::Complete { bytes, .. }) = parser.parse_request_line(&mut printer, &sequence)
        else {
            break;
        };
        let rest = drop_front(&segments, bytes);

        let sequence = SliceSequence::new(&rest);
        let Ok(ParseStatus::Complete { bytes, .. }) = parser.parse_headers(&mut printer, &sequence)
        else {
            break;
        };
        segments = drop_front(&rest, bytes);
        parser.reset();

        if segments.iter().all(|segment| segment.is_empty()) {
            break;
        }
    }
}

/// What a buffer pool does when the parser reports consumed bytes.
fn drop_front<'a>(segments: &[&'a [u8]], mut consumed: usize) -> Vec<&'a [u8]> {
    let mut out = Vec::new();
    for &segment in segments {
        if consumed >= segment.len() {
            consumed -= segment.len();
            continue;
        }
        out.push(&segment[consumed..]);
        consumed = 0;
    }
    out
}
