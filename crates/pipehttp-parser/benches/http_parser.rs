use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use pipehttp_parser::{
    HeadersHandler, HttpParser, RequestLine, RequestLineHandler, SliceSequence,
};

// ============================================================================
// Test data
// ============================================================================

fn simple_get() -> Vec<u8> {
    b"GET / HTTP/1.1\r\n".to_vec()
}

fn get_with_path_and_query() -> Vec<u8> {
    b"GET /api/v1/items/42?format=json&fields=id,name,price HTTP/1.1\r\n".to_vec()
}

fn header_block(count: usize) -> Vec<u8> {
    let mut block = String::from("Host: api.example.com\r\nAccept: application/json\r\n");
    for i in 0..count {
        use std::fmt::Write;
        write!(block, "X-Custom-Header-{i}: value-{i}\r\n").unwrap();
    }
    block.push_str("\r\n");
    block.into_bytes()
}

/// Split `input` into segments of at most `size` bytes.
fn segment_every(input: &[u8], size: usize) -> Vec<&[u8]> {
    input.chunks(size).collect()
}

#[derive(Default)]
struct Sink {
    lines: usize,
    headers: usize,
}

impl RequestLineHandler for Sink {
    fn on_request_line(&mut self, line: &RequestLine<'_>) {
        self.lines += line.path().len();
    }
}

impl HeadersHandler for Sink {
    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        self.headers += name.len() + value.len();
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_request_line(c: &mut Criterion) {
    for (label, input) in [
        ("simple", simple_get()),
        ("path_and_query", get_with_path_and_query()),
    ] {
        let mut group = c.benchmark_group(format!("request_line/{label}"));
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_function("contiguous", |b| {
            let mut parser = HttpParser::new();
            let mut sink = Sink::default();
            b.iter(|| {
                parser
                    .parse_request_line(&mut sink, black_box(input.as_slice()))
                    .unwrap()
            });
        });

        for segment_size in [4, 16] {
            group.bench_with_input(
                BenchmarkId::new("segmented", segment_size),
                &segment_size,
                |b, &segment_size| {
                    let segments = segment_every(&input, segment_size);
                    let sequence = SliceSequence::new(&segments);
                    let mut parser = HttpParser::new();
                    let mut sink = Sink::default();
                    b.iter(|| {
                        parser
                            .parse_request_line(&mut sink, black_box(&sequence))
                            .unwrap()
                    });
                },
            );
        }
        group.finish();
    }
}

fn bench_headers(c: &mut Criterion) {
    for count in [0usize, 8, 32] {
        let input = header_block(count);
        let mut group = c.benchmark_group(format!("headers/{count}_extra"));
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_function("contiguous", |b| {
            let mut parser = HttpParser::new();
            let mut sink = Sink::default();
            b.iter(|| {
                parser
                    .parse_headers(&mut sink, black_box(input.as_slice()))
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("segmented", 64), &input, |b, input| {
            let segments = segment_every(input, 64);
            let sequence = SliceSequence::new(&segments);
            let mut parser = HttpParser::new();
            let mut sink = Sink::default();
            b.iter(|| {
                parser
                    .parse_headers(&mut sink, black_box(&sequence))
                    .unwrap()
            });
        });
        group.finish();
    }
}

criterion_group!(benches, bench_request_line, bench_headers);
criterion_main!(benches);
