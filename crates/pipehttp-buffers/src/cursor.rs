//! A cursor over a [`SegmentedSequence`].
//!
//! [`BufferCursor`] is the read head the parsers drive: single-byte
//! peek/take, bulk skip, delimiter search, and straddling reads of
//! fixed-width and text-encoded primitives, all transparently crossing
//! segment boundaries. The cursor is `Copy`; saving a copy is a rewind
//! point, so lookahead is "copy, probe, maybe commit".

use crate::sequence::{Position, SegmentedSequence};
use crate::text;

use memchr::memmem;

/// Longest needle [`BufferCursor::find_bytes`] accepts.
///
/// Bounds the stitch scratch used for cross-segment matches to a fixed
/// stack array. HTTP parsing needs at most 4 (`\r\n\r\n`).
pub const MAX_NEEDLE_LEN: usize = 16;

/// Stitch window for cross-segment needle matches: the last
/// `needle.len() - 1` bytes of a segment joined to the next
/// `needle.len() - 1` bytes of the data after it.
const STITCH_SCRATCH: usize = 2 * (MAX_NEEDLE_LEN - 1);

// Scratch sizes for straddling text reads. Sized past the longest valid
// encoding so a terminating non-value byte lands inside the window.
const BOOL_SCRATCH: usize = 15;
const U32_SCRATCH: usize = 15;
const U64_SCRATCH: usize = 30;

/// A consuming read head over a [`SegmentedSequence`].
///
/// The cursor borrows the sequence and never owns bytes. While not at the
/// end, the consumed offset is strictly inside the current segment view:
/// exhausting a segment eagerly advances to the next non-empty one, so
/// empty segments are never observable.
pub struct BufferCursor<'a, S: SegmentedSequence + ?Sized> {
    sequence: &'a S,
    /// Byte view the cursor is currently reading.
    current: &'a [u8],
    /// Bytes of `current` already consumed.
    offset: usize,
    /// Position of `current[0]` in the sequence.
    current_start: Position,
    /// Position of the first not-yet-fetched segment.
    next: Position,
    /// Total bytes consumed since construction.
    consumed: usize,
    end: bool,
}

impl<S: SegmentedSequence + ?Sized> Clone for BufferCursor<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: SegmentedSequence + ?Sized> Copy for BufferCursor<'_, S> {}

impl<S: SegmentedSequence + ?Sized> std::fmt::Debug for BufferCursor<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferCursor")
            .field("position", &self.position())
            .field("consumed", &self.consumed)
            .field("end", &self.end)
            .finish()
    }
}

impl<'a, S: SegmentedSequence + ?Sized> BufferCursor<'a, S> {
    /// Create a cursor at the start of `sequence`.
    pub fn new(sequence: &'a S) -> Self {
        let start = sequence.start();
        let mut cursor = Self {
            sequence,
            current: &[],
            offset: 0,
            current_start: start,
            next: start,
            consumed: 0,
            end: false,
        };
        cursor.advance_segment();
        cursor
    }

    /// Fetch segments until one with unread bytes is found.
    fn advance_segment(&mut self) -> bool {
        loop {
            let start = self.next;
            match self.sequence.try_get(&mut self.next) {
                Some(segment) => {
                    self.current_start = start;
                    self.current = segment;
                    self.offset = 0;
                    if !segment.is_empty() {
                        return true;
                    }
                }
                None => {
                    self.end = true;
                    return false;
                }
            }
        }
    }

    /// Next unconsumed byte without advancing; `None` iff exhausted.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        if self.end {
            None
        } else {
            Some(self.current[self.offset])
        }
    }

    /// Return and consume the next byte; `None` iff exhausted.
    pub fn take(&mut self) -> Option<u8> {
        if self.end {
            return None;
        }
        let byte = self.current[self.offset];
        self.offset += 1;
        self.consumed += 1;
        if self.offset == self.current.len() {
            self.advance_segment();
        }
        Some(byte)
    }

    /// The contiguous unread tail of the current segment.
    ///
    /// Empty iff the cursor is exhausted; never empty otherwise.
    #[must_use]
    pub fn unread(&self) -> &'a [u8] {
        &self.current[self.offset..]
    }

    /// True when no unread bytes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end
    }

    /// Total bytes consumed since the cursor was created.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Position of the next unconsumed byte (or past-the-end).
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(
            self.current_start.segment(),
            self.current_start.offset() + self.offset,
        )
    }

    /// Count of unread bytes across all remaining segments.
    ///
    /// Walks the remaining segments; intended for occasional limit
    /// checks, not per-byte use.
    #[must_use]
    pub fn remaining(&self) -> usize {
        let mut total = self.unread().len();
        let mut pos = self.next;
        while let Some(segment) = self.sequence.try_get(&mut pos) {
            total += segment.len();
        }
        total
    }

    /// Position one past the last byte of the sequence.
    #[must_use]
    pub fn end_position(&self) -> Position {
        let mut probe = *self;
        let rest = probe.remaining();
        probe.skip(rest);
        probe.position()
    }

    /// Advance exactly `count` bytes, across as many segments as needed.
    ///
    /// # Panics
    ///
    /// Panics when fewer than `count` bytes remain. That is a caller
    /// contract violation (a transport bug), not a malformed-input
    /// condition.
    pub fn skip(&mut self, count: usize) {
        let mut count = count;
        while count > 0 {
            assert!(!self.end, "skip past the end of the sequence");
            let remaining = self.current.len() - self.offset;
            if count < remaining {
                self.offset += count;
                self.consumed += count;
                return;
            }
            self.offset = self.current.len();
            self.consumed += remaining;
            count -= remaining;
            self.advance_segment();
        }
    }

    /// Reposition the cursor to a previously observed position at or
    /// ahead of the current one, typically one returned by
    /// [`find_byte`](Self::find_byte).
    ///
    /// Rewinding is expressed by saving a copy of the cursor instead.
    ///
    /// # Panics
    ///
    /// Panics when `target` is behind the cursor or not reachable in the
    /// sequence (caller contract violation).
    pub fn skip_to(&mut self, target: Position) {
        loop {
            if target.segment() == self.current_start.segment() {
                let rel = target
                    .offset()
                    .checked_sub(self.current_start.offset())
                    .expect("skip_to target is behind the cursor");
                assert!(rel >= self.offset, "skip_to target is behind the cursor");
                assert!(
                    rel <= self.current.len(),
                    "skip_to target is outside its segment"
                );
                self.consumed += rel - self.offset;
                self.offset = rel;
                if !self.end && self.offset == self.current.len() {
                    self.advance_segment();
                }
                return;
            }
            assert!(
                target.segment() > self.current_start.segment(),
                "skip_to target is behind the cursor"
            );
            assert!(!self.end, "skip_to target past the end of the sequence");
            let remaining = self.current.len() - self.offset;
            self.consumed += remaining;
            self.offset = self.current.len();
            self.advance_segment();
        }
    }

    /// Find the first occurrence of `byte` at or after the cursor.
    ///
    /// On success returns the position of the match and leaves the cursor
    /// one byte past it; on failure the cursor is unchanged. The current
    /// segment is scanned first; only on a miss are the following
    /// segments walked.
    pub fn find_byte(&mut self, byte: u8) -> Option<Position> {
        let index = self.scan_byte(byte)?;
        let mut probe = *self;
        probe.skip(index);
        let found = probe.position();
        probe.skip(1);
        *self = probe;
        Some(found)
    }

    /// Find the first occurrence of a multi-byte `needle`.
    ///
    /// Same contract as [`find_byte`](Self::find_byte): on success the
    /// cursor lands one byte past the end of the match. Matches that
    /// straddle a segment boundary are detected through a fixed stitch
    /// scratch, never a heap allocation.
    ///
    /// # Panics
    ///
    /// Panics when `needle` is empty or longer than [`MAX_NEEDLE_LEN`].
    pub fn find_bytes(&mut self, needle: &[u8]) -> Option<Position> {
        assert!(
            !needle.is_empty() && needle.len() <= MAX_NEEDLE_LEN,
            "needle length out of range"
        );
        if needle.len() == 1 {
            return self.find_byte(needle[0]);
        }
        let index = self.scan_bytes(needle)?;
        let mut probe = *self;
        probe.skip(index);
        let found = probe.position();
        probe.skip(needle.len());
        *self = probe;
        Some(found)
    }

    /// Offset of `byte` relative to the cursor, without moving it.
    fn scan_byte(&self, byte: u8) -> Option<usize> {
        let mut probe = *self;
        let mut base = 0usize;
        loop {
            if let Some(index) = memchr::memchr(byte, probe.unread()) {
                return Some(base + index);
            }
            base += probe.unread().len();
            if !probe.advance_segment() {
                return None;
            }
        }
    }

    /// Offset of `needle` relative to the cursor, without moving it.
    fn scan_bytes(&self, needle: &[u8]) -> Option<usize> {
        let keep = needle.len() - 1;
        let mut probe = *self;
        let mut base = 0usize;
        loop {
            let unread = probe.unread();
            if let Some(index) = memmem::find(unread, needle) {
                return Some(base + index);
            }
            // A match can straddle into the following segments. Stitch the
            // segment tail to the head of the rest; any hit in the window
            // necessarily begins inside the tail, so ordering is preserved.
            let tail_start = unread.len().saturating_sub(keep);
            let tail = &unread[tail_start..];
            base += unread.len();
            if !probe.advance_segment() {
                return None;
            }
            if memchr::memchr(needle[0], tail).is_some() {
                let mut scratch = [0u8; STITCH_SCRATCH];
                scratch[..tail.len()].copy_from_slice(tail);
                let copied = probe.peek_copy(&mut scratch[tail.len()..tail.len() + keep]);
                let window = &scratch[..tail.len() + copied];
                if let Some(index) = memmem::find(window, needle) {
                    return Some(base - tail.len() + index);
                }
            }
        }
    }

    /// Copy up to `out.len()` unread bytes into `out` without consuming,
    /// crossing segment boundaries as needed. Returns the copied count,
    /// short only when the sequence is exhausted first.
    pub fn peek_copy(&self, out: &mut [u8]) -> usize {
        let unread = self.unread();
        if unread.len() >= out.len() {
            out.copy_from_slice(&unread[..out.len()]);
            return out.len();
        }
        out[..unread.len()].copy_from_slice(unread);
        let mut copied = unread.len();
        let mut pos = self.next;
        while copied < out.len() {
            let Some(segment) = self.sequence.try_get(&mut pos) else {
                break;
            };
            let take = segment.len().min(out.len() - copied);
            out[copied..copied + take].copy_from_slice(&segment[..take]);
            copied += take;
        }
        copied
    }

    /// Read a little-endian `u32`, straddling segments if needed.
    ///
    /// `None` when fewer than four bytes remain; the cursor is unchanged
    /// in that case.
    pub fn try_read_u32_le(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a big-endian `u32`, straddling segments if needed.
    pub fn try_read_u32_be(&mut self) -> Option<u32> {
        Some(u32::from_be_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut raw = [0u8; N];
        let unread = self.unread();
        if unread.len() >= N {
            raw.copy_from_slice(&unread[..N]);
        } else if self.peek_copy(&mut raw) < N {
            return None;
        }
        self.skip(N);
        Some(raw)
    }

    /// Parse a text-encoded `true`/`false`, straddling segments if needed.
    pub fn try_parse_bool(&mut self) -> Option<bool> {
        self.try_parse_text::<bool, BOOL_SCRATCH>(text::parse_bool)
    }

    /// Parse a decimal `u32`, straddling segments if needed.
    pub fn try_parse_u32(&mut self) -> Option<u32> {
        self.try_parse_text::<u32, U32_SCRATCH>(text::parse_u32)
    }

    /// Parse a decimal `u64`, straddling segments if needed.
    pub fn try_parse_u64(&mut self) -> Option<u64> {
        self.try_parse_text::<u64, U64_SCRATCH>(text::parse_u64)
    }

    /// Fast contiguous parse, falling back to a bounded scratch copy that
    /// spans segments. Both paths delegate to the same span parser.
    ///
    /// The fast result only commits when the value ended before the end
    /// of the contiguous view (the encoding could otherwise continue in
    /// the next segment); the scratch result only commits when the value
    /// ended inside the window or the sequence is exhausted.
    fn try_parse_text<T, const N: usize>(
        &mut self,
        parse: fn(&[u8]) -> Option<(T, usize)>,
    ) -> Option<T> {
        let unread = self.unread();
        if let Some((value, used)) = parse(unread) {
            if used < unread.len() {
                self.skip(used);
                return Some(value);
            }
        }
        let mut scratch = [0u8; N];
        let copied = self.peek_copy(&mut scratch);
        let (value, used) = parse(&scratch[..copied])?;
        if used == copied && copied == N {
            return None;
        }
        self.skip(used);
        Some(value)
    }
}
