//! Window resolution: which lines of a large file to display.
//!
//! Resolution is a single forward streaming pass. It never loads the file
//! into memory; tail modes retain at most `limit` line handles in a rolling
//! ring buffer, so memory is O(limit) regardless of file size. Timestamp
//! anchoring is a linear scan, not a binary search: these logs interleave
//! continuation lines without timestamps and give no monotonicity guarantee,
//! so the anchor is the first line *in file order* whose instant reaches the
//! bound.

use crate::error::{EngineError, Result};
use crate::filter::LineFilter;
use crate::timestamp::{LogInstant, parse_line_timestamp};
use ringbuf::{
    HeapRb,
    traits::{Consumer, RingBuffer},
};
use std::io::BufRead;

/// light handle to one matching line; the text itself is not retained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef {
    /// 1-based line number
    pub number: u64,
    /// byte offset of the start of the line
    pub offset: u64,
}

/// which end of the file, and how it is addressed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowMode {
    /// first `limit` qualifying lines
    Head,
    /// last `limit` qualifying lines
    TailCount,
    /// qualifying lines from the first line at/after the instant, last `limit` retained
    FromTimestamp(LogInstant),
}

/// one fully-specified display request, built once and threaded through every
/// call; there is no ambient mutable state
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub mode: WindowMode,
    pub limit: usize,
    pub filter: LineFilter,
}

impl WindowRequest {
    pub fn new(mode: WindowMode, limit: usize, filter: LineFilter) -> Result<Self> {
        if limit == 0 {
            return Err(EngineError::BadRequest);
        }
        Ok(Self { mode, limit, filter })
    }
}

/// outcome of resolution
#[derive(Debug, PartialEq, Eq)]
pub enum Window {
    /// qualifying lines, oldest first
    Lines(Vec<LineRef>),
    /// no line ever reached the timestamp bound
    NoMatch,
}

/// lossy-decode one raw line without its terminator
pub(crate) fn trimmed(buf: &[u8]) -> std::borrow::Cow<'_, str> {
    let mut end = buf.len();
    while end > 0 && (buf[end - 1] == b'\n' || buf[end - 1] == b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&buf[..end])
}

/// compute the ordered set of line numbers to output for one open file
pub fn resolve_window<R: BufRead>(mut reader: R, request: &WindowRequest) -> Result<Window> {
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    let mut number: u64 = 0;
    let mut offset: u64 = 0;

    match request.mode {
        WindowMode::Head => {
            let mut lines = Vec::with_capacity(request.limit);
            loop {
                buf.clear();
                let read = reader.read_until(b'\n', &mut buf)?;
                if read == 0 {
                    break;
                }
                number += 1;
                if request.filter.matches(&trimmed(&buf)) {
                    lines.push(LineRef { number, offset });
                    if lines.len() == request.limit {
                        break;
                    }
                }
                offset += read as u64;
            }
            Ok(Window::Lines(lines))
        }
        WindowMode::TailCount | WindowMode::FromTimestamp(_) => {
            let target = match request.mode {
                WindowMode::FromTimestamp(t) => Some(t),
                _ => None,
            };
            // anchored from line one unless a timestamp bound is in play
            let mut anchored = target.is_none();
            let mut tail: HeapRb<LineRef> = HeapRb::new(request.limit);

            loop {
                buf.clear();
                let read = reader.read_until(b'\n', &mut buf)?;
                if read == 0 {
                    break;
                }
                number += 1;
                let line = trimmed(&buf);
                if !anchored
                    && let Some(bound) = target
                    && let Some(instant) = parse_line_timestamp(&line)
                    && instant >= bound
                {
                    // ties included: the anchor line itself is eligible
                    anchored = true;
                }
                if anchored && request.filter.matches(&line) {
                    tail.push_overwrite(LineRef { number, offset });
                }
                offset += read as u64;
            }

            if !anchored {
                return Ok(Window::NoMatch);
            }
            Ok(Window::Lines(tail.pop_iter().collect()))
        }
    }
}
