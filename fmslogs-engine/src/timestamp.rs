//! Heuristic per-line timestamp detection.
//!
//! FileMaker Server writes a different timestamp encoding per log family.
//! Each known encoding gets a cheap positional sniff on the raw bytes and a
//! chrono parse over a fixed slice of the line. Sniffs are tried in a fixed
//! priority order and the first hit wins; a sniff hit whose parse then fails
//! still counts as "no timestamp", never an error. Continuation lines, stack
//! traces and binary garbage all come back as `None`.

use chrono::{DateTime, NaiveDateTime};

/// comparable instant extracted from a log line
///
/// offset-bearing encodings are normalized to their own local wall-clock so
/// that mixed encodings in one file compare the way they render
pub type LogInstant = NaiveDateTime;

/// one known per-line timestamp encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `2025-10-15 12:34:56.789 -0700` (Event.log, Access.log)
    IsoOffset,
    /// `2025/10/15 12:34:56.789` (Stats.log, TopCallStats.log)
    SlashFractional,
    /// `Oct 15, 2025 02:05:07 PM` (ClientStats.log)
    MonthNameAmPm,
    /// `[Wed Oct 15 12:34:56 2025] ...` (web publishing startup banner)
    BracketedBanner,
}

/// sniff order; sniffs are not mutually exclusive by construction, so the
/// first match wins
pub const FORMATS: &[TimestampFormat] = &[
    TimestampFormat::IsoOffset,
    TimestampFormat::SlashFractional,
    TimestampFormat::MonthNameAmPm,
    TimestampFormat::BracketedBanner,
];

impl TimestampFormat {
    /// cheap positional check deciding whether this encoding should be tried
    pub fn sniff(&self, bytes: &[u8]) -> bool {
        match self {
            Self::IsoOffset => bytes.get(4) == Some(&b'-') && bytes.get(7) == Some(&b'-'),
            Self::SlashFractional => bytes.get(4) == Some(&b'/') && bytes.get(7) == Some(&b'/'),
            Self::MonthNameAmPm => {
                bytes.first().is_some_and(|b| b.is_ascii_alphabetic())
                    && bytes.get(3) == Some(&b' ')
                    && bytes.get(6) == Some(&b',')
            }
            Self::BracketedBanner => {
                bytes.first() == Some(&b'[') && bytes.get(4) == Some(&b' ')
            }
        }
    }

    /// parse the encoding's fixed slice of the line; `None` when the line is
    /// too short, not valid UTF-8 at the boundary, or fails the format
    pub fn parse(&self, line: &str) -> Option<LogInstant> {
        match self {
            Self::IsoOffset => DateTime::parse_from_str(line.get(0..29)?, "%Y-%m-%d %H:%M:%S%.3f %z")
                .ok()
                .map(|dt| dt.naive_local()),
            Self::SlashFractional => {
                NaiveDateTime::parse_from_str(line.get(0..23)?, "%Y/%m/%d %H:%M:%S%.3f").ok()
            }
            Self::MonthNameAmPm => {
                NaiveDateTime::parse_from_str(line.get(0..24)?, "%b %d, %Y %I:%M:%S %p").ok()
            }
            Self::BracketedBanner => {
                NaiveDateTime::parse_from_str(line.get(1..25)?, "%a %b %d %H:%M:%S %Y").ok()
            }
        }
    }
}

/// try the known encodings in priority order against one raw line
pub fn parse_line_timestamp(line: &str) -> Option<LogInstant> {
    let bytes = line.as_bytes();
    FORMATS
        .iter()
        .find(|format| format.sniff(bytes))
        .and_then(|format| format.parse(line))
}
