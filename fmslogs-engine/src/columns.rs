//! Tab-stop column expansion and succinct-mode excision.

use crate::layout::LogLayout;
use unicode_width::UnicodeWidthStr;

/// separator used once the stop list is exhausted but tabs remain
const OVERFLOW_SEP: &str = "  ";

/// expand tab-delimited fields so the text after each tab starts at or after
/// its column stop, padding with at least one space when the natural column
/// overshoots the stop
///
/// idempotent on an already-expanded line (no tabs means the input comes back
/// unchanged) and only ever inserts whitespace
pub fn expand_tabs(line: &str, stops: &[usize]) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 16);
    let mut col = 0usize;
    let mut next_stop = stops.iter().copied();

    for (index, field) in line.split('\t').enumerate() {
        if index > 0 {
            match next_stop.next() {
                Some(stop) => {
                    let pad = if stop > col { stop - col } else { 1 };
                    for _ in 0..pad {
                        out.push(' ');
                    }
                    col += pad;
                }
                None => {
                    out.push_str(OVERFLOW_SEP);
                    col += OVERFLOW_SEP.len();
                }
            }
        }
        out.push_str(field);
        col += UnicodeWidthStr::width(field);
    }

    out
}

/// remove `(keep_end, resume_at)` ranges from an expanded line, right to left
/// so earlier cuts don't shift later positions
///
/// a range that runs past the end of a short line, or lands off a char
/// boundary, is a no-op on that line
pub fn excise(line: &str, cuts: &[(usize, usize)]) -> String {
    let mut out = line.to_string();
    for &(keep_end, resume_at) in cuts.iter().rev() {
        if resume_at <= keep_end || out.len() < resume_at {
            continue;
        }
        if out.is_char_boundary(keep_end) && out.is_char_boundary(resume_at) {
            out.replace_range(keep_end..resume_at, "");
        }
    }
    out
}

/// format one raw line for display under the given layout
///
/// full mode expands against the layout's stop list; succinct mode expands
/// against the shorter succinct stops and then excises the layout's
/// known low-value ranges. A layout with no stops leaves the line untouched.
pub fn format_line(raw: &str, layout: &LogLayout, succinct: bool) -> String {
    if !succinct {
        return expand_tabs(raw, layout.stops);
    }
    let stops = if layout.succinct_stops.is_empty() {
        layout.stops
    } else {
        layout.succinct_stops
    };
    let expanded = expand_tabs(raw, stops);
    excise(&expanded, layout.succinct_cuts)
}

/// cap a formatted line at a visual width, for `--truncate`
pub fn truncate_to_width(line: &str, max_cols: usize) -> String {
    if UnicodeWidthStr::width(line) <= max_cols {
        return line.to_string();
    }
    let mut out = String::with_capacity(max_cols);
    let mut col = 0usize;
    for ch in line.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if col + w > max_cols {
            break;
        }
        out.push(ch);
        col += w;
    }
    out
}
