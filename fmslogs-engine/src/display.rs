//! Display pipeline: resolve the initial window, format and print it, then
//! optionally hand off to follow threads using the same filter and formatter.

use crate::columns::{format_line, truncate_to_width};
use crate::error::{EngineError, Result};
use crate::filter::LineFilter;
use crate::follow::{DEFAULT_POLL_INTERVAL, FollowEngine};
use crate::layout::LogLayout;
use crate::window::{Window, WindowRequest, resolve_window, trimmed};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{
    Arc, mpsc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

/// default cap on bytes printed for one log's initial window before the
/// output is cut off with [`TRUNCATION_MARKER`]
pub const MAX_READ_LEN: u64 = 10 * 1024 * 1024;

/// appended when the read cap cuts a window short
pub const TRUNCATION_MARKER: &str = "+++";

/// presentation options threaded through the pipeline; no ambient state
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub succinct: bool,
    /// cap formatted lines at this visual width
    pub truncate_width: Option<usize>,
    /// most bytes emitted for one initial window before output is cut off
    /// with [`TRUNCATION_MARKER`]
    pub read_cap: u64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            succinct: false,
            truncate_width: None,
            read_cap: MAX_READ_LEN,
        }
    }
}

fn shape(raw: &str, layout: &LogLayout, opts: &DisplayOptions) -> String {
    let formatted = format_line(raw, layout, opts.succinct);
    match opts.truncate_width {
        Some(width) => truncate_to_width(&formatted, width),
        None => formatted,
    }
}

/// resolve and print one log's initial window
///
/// resolution is one streaming pass retaining line handles only; the text is
/// then re-read in a second pass that seeks straight to the first handle's
/// byte offset instead of rescanning from the start of the file
pub fn print_window<W: Write>(
    path: &Path,
    layout: &LogLayout,
    request: &WindowRequest,
    opts: &DisplayOptions,
    out: &mut W,
) -> Result<()> {
    let open = |p: &Path| {
        File::open(p).map_err(|e| EngineError::Unreadable {
            path: p.to_path_buf(),
            source: e,
        })
    };

    let window = resolve_window(BufReader::new(open(path)?), request)?;
    let refs = match window {
        Window::NoMatch => {
            log::debug!("{}: no line at or after the requested instant", path.display());
            return Ok(());
        }
        Window::Lines(refs) if refs.is_empty() => return Ok(()),
        Window::Lines(refs) => refs,
    };

    let mut file = open(path)?;
    file.seek(SeekFrom::Start(refs[0].offset))?;
    let mut reader = BufReader::new(file);
    let mut wanted = refs.iter().map(|r| r.number).peekable();
    let mut number = refs[0].number - 1;
    let mut emitted: u64 = 0;
    let mut buf: Vec<u8> = Vec::with_capacity(256);

    while wanted.peek().is_some() {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        number += 1;
        if wanted.peek() == Some(&number) {
            wanted.next();
            if emitted + read as u64 > opts.read_cap {
                writeln!(out, "{}", TRUNCATION_MARKER)?;
                break;
            }
            emitted += read as u64;
            writeln!(out, "{}", shape(&trimmed(&buf), layout, opts))?;
        }
    }
    Ok(())
}

/// one log to follow, with the layout its lines are shaped by
pub struct FollowTarget {
    pub path: PathBuf,
    pub layout: LogLayout,
}

/// running multi-log follow; lines arrive on the receiver already filtered
/// and formatted
pub struct FollowHandle {
    receiver: mpsc::Receiver<String>,
    stop: Arc<AtomicBool>,
    threads: Vec<thread::JoinHandle<()>>,
}

impl FollowHandle {
    pub fn receiver(&self) -> &mpsc::Receiver<String> {
        &self.receiver
    }

    /// stop every follower promptly and wait for the threads to exit
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.threads {
            if handle.join().is_err() {
                log::error!("follow thread panicked");
            }
        }
    }
}

/// start following every target, anchored at each file's current end
///
/// each engine instance owns its cursor and shares nothing mutable with the
/// others; the compiled filter is the only shared object and is immutable.
/// One stop signal cancels all instances.
pub fn start_follow(
    targets: Vec<FollowTarget>,
    filter: &LineFilter,
    opts: &DisplayOptions,
    poll_interval: Option<Duration>,
) -> FollowHandle {
    let interval = poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, receiver) = mpsc::channel();

    let threads = targets
        .into_iter()
        .map(|target| {
            let engine = FollowEngine::new(target.path);
            let layout = target.layout;
            let filter = filter.clone();
            let opts = opts.clone();
            let tx = tx.clone();
            engine.spawn(interval, stop.clone(), move |line| {
                if filter.matches(&line) {
                    tx.send(shape(&line, &layout, &opts)).ok();
                }
            })
        })
        .collect();

    FollowHandle {
        receiver,
        stop,
        threads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowMode;
    use std::fs;

    static EVENT_LAYOUT: LogLayout = LogLayout {
        header: Some("TIMESTAMP                      LEVEL        MESSAGE"),
        stops: &[31, 44],
        succinct_stops: &[31, 44],
        succinct_header: None,
        succinct_cuts: &[(23, 29)],
    };

    fn write_log(dir: &tempfile::TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("Event.log");
        fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    #[test]
    fn test_end_to_end_filtered_tail() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (1..=10)
            .map(|i| {
                let level = if i % 3 == 0 { "Error" } else { "Information" };
                format!("2025-10-15 09:00:0{}.000 -0700\t{}\tline {}", i % 10, level, i)
            })
            .collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let path = write_log(&dir, &refs);

        // filter matches lines 3, 6, 9; tail of 2 keeps 6 and 9
        let filter = LineFilter::compile("Error").unwrap();
        let request = WindowRequest::new(WindowMode::TailCount, 2, filter).unwrap();
        let mut out = Vec::new();
        print_window(&path, &EVENT_LAYOUT, &request, &DisplayOptions::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let printed: Vec<&str> = text.lines().collect();
        assert_eq!(printed.len(), 2);
        assert!(printed[0].contains("line 6"));
        assert!(printed[1].contains("line 9"));
        // columns expanded: level starts at its stop
        assert!(printed[0].contains("-0700  Error"));
    }

    #[test]
    fn test_succinct_output_drops_zone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(
            &dir,
            &["2025-10-15 09:00:01.000 -0700\tInformation\tserver started"],
        );
        let request =
            WindowRequest::new(WindowMode::TailCount, 5, LineFilter::match_all()).unwrap();
        let opts = DisplayOptions {
            succinct: true,
            ..DisplayOptions::default()
        };
        let mut out = Vec::new();
        print_window(&path, &EVENT_LAYOUT, &request, &opts, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("-0700"));
        assert!(text.contains("server started"));
    }

    #[test]
    fn test_truncate_width_caps_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, &["0123456789abcdef"]);
        let request =
            WindowRequest::new(WindowMode::TailCount, 1, LineFilter::match_all()).unwrap();
        let opts = DisplayOptions {
            truncate_width: Some(8),
            ..DisplayOptions::default()
        };
        let mut out = Vec::new();
        print_window(&path, &LogLayout::plain(), &request, &opts, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "01234567\n");
    }

    #[test]
    fn test_read_cap_cuts_output_with_marker() {
        let dir = tempfile::tempdir().unwrap();
        // ten lines of 11 bytes each, far more than the cap allows
        let lines: Vec<String> = (0..10).map(|i| format!("line-{:05}", i)).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let path = write_log(&dir, &refs);

        let request = WindowRequest::new(WindowMode::Head, 10, LineFilter::match_all()).unwrap();
        let opts = DisplayOptions {
            read_cap: 30,
            ..DisplayOptions::default()
        };
        let mut out = Vec::new();
        print_window(&path, &LogLayout::plain(), &request, &opts, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let printed: Vec<&str> = text.lines().collect();
        // 11 bytes per raw line: two fit under the cap, the third trips it
        assert_eq!(printed, vec!["line-00000", "line-00001", TRUNCATION_MARKER]);
        assert!(text.ends_with(&format!("{TRUNCATION_MARKER}\n")));
    }

    #[test]
    fn test_missing_file_is_unreadable_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.log");
        let request =
            WindowRequest::new(WindowMode::TailCount, 1, LineFilter::match_all()).unwrap();
        let err = print_window(
            &path,
            &LogLayout::plain(),
            &request,
            &DisplayOptions::default(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Unreadable { .. }));
    }

    #[test]
    fn test_no_match_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, &["2025-10-15 09:00:01.000 -0700\tInformation\tx"]);
        let bound = chrono::NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let request =
            WindowRequest::new(WindowMode::FromTimestamp(bound), 5, LineFilter::match_all())
                .unwrap();
        let mut out = Vec::new();
        print_window(&path, &EVENT_LAYOUT, &request, &DisplayOptions::default(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_follow_pipes_through_filter_and_formatter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, &["seed"]);

        let filter = LineFilter::compile("keep").unwrap();
        let handle = start_follow(
            vec![FollowTarget {
                path: path.clone(),
                layout: EVENT_LAYOUT,
            }],
            &filter,
            &DisplayOptions::default(),
            Some(Duration::from_millis(5)),
        );

        std::thread::sleep(Duration::from_millis(30));
        let mut f = fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"drop this line\nkeep\tthis one\n").unwrap();
        f.sync_all().unwrap();

        let line = handle
            .receiver()
            .recv_timeout(Duration::from_secs(2))
            .unwrap();
        // formatted through the same layout: tab expanded to the column stop
        assert_eq!(line, format!("keep{}this one", " ".repeat(27)));
        // the non-matching line never arrives
        assert!(
            handle
                .receiver()
                .recv_timeout(Duration::from_millis(100))
                .is_err()
        );
        handle.stop();
    }
}
