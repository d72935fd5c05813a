//! Live-follow engine: streams newly appended lines forever.
//!
//! Three states. `SeekingEnd` positions the cursor at current end-of-file
//! without emitting anything. `Streaming` reads appended deltas, splits on
//! newline and carries the trailing unterminated fragment across polls.
//! `Recovering` handles the path no longer resolving to the same file:
//! rotation and deletion restart from offset 0 of whatever reappears, a
//! momentary permission blip resumes from the last offset. Polling is
//! non-blocking with a bounded sleep between polls; some file systems do not
//! reliably wake a blocked reader on append, so there is no blocking read
//! anywhere. Lines appended inside the close/open gap of a rotation can be
//! lost; that is a documented limitation of path-based following.

use crate::metadata::{self, MetaSnap};
use memmap2::MmapOptions;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

/// default pacing between polls; bounds CPU use while keeping output latency
/// well under a second
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    SeekingEnd,
    Streaming,
    Recovering,
}

/// mutable read position, owned exclusively by one engine instance
#[derive(Debug)]
struct FollowCursor {
    offset: u64,
    /// trailing bytes of the last unterminated line
    fragment: Vec<u8>,
    /// file identity at open time
    snap: MetaSnap,
}

/// follows one log file; `poll` is non-blocking and returns complete lines
/// appended since the previous call
pub struct FollowEngine {
    path: PathBuf,
    state: FollowState,
    cursor: Option<FollowCursor>,
}

impl FollowEngine {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: FollowState::SeekingEnd,
            cursor: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    /// non-blocking poll; never errors, transient failures move the engine
    /// into `Recovering` and are retried on the next poll
    pub fn poll(&mut self) -> Vec<String> {
        match self.state {
            FollowState::SeekingEnd => self.poll_seeking_end(),
            FollowState::Streaming => self.poll_streaming(),
            FollowState::Recovering => self.poll_recovering(),
        }
    }

    fn poll_seeking_end(&mut self) -> Vec<String> {
        match metadata::stat_path(&self.path) {
            Ok(snap) => {
                log::debug!(
                    "follow: {} anchored at end of file ({} bytes)",
                    self.path.display(),
                    snap.len
                );
                self.cursor = Some(FollowCursor {
                    offset: snap.len,
                    fragment: Vec::new(),
                    snap,
                });
                self.state = FollowState::Streaming;
            }
            Err(e) => {
                log::warn!("follow: {} not readable yet: {}", self.path.display(), e);
                self.state = FollowState::Recovering;
            }
        }
        Vec::new()
    }

    fn poll_streaming(&mut self) -> Vec<String> {
        let cur = match metadata::stat_path(&self.path) {
            Ok(snap) => snap,
            Err(e) => {
                log::warn!("follow: {} went away: {}", self.path.display(), e);
                self.state = FollowState::Recovering;
                return Vec::new();
            }
        };
        let Some(cursor) = self.cursor.as_mut() else {
            self.state = FollowState::SeekingEnd;
            return Vec::new();
        };

        if !metadata::has_changed(&Some(cursor.snap), &cur) {
            return Vec::new();
        }

        if cur.id != cursor.snap.id {
            // rotated: the path now names a different file
            log::debug!(
                "follow: {} replaced, restarting from offset 0",
                self.path.display()
            );
            cursor.offset = 0;
            cursor.fragment.clear();
        } else if cur.len < cursor.offset {
            log::debug!(
                "follow: {} truncated ({} -> {} bytes)",
                self.path.display(),
                cursor.offset,
                cur.len
            );
            cursor.offset = 0;
            cursor.fragment.clear();
        }

        if cur.len == cursor.offset {
            cursor.snap = cur;
            return Vec::new();
        }

        match read_delta(&self.path, cursor.offset, cur.len) {
            Ok(delta) => {
                cursor.offset = cur.len;
                cursor.snap = cur;
                drain_complete_lines(&mut cursor.fragment, &delta)
            }
            Err(e) => {
                log::warn!("follow: error reading {}: {}", self.path.display(), e);
                self.state = FollowState::Recovering;
                Vec::new()
            }
        }
    }

    fn poll_recovering(&mut self) -> Vec<String> {
        let cur = match metadata::stat_path(&self.path) {
            // still gone; retry on the next poll
            Err(_) => return Vec::new(),
            Ok(snap) => snap,
        };

        match self.cursor.as_mut() {
            Some(cursor) if cursor.snap.id == cur.id => {
                // the same file became readable again; continue from the last offset
                log::debug!("follow: {} readable again", self.path.display());
            }
            _ => {
                log::debug!(
                    "follow: {} reopened as a new file, starting from offset 0",
                    self.path.display()
                );
                self.cursor = Some(FollowCursor {
                    offset: 0,
                    fragment: Vec::new(),
                    snap: cur,
                });
            }
        }
        self.state = FollowState::Streaming;
        self.poll_streaming()
    }

    /// run the poll loop on a dedicated thread until the stop signal is set
    ///
    /// the signal is checked at every loop top, so cancellation also breaks
    /// out of `Recovering` promptly
    pub fn spawn(
        mut self,
        poll_interval: Duration,
        stop: Arc<AtomicBool>,
        mut on_line: impl FnMut(String) + Send + 'static,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            log::debug!("follow thread started for {}", self.path.display());
            while !stop.load(Ordering::Relaxed) {
                for line in self.poll() {
                    on_line(line);
                }
                thread::sleep(poll_interval);
            }
            log::debug!("follow thread stopped for {}", self.path.display());
        })
    }
}

/// spawn a follower with its own stop signal
pub fn spawn_follow_thread(
    engine: FollowEngine,
    poll_interval: Duration,
    on_line: impl FnMut(String) + Send + 'static,
) -> (thread::JoinHandle<()>, Arc<AtomicBool>) {
    let stop = Arc::new(AtomicBool::new(false));
    let handle = engine.spawn(poll_interval, stop.clone(), on_line);
    (handle, stop)
}

/// read the appended byte range via mmap, as a one-shot snapshot
fn read_delta(path: &Path, prev_len: u64, cur_len: u64) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    // the file can shrink between the caller's stat and this open; mapping
    // past the live end would fault on access, so clamp to the open file
    let map_len = cur_len.min(file.metadata()?.len());
    if map_len == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { MmapOptions::new().len(map_len as usize).map(&file)? };
    let start = (prev_len as usize).min(mmap.len());
    Ok(mmap[start..].to_vec())
}

/// append the delta to the carried fragment and split off every complete
/// line; whatever follows the last newline stays buffered for the next poll
fn drain_complete_lines(fragment: &mut Vec<u8>, delta: &[u8]) -> Vec<String> {
    fragment.extend_from_slice(delta);
    let Some(last_newline) = fragment.iter().rposition(|&b| b == b'\n') else {
        return Vec::new();
    };
    let rest = fragment.split_off(last_newline + 1);
    let complete = std::mem::replace(fragment, rest);

    complete[..complete.len() - 1]
        .split(|&b| b == b'\n')
        .map(|line| {
            let line = match line.last() {
                Some(b'\r') => &line[..line.len() - 1],
                _ => line,
            };
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn append(path: &Path, data: &[u8]) {
        let mut f = fs::OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(data).unwrap();
        f.sync_all().unwrap();
    }

    #[test]
    fn test_drain_keeps_trailing_fragment() {
        let mut fragment = Vec::new();
        assert_eq!(drain_complete_lines(&mut fragment, b"a\nb"), vec!["a"]);
        assert_eq!(fragment, b"b");
        assert_eq!(drain_complete_lines(&mut fragment, b"c\n"), vec!["bc"]);
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_drain_no_newline_emits_nothing() {
        let mut fragment = Vec::new();
        assert!(drain_complete_lines(&mut fragment, b"partial").is_empty());
        assert_eq!(fragment, b"partial");
    }

    #[test]
    fn test_drain_strips_crlf() {
        let mut fragment = Vec::new();
        assert_eq!(
            drain_complete_lines(&mut fragment, b"a\r\nb\r\n"),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_read_delta_clamps_to_live_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "short\n").unwrap();

        // a stale stat may claim more bytes than the file now holds
        let delta = read_delta(&path, 0, 4096).unwrap();
        assert_eq!(delta, b"short\n");
        assert!(read_delta(&path, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_seek_end_emits_nothing_for_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "old1\nold2\n").unwrap();

        let mut engine = FollowEngine::new(path.clone());
        assert!(engine.poll().is_empty());
        assert_eq!(engine.state(), FollowState::Streaming);
        assert!(engine.poll().is_empty());
    }

    #[test]
    fn test_partial_line_buffering_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "").unwrap();

        let mut engine = FollowEngine::new(path.clone());
        engine.poll(); // seek end

        append(&path, b"a\nb");
        assert_eq!(engine.poll(), vec!["a"]);
        append(&path, b"c\n");
        assert_eq!(engine.poll(), vec!["bc"]);
    }

    #[test]
    fn test_truncation_resets_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();

        let mut engine = FollowEngine::new(path.clone());
        engine.poll();

        // same file truncated and rewritten shorter
        fs::write(&path, "fresh\n").unwrap();
        assert_eq!(engine.poll(), vec!["fresh"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_rotation_restarts_from_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "a much longer original file content\n").unwrap();

        let mut engine = FollowEngine::new(path.clone());
        engine.poll();

        // replace with a new, shorter file at the same path
        let staged = dir.path().join("staged.log");
        fs::write(&staged, "rotated\n").unwrap();
        fs::rename(&staged, &path).unwrap();

        assert_eq!(engine.poll(), vec!["rotated"]);
        assert_eq!(engine.state(), FollowState::Streaming);
    }

    #[test]
    fn test_deleted_file_recovers_when_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "first\n").unwrap();

        let mut engine = FollowEngine::new(path.clone());
        engine.poll();

        fs::remove_file(&path).unwrap();
        assert!(engine.poll().is_empty());
        assert_eq!(engine.state(), FollowState::Recovering);
        // still gone: stays in recovering without output
        assert!(engine.poll().is_empty());

        fs::write(&path, "back\n").unwrap();
        assert_eq!(engine.poll(), vec!["back"]);
        assert_eq!(engine.state(), FollowState::Streaming);
    }

    #[test]
    fn test_stop_signal_ends_thread_promptly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "").unwrap();

        let engine = FollowEngine::new(path);
        let (handle, stop) = spawn_follow_thread(engine, Duration::from_millis(5), |_line| {});
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn test_followed_lines_arrive_through_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "").unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let engine = FollowEngine::new(path.clone());
        let (handle, stop) = spawn_follow_thread(engine, Duration::from_millis(5), move |line| {
            tx.send(line).ok();
        });

        // give the thread a moment to anchor, then append
        thread::sleep(Duration::from_millis(30));
        append(&path, b"hello\n");

        let line = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(line, "hello");

        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();
    }
}
