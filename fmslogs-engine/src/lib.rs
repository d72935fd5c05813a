//! # fmslogs-engine
//!
//! The log window resolution and streaming engine behind the `fmslogs`
//! command: given a huge append-only log file, find where to start printing
//! (head, tail count, or first line at/after an instant), run matching lines
//! through an optional content filter and a per-log column formatter, and
//! optionally keep following the file live across partial writes, truncation
//! and rotation.
//!
//! The pieces compose bottom-up:
//!
//! - [`timestamp`]: heuristic per-line timestamp detection across the known
//!   per-source encodings
//! - [`columns`]: tab-stop expansion and succinct-mode excision
//! - [`filter`]: compile-once content filter shared by every phase
//! - [`window`]: single-pass window resolution with O(limit) memory
//! - [`follow`]: poll-based live follow with rotation/truncation recovery
//! - [`display`]: the pipeline gluing the above together
//!
//! Log catalogs (which logs exist, where they live, their column layouts)
//! are a collaborator's concern; the engine only consumes a [`LogLayout`].

pub mod columns;
pub mod display;
pub mod error;
pub mod filter;
pub mod follow;
pub mod layout;
pub mod metadata;
pub mod timestamp;
pub mod window;

pub use columns::format_line;
pub use display::{DisplayOptions, FollowHandle, FollowTarget, print_window, start_follow};
pub use error::{EngineError, Result};
pub use filter::LineFilter;
pub use follow::{DEFAULT_POLL_INTERVAL, FollowEngine, FollowState, spawn_follow_thread};
pub use layout::LogLayout;
pub use timestamp::{LogInstant, TimestampFormat, parse_line_timestamp};
pub use window::{LineRef, Window, WindowMode, WindowRequest, resolve_window};
