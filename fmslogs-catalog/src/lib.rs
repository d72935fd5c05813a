//! # fmslogs-catalog
//!
//! Maps log identifiers to their on-disk paths and column layouts for one
//! FileMaker Server deployment. The engine stays agnostic of where logs
//! live; resolving an identifier to an absolute path and a [`LogLayout`]
//! happens here.

mod tables;

use chrono::{DateTime, Local};
use fmslogs_engine::{EngineError, LogLayout};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub use tables::default_base_path;

/// one resolved log: identifier, absolute path, column layout
#[derive(Debug, Clone)]
pub struct LogTarget {
    pub name: String,
    pub path: PathBuf,
    pub layout: LogLayout,
}

/// catalog of the logs a deployment is expected to carry
#[derive(Debug, Clone)]
pub struct LogCatalog {
    base_path: PathBuf,
}

impl LogCatalog {
    /// catalog rooted at the platform default, or at an override for
    /// non-standard install locations
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self {
            base_path: base_override
                .unwrap_or_else(|| PathBuf::from(tables::default_base_path())),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// every supported log name, sorted
    pub fn log_names() -> Vec<&'static str> {
        tables::log_names()
    }

    /// the column layout for a log name; unknown names get the plain layout
    pub fn layout(name: &str) -> LogLayout {
        tables::layout(name)
    }

    /// absolute path of a known log
    pub fn full_path(&self, name: &str) -> Option<PathBuf> {
        tables::relative_path(name).map(|rel| {
            let rel = Path::new(rel);
            if rel.is_absolute() {
                rel.to_path_buf()
            } else {
                self.base_path.join(rel)
            }
        })
    }

    /// resolve an identifier to a display target; an unknown identifier is a
    /// fatal configuration error
    pub fn resolve(&self, name: &str) -> Result<LogTarget, EngineError> {
        let path = self
            .full_path(name)
            .ok_or_else(|| EngineError::UnknownLog(name.to_string()))?;
        Ok(LogTarget {
            name: name.to_string(),
            path,
            layout: Self::layout(name),
        })
    }

    /// print one line per supported log with size and modification time
    pub fn list_logs<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "LOG NAME                 SIZE  MODIFIED")?;
        for name in Self::log_names() {
            let Some(path) = self.full_path(name) else {
                continue;
            };
            match fs::metadata(&path) {
                Ok(md) => {
                    let modified = md
                        .modified()
                        .map(|t| {
                            DateTime::<Local>::from(t)
                                .format("%a %b %e %H:%M:%S %Y")
                                .to_string()
                        })
                        .unwrap_or_else(|_| String::from("?"));
                    writeln!(out, "{:18} {:>10}  {:>24}", name, md.len(), modified)?;
                }
                Err(_) => {
                    writeln!(out, "{:18}            <missing>", name)?;
                }
            }
        }
        Ok(())
    }

    /// print log names as used by the command with their expected paths
    pub fn list_log_names<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "LOG NAME           PATH")?;
        for name in Self::log_names() {
            if let Some(path) = self.full_path(name) {
                writeln!(out, "{:18} {}", name, path.display())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_log() {
        let catalog = LogCatalog::new(Some(PathBuf::from("/srv/fms")));
        let target = catalog.resolve("events").unwrap();
        assert_eq!(target.path, PathBuf::from("/srv/fms/Logs/Event.log"));
        assert!(target.layout.header.is_some());
    }

    #[test]
    fn test_resolve_unknown_log() {
        let catalog = LogCatalog::new(None);
        assert!(matches!(
            catalog.resolve("nonsense"),
            Err(EngineError::UnknownLog(_))
        ));
    }

    #[test]
    fn test_unknown_layout_is_plain() {
        let layout = LogCatalog::layout("fmsdebug");
        assert!(layout.header.is_none());
        assert!(layout.stops.is_empty());
    }

    #[test]
    fn test_log_names_sorted_and_known() {
        let names = LogCatalog::log_names();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert!(names.contains(&"access"));
        assert!(names.contains(&"events"));
        assert!(names.contains(&"wpe"));
    }

    #[test]
    fn test_list_logs_marks_missing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = LogCatalog::new(Some(dir.path().to_path_buf()));
        let mut out = Vec::new();
        catalog.list_logs(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("<missing>"));
    }

    #[test]
    fn test_list_logs_shows_present_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Logs")).unwrap();
        fs::write(dir.path().join("Logs/Event.log"), "hello\n").unwrap();
        let catalog = LogCatalog::new(Some(dir.path().to_path_buf()));
        let mut out = Vec::new();
        catalog.list_logs(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let events_line = text.lines().find(|l| l.starts_with("events")).unwrap();
        assert!(events_line.contains('6'), "size column present: {events_line}");
    }

    #[test]
    fn test_succinct_layouts_cut_the_zone() {
        for name in ["access", "dapi", "odata", "events"] {
            let layout = LogCatalog::layout(name);
            assert!(
                layout.succinct_cuts.contains(&(23, 29)),
                "{name} should strip the zone offset"
            );
        }
    }
}
