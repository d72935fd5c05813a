/// immutable column layout for one log source
///
/// owned by the catalog; the engine only reads it. Logs without stable
/// columns use [`LogLayout::plain`], which leaves lines untouched.
#[derive(Debug, Clone, Copy)]
pub struct LogLayout {
    /// header line printed above the log's output, if the log has stable columns
    pub header: Option<&'static str>,
    /// visual column where the text after each tab should start, full mode
    pub stops: &'static [usize],
    /// shorter stop list used in succinct mode
    pub succinct_stops: &'static [usize],
    /// header for succinct mode
    pub succinct_header: Option<&'static str>,
    /// `(keep_end, resume_at)` byte ranges excised from the tab-expanded
    /// line in succinct mode (timezone offset, redundant hostname)
    pub succinct_cuts: &'static [(usize, usize)],
}

impl LogLayout {
    /// layout for logs with no stable columns
    pub const fn plain() -> Self {
        Self {
            header: None,
            stops: &[],
            succinct_stops: &[],
            succinct_header: None,
            succinct_cuts: &[],
        }
    }
}

impl Default for LogLayout {
    fn default() -> Self {
        Self::plain()
    }
}
