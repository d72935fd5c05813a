use crate::error::EngineError;
use regex::Regex;
use std::sync::Arc;

/// compiled content filter shared by the window resolver and every follower
///
/// compiled once before any file is opened; clones share the compiled
/// expression, which is immutable and safe to read from multiple follow
/// threads concurrently
#[derive(Debug, Clone)]
pub struct LineFilter {
    regex: Option<Arc<Regex>>,
}

impl LineFilter {
    /// the default filter: every line matches
    pub fn match_all() -> Self {
        Self { regex: None }
    }

    /// compile a pattern up front; a bad pattern fails here, before any I/O
    pub fn compile(pattern: &str) -> Result<Self, EngineError> {
        Ok(Self {
            regex: Some(Arc::new(Regex::new(pattern)?)),
        })
    }

    pub fn matches(&self, line: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(line),
            None => true,
        }
    }
}

impl Default for LineFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all_default() {
        let filter = LineFilter::match_all();
        assert!(filter.matches("anything"));
        assert!(filter.matches(""));
    }

    #[test]
    fn test_compiled_pattern() {
        let filter = LineFilter::compile(r"ERROR \d+").unwrap();
        assert!(filter.matches("2025-10-15 ERROR 401 denied"));
        assert!(!filter.matches("2025-10-15 WARNING nothing"));
    }

    #[test]
    fn test_bad_pattern_fails_at_compile() {
        assert!(matches!(
            LineFilter::compile("(["),
            Err(EngineError::BadFilter(_))
        ));
    }

    #[test]
    fn test_clones_share_compiled_expression() {
        let filter = LineFilter::compile("abc").unwrap();
        let clone = filter.clone();
        assert!(clone.matches("xxabcxx"));
    }
}
