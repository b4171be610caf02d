//! Completion detection for streamed chunks
//!
//! A chunk signals logical completion when it contains one of the configured
//! sentinels as a plain, case-sensitive substring. Sentinels that look like
//! JSON fragments are still matched as text; nothing is parsed.

use shared::default_end_flags;

/// Returns true iff `chunk` contains any non-empty sentinel
///
/// Empty chunks never match; callers drop them before classification.
pub fn classify<S: AsRef<str>>(chunk: &str, sentinels: &[S]) -> bool {
    if chunk.is_empty() {
        return false;
    }
    sentinels.iter().any(|sentinel| {
        let sentinel = sentinel.as_ref();
        !sentinel.is_empty() && chunk.contains(sentinel)
    })
}

/// Ordered set of completion sentinels for one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSentinels(Vec<String>);

impl CompletionSentinels {
    pub fn new(sentinels: Vec<String>) -> Self {
        Self(sentinels)
    }

    pub fn matches(&self, chunk: &str) -> bool {
        classify(chunk, &self.0)
    }

    /// First sentinel found in `chunk`, for diagnostics
    pub fn first_match(&self, chunk: &str) -> Option<&str> {
        if chunk.is_empty() {
            return None;
        }
        self.0
            .iter()
            .map(String::as_str)
            .find(|sentinel| !sentinel.is_empty() && chunk.contains(sentinel))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CompletionSentinels {
    fn default() -> Self {
        Self(default_end_flags())
    }
}
