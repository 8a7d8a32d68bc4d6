//! Secret code detection over the keystroke stream
//!
//! Keeps a rolling buffer of key tokens and reports when the configured
//! code followed by `=` appears anywhere in it. Detection is a raw
//! substring check; the matcher never touches mode state itself.

use crate::constants::{BUFFER_KEEP_CHARS, BUFFER_MAX_CHARS};

/// Verdict for a single keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Match,
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

pub struct PatternMatcher {
    trigger: String,
    buffer: String,
}

impl PatternMatcher {
    /// Create a matcher for `secret_code` followed by `=`.
    pub fn new(secret_code: &str) -> Self {
        Self {
            trigger: format!("{secret_code}="),
            buffer: String::new(),
        }
    }

    /// Record one key token and report whether the trigger sequence is now
    /// present in the buffer.
    ///
    /// The buffer is bounded in characters, not bytes (`×`, `÷`, `±` are
    /// multi-byte): past [`BUFFER_MAX_CHARS`] it is cut down to the last
    /// [`BUFFER_KEEP_CHARS`], which keeps any suffix long enough to hold a
    /// configured code plus `=`.
    pub fn on_keystroke(&mut self, token: char) -> MatchResult {
        self.buffer.push(token);
        log::debug!("Keystroke buffer: {} chars", self.buffer.chars().count());

        if self.buffer.contains(&self.trigger) {
            return MatchResult::Match;
        }

        let len = self.buffer.chars().count();
        if len > BUFFER_MAX_CHARS {
            self.buffer = self
                .buffer
                .chars()
                .skip(len - BUFFER_KEEP_CHARS)
                .collect();
            log::debug!("Keystroke buffer truncated to {BUFFER_KEEP_CHARS} chars");
        }

        MatchResult::NoMatch
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    #[cfg(test)]
    fn buffer(&self) -> &str {
        &self.buffer
    }
}
