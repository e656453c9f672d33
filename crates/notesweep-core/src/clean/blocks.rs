use std::borrow::Cow;

use regex::Regex;

/// Tag of the fenced blocks rendered as buttons
pub const BUTTON_TAG: &str = "button";
/// Tag of the fenced blocks holding task queries
pub const TASKS_TAG: &str = "tasks";

/// Removes fenced blocks opened by "```" + tag
#[derive(Debug, Clone)]
pub struct BlockStripper {
    pattern: Regex,
}

impl BlockStripper {
    pub fn new(tag: &str) -> Self {
        // Non-greedy, so each opener pairs with the next closing fence.
        let pattern = Regex::new(&format!(r"(?s)```{}.*?```", regex::escape(tag)))
            .expect("escaped tag always forms a valid pattern");
        Self { pattern }
    }

    /// Delete every complete block, fences included.
    /// An opener without a closing fence is left as is.
    pub fn strip<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, "")
    }
}

/// Convenience wrapper around [`BlockStripper`] for one-off use
pub fn strip_fenced_blocks<'t>(text: &'t str, tag: &str) -> Cow<'t, str> {
    BlockStripper::new(tag).strip(text)
}
