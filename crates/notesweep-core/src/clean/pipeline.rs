use super::blocks::{BlockStripper, BUTTON_TAG, TASKS_TAG};
use super::sections::prune_empty_sections;
use crate::config::CleanupConfig;

/// The ordered set of rewrites applied to an eligible note
///
/// Block stripping runs before pruning so a section whose only content was a
/// removed block is pruned in the same pass.
#[derive(Debug, Clone)]
pub struct Pipeline {
    buttons: Option<BlockStripper>,
    task_queries: Option<BlockStripper>,
    prune_sections: bool,
}

impl Pipeline {
    pub fn new(config: &CleanupConfig) -> Self {
        Self {
            buttons: config.strip_buttons.then(|| BlockStripper::new(BUTTON_TAG)),
            task_queries: config
                .strip_task_queries
                .then(|| BlockStripper::new(TASKS_TAG)),
            prune_sections: config.prune_empty_sections,
        }
    }

    /// Apply the enabled rewrites, then trim the result and end it with a
    /// single newline.
    ///
    /// Passes repeat until the text stops changing. Trimming can turn an
    /// indented line into a heading, and removing a block can splice a new
    /// fence together, so one pass is not always enough.
    pub fn apply(&self, text: &str) -> String {
        let mut out = self.pass(text);
        loop {
            // Every change after the first pass removes at least one
            // non-whitespace character, so this terminates.
            let next = self.pass(&out);
            if next == out {
                return out;
            }
            out = next;
        }
    }

    fn pass(&self, text: &str) -> String {
        let mut out = text.to_string();

        for stripper in [&self.buttons, &self.task_queries].into_iter().flatten() {
            out = stripper.strip(&out).into_owned();
        }

        if self.prune_sections {
            out = prune_empty_sections(&out);
        }

        let mut normalized = out.trim().to_string();
        normalized.push('\n');
        normalized
    }
}

/// Run the cleanup rewrites configured in `config` over `text`
pub fn apply(text: &str, config: &CleanupConfig) -> String {
    Pipeline::new(config).apply(text)
}
