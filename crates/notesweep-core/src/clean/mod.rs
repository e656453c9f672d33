mod blocks;
mod date;
mod pipeline;
mod sections;

pub use blocks::{strip_fenced_blocks, BlockStripper, BUTTON_TAG, TASKS_TAG};
pub use date::{days_since, extract_date, is_eligible};
pub use pipeline::{apply, Pipeline};
pub use sections::{classify, is_heading, prune_empty_sections, LineSpan, SpanKind};
