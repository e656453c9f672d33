//! Empty section pruning
//!
//! A section is a heading line plus every line up to the next heading (of any
//! level) or the end of the text. Sections are never materialized; the text is
//! classified into line spans and empty sections are filtered out.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s").expect("heading pattern is valid"));

/// Classification of a run of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A heading with at least one non-blank line before the next heading
    HeadingWithContent,
    /// A heading and the blank lines following it
    EmptySection,
    /// Any line that is not a heading
    Body,
}

/// Range of line indices sharing one classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub kind: SpanKind,
    pub lines: Range<usize>,
}

pub fn is_heading(line: &str) -> bool {
    HEADING_RE.is_match(line)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Classify `lines` into consecutive spans covering every line exactly once.
///
/// Headings are judged independently of their level: a `##` heading followed
/// only by blank lines before a `#` heading is empty even if the `#` section
/// has content.
pub fn classify<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = LineSpan> + 'a {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= lines.len() {
            return None;
        }

        let at = start;
        if !is_heading(lines[at]) {
            start += 1;
            return Some(LineSpan {
                kind: SpanKind::Body,
                lines: at..at + 1,
            });
        }

        let end = lines[at + 1..]
            .iter()
            .position(|line| is_heading(line))
            .map_or(lines.len(), |offset| at + 1 + offset);

        if lines[at + 1..end].iter().all(|line| is_blank(line)) {
            start = end;
            Some(LineSpan {
                kind: SpanKind::EmptySection,
                lines: at..end,
            })
        } else {
            // Body lines of a non-empty section are emitted one by one
            start = at + 1;
            Some(LineSpan {
                kind: SpanKind::HeadingWithContent,
                lines: at..at + 1,
            })
        }
    })
}

/// Remove headings that have nothing but blank lines beneath them,
/// together with those blank lines.
pub fn prune_empty_sections(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let lines = lines.as_slice();

    classify(lines)
        .filter(|span| span.kind != SpanKind::EmptySection)
        .flat_map(move |span| lines[span.lines].iter().copied())
        .collect::<Vec<_>>()
        .join("\n")
}
