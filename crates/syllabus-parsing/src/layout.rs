//! Layout reconstruction: positioned runs → linear text.
//!
//! PDF decoders expose glyph placement, not logical structure. Line breaks
//! and word spacing are recovered from the geometry of each run relative to
//! the run painted just before it.

use once_cell::sync::Lazy;
use regex::Regex;

use syllabus_core::{Page, PositionedRun};

/// Line break emitted when a run starts left of its predecessor.
pub const LINE_BREAK: &str = "\r\n";

/// Appended after every page.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// A lone letter, optionally preceded by one whitespace character: the
/// typical shape of a word fragment split across runs (`"A"` + `"pple"`).
static BARE_LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s?[A-Za-z]$").unwrap());

/// Linearize every page and concatenate them in order.
///
/// Page *k*'s text always precedes page *k+1*'s, separated by one blank line.
/// Pure: the same input always yields byte-identical output.
pub fn reconstruct(pages: &[Page]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push_str(&reconstruct_page(page));
    }
    out
}

/// Linearize one page, including its trailing page separator.
pub fn reconstruct_page(page: &Page) -> String {
    let (mut buffer, _) = page.runs.iter().fold(
        (String::new(), None::<&PositionedRun>),
        |(mut buffer, last), run| {
            if let Some(sep) = last.and_then(|prev| separator(prev, run)) {
                buffer.push_str(sep);
            }
            buffer.push_str(&run.text);
            (buffer, Some(run))
        },
    );

    tracing::debug!(
        page = page.index,
        runs = page.runs.len(),
        chars = buffer.len(),
        "reconstructed page"
    );

    buffer.push_str(PAGE_SEPARATOR);
    buffer
}

/// Decide what goes between `prev` and `current`, if anything.
fn separator(prev: &PositionedRun, current: &PositionedRun) -> Option<&'static str> {
    if prev.text.ends_with(' ') {
        return None;
    }

    if current.origin.x < prev.origin.x {
        return Some(LINE_BREAK);
    }

    if current.origin.y != prev.origin.y && !is_bare_letter(&prev.text) {
        return Some(" ");
    }

    None
}

fn is_bare_letter(text: &str) -> bool {
    BARE_LETTER_RE.is_match(text)
}
