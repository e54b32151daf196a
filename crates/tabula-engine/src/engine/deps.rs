//! Dependency extraction from formula strings.
//!
//! Finds every cell a formula reads so callers can detect cycles and decide
//! which cells to recompute after a write. Dependencies are always derived
//! from the formula text and never cached.
//!
//! Handles:
//! - Simple cell references: `A1`, `B2`
//! - Ranges: `A1:B5` contributes every cell of the rectangle
//! - Ignores references inside string literals

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::cell_ref::CellRef;
use super::range::CellRange;

const MAX_DEPENDENCY_RANGE_CELLS: usize = 1_000_000;

/// Regex matching a single cell reference token such as `A1` or `AB12`.
pub fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b([A-Z]+)([0-9]+)\b").expect("dependency cell reference regex must compile")
    })
}

fn range_ref_re() -> &'static Regex {
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    RANGE_RE.get_or_init(|| {
        Regex::new(r"\b([A-Z]+[0-9]+):([A-Z]+[0-9]+)\b")
            .expect("dependency range regex must compile")
    })
}

/// Extract all cells a formula reads, de-duplicated, in order of first appearance.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    let mut push = |cell: CellRef| {
        if seen.insert(cell) {
            deps.push(cell);
        }
    };

    for (is_literal, segment) in split_string_literals(formula) {
        if is_literal {
            continue;
        }

        for caps in range_ref_re().captures_iter(segment) {
            let Some(range) = CellRange::parse(&caps[0]) else {
                continue;
            };
            match range.cell_count() {
                Some(n) if n <= MAX_DEPENDENCY_RANGE_CELLS => range.cells().for_each(&mut push),
                // Oversized ranges only register their corners.
                _ => {
                    push(range.start);
                    push(range.end);
                }
            }
        }

        let without_ranges = range_ref_re().replace_all(segment, " ");
        for caps in cell_ref_re().captures_iter(&without_ranges) {
            if let Some(cell) = CellRef::parse(&caps[0]) {
                push(cell);
            }
        }
    }

    deps
}

/// Split text into alternating code and string-literal segments.
///
/// Literal segments keep their surrounding quotes. A backslash inside a
/// literal escapes the next character. An unterminated literal runs to the
/// end of the text.
pub(crate) fn split_string_literals(text: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                segments.push((true, &text[start..=i]));
                start = i + 1;
                in_string = false;
            }
        } else if ch == '"' {
            if start < i {
                segments.push((false, &text[start..i]));
            }
            start = i;
            in_string = true;
        }
    }

    if start < text.len() {
        segments.push((in_string, &text[start..]));
    }
    segments
}
