//! Formula classification and argument splitting.
//!
//! Cell text is classified into one of the [`Formula`] forms. Classification
//! never fails: text that is neither a reference, a range nor a well-formed
//! function call is handed to the expression fallback.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Syntactic form of a cell's text.
#[derive(Clone, Debug, PartialEq)]
pub enum Formula<'a> {
    /// Text not starting with `=`.
    Literal(&'a str),
    /// `=B7`
    Reference(CellRef),
    /// Shaped like a reference but naming no cell, e.g. `=A0`.
    Unresolved(&'a str),
    /// `=A1:B3`, kept as the full original text.
    Range(&'a str),
    /// `=NAME(arg, arg, ...)` with raw, trimmed argument strings.
    Call { name: &'a str, args: Vec<&'a str> },
    /// Anything else after the `=`, e.g. `A1+B1*2`.
    Expression(&'a str),
}

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^=([A-Z]+[0-9]+)$").expect("reference regex must compile"))
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^=[A-Z]+[0-9]+:[A-Z]+[0-9]+$").expect("range regex must compile")
    })
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^=(?<name>[A-Z_]+)\((?<args>.*)\)$").expect("call regex must compile")
    })
}

/// Classify cell text.
pub fn parse_formula(text: &str) -> Formula<'_> {
    let Some(body) = text.strip_prefix('=') else {
        return Formula::Literal(text);
    };

    if let Some(caps) = reference_re().captures(text) {
        return match CellRef::parse(&caps[1]) {
            Some(cell) => Formula::Reference(cell),
            None => Formula::Unresolved(body),
        };
    }

    if range_re().is_match(text) {
        return Formula::Range(text);
    }

    if let Some(caps) = call_re().captures(text) {
        let name = caps.name("name").map_or("", |m| m.as_str());
        let args = caps.name("args").map_or("", |m| m.as_str());
        // `=SUM(A1)+SUM(A2)` matches the pattern but its outer parentheses
        // do not belong together.
        if is_balanced(args) {
            return Formula::Call {
                name,
                args: split_args(args),
            };
        }
    }

    Formula::Expression(body)
}

/// Split an argument list on top-level commas.
///
/// Commas nested in parentheses or inside double-quoted strings do not split.
/// Pieces are trimmed; a trailing empty piece is dropped, so `""` yields no
/// arguments at all.
pub fn split_args(args: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;

    for (i, ch) in args.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                out.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = args[start..].trim();
    if !last.is_empty() {
        out.push(last);
    }
    out
}

fn is_balanced(args: &str) -> bool {
    let mut depth = 0i64;
    let mut in_string = false;
    for ch in args.chars() {
        match ch {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_text_is_not_a_formula() {
        assert_eq!(parse_formula("42"), Formula::Literal("42"));
        assert_eq!(parse_formula("A1"), Formula::Literal("A1"));
        assert_eq!(parse_formula(""), Formula::Literal(""));
    }

    #[test]
    fn test_direct_reference() {
        assert_eq!(parse_formula("=B7"), Formula::Reference(CellRef::new(6, 1)));
        assert_eq!(parse_formula("=AA1"), Formula::Reference(CellRef::new(0, 26)));
    }

    #[test]
    fn test_reference_to_row_zero_is_unresolved() {
        assert_eq!(parse_formula("=A0"), Formula::Unresolved("A0"));
        assert_eq!(parse_formula("=B007"), Formula::Reference(CellRef::new(6, 1)));
    }

    #[test]
    fn test_bare_range_is_opaque() {
        assert_eq!(parse_formula("=A1:B3"), Formula::Range("=A1:B3"));
    }

    #[test]
    fn test_function_call_with_nested_parentheses() {
        assert_eq!(
            parse_formula("=SUM(A1, MAX(B1,B2), 3)"),
            Formula::Call {
                name: "SUM",
                args: vec!["A1", "MAX(B1,B2)", "3"],
            }
        );
    }

    #[test]
    fn test_empty_call_has_no_arguments() {
        assert_eq!(
            parse_formula("=SUM()"),
            Formula::Call {
                name: "SUM",
                args: vec![],
            }
        );
    }

    #[test]
    fn test_quoted_commas_do_not_split() {
        assert_eq!(split_args(r#""a,b", C1"#), vec![r#""a,b""#, "C1"]);
    }

    #[test]
    fn test_inner_empty_argument_is_kept() {
        assert_eq!(split_args("1,,2,"), vec!["1", "", "2"]);
    }

    #[test]
    fn test_unbalanced_calls_fall_through_to_expression() {
        assert_eq!(
            parse_formula("=SUM(A1)+SUM(A2)"),
            Formula::Expression("SUM(A1)+SUM(A2)")
        );
        assert_eq!(parse_formula("=A1+B1"), Formula::Expression("A1+B1"));
        assert_eq!(parse_formula("=sum(A1)"), Formula::Expression("sum(A1)"));
    }
}
