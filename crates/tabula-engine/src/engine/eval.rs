//! Formula evaluation.
//!
//! Turns cell text into a [`Value`], reading other cells through a
//! [`ValueSource`]. Function calls resolve their arguments and dispatch to a
//! [`FunctionRegistry`]; every other formula goes through reference
//! substitution and the closed-grammar evaluator in [`super::expr`].
//!
//! Evaluation never fails: problems become [`CellError`] values.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{trace, warn};

use super::cell_ref::CellRef;
use super::deps::{cell_ref_re, split_string_literals};
use super::expr::eval_expression;
use super::parse::{Formula, parse_formula};
use super::range::CellRange;
use super::value::{CellError, Value, coerce_literal, format_number, parse_number};
use crate::builtins::FunctionRegistry;

/// Upper bound on cells a single range argument may expand to.
const MAX_RANGE_ARGUMENT_CELLS: usize = 1_000_000;

/// Read access to computed cell values.
pub trait ValueSource {
    /// The cell's computed value; absent cells are [`Value::Null`].
    fn value(&self, cell: &CellRef) -> Value;
}

fn range_arg_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z]+[0-9]+:[A-Z]+[0-9]+$").expect("range argument regex must compile")
    })
}

/// Evaluate cell text: literals are coerced, formulas are computed.
pub fn evaluate<S: ValueSource + ?Sized>(
    text: &str,
    cells: &S,
    functions: &FunctionRegistry,
) -> Value {
    match parse_formula(text) {
        Formula::Literal(raw) => coerce_literal(raw),
        Formula::Reference(cell) => cells.value(&cell),
        Formula::Unresolved(_) => Value::Null,
        Formula::Range(range) => Value::Text(range.to_string()),
        Formula::Call { name, args } => call_function(name, &args, cells, functions),
        Formula::Expression(body) => eval_substituted(body, cells),
    }
}

fn call_function<S: ValueSource + ?Sized>(
    name: &str,
    args: &[&str],
    cells: &S,
    functions: &FunctionRegistry,
) -> Value {
    let Some(function) = functions.get(name) else {
        return CellError::UnknownFunction(name.to_string()).into();
    };

    let mut resolved = Vec::with_capacity(args.len());
    for arg in args {
        if let Err(e) = resolve_arg(arg, cells, &mut resolved) {
            return e.into();
        }
    }

    trace!(function = name, argc = resolved.len(), "dispatching function");
    function(&resolved)
}

/// Resolve one raw argument, appending its value(s). Ranges flatten in place.
fn resolve_arg<S: ValueSource + ?Sized>(
    arg: &str,
    cells: &S,
    out: &mut Vec<Value>,
) -> Result<(), CellError> {
    if range_arg_re().is_match(arg)
        && let Some(range) = CellRange::parse(arg)
    {
        match range.cell_count() {
            Some(n) if n <= MAX_RANGE_ARGUMENT_CELLS => {
                out.extend(range.cells().map(|cell| cells.value(&cell)));
                return Ok(());
            }
            _ => return Err(CellError::Ref),
        }
    }

    if let Some(cell) = CellRef::parse(arg) {
        out.push(cells.value(&cell));
    } else if let Some(n) = parse_number(arg) {
        out.push(Value::Number(n));
    } else if arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"') {
        out.push(Value::Text(arg[1..arg.len() - 1].to_string()));
    } else {
        out.push(Value::Text(arg.to_string()));
    }
    Ok(())
}

/// Substitute referenced values into `body` and evaluate the result.
fn eval_substituted<S: ValueSource + ?Sized>(body: &str, cells: &S) -> Value {
    let segments = split_string_literals(body);

    let mut values: HashMap<&str, Value> = HashMap::new();
    for (_, segment) in segments.iter().filter(|(is_literal, _)| !is_literal) {
        for token in cell_ref_re().find_iter(segment) {
            let Some(cell) = CellRef::parse(token.as_str()) else {
                continue;
            };
            match cells.value(&cell) {
                Value::Null => return CellError::Ref.into(),
                Value::Error(e) => return e.into(),
                value => {
                    values.insert(token.as_str(), value);
                }
            }
        }
    }

    let mut substituted = String::with_capacity(body.len());
    for (is_literal, segment) in &segments {
        if *is_literal {
            substituted.push_str(segment);
            continue;
        }
        let replaced = cell_ref_re().replace_all(segment, |caps: &regex::Captures| {
            match values.get(&caps[0]) {
                Some(value) => to_literal(value),
                None => caps[0].to_string(),
            }
        });
        substituted.push_str(&replaced);
    }

    match eval_expression(&substituted) {
        Ok(value) => value,
        Err(e) => {
            warn!(expression = %substituted, error = %e, "expression evaluation failed");
            CellError::Error.into()
        }
    }
}

fn to_literal(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        other => {
            let text = other.as_text().replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\"", text)
        }
    }
}
