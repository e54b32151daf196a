//! Built-in spreadsheet functions and the registry that dispatches to them.
//!
//! Conventions:
//! - Spreadsheet-facing names are ALL CAPS (e.g. `SUM`, `AVERAGE`).
//! - Functions receive their arguments already resolved and flattened, so a
//!   range contributes one value per cell.
//! - Aggregates ignore anything that is not a number.

use std::collections::HashMap;

use crate::engine::Value;

/// Function implementation signature.
pub type FunctionImpl = fn(&[Value]) -> Value;

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
    pub implementation: FunctionImpl,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        description: "Sum of numeric arguments",
        implementation: sum,
    },
    Builtin {
        name: "AVERAGE",
        description: "Mean of numeric arguments, 0 when there are none",
        implementation: average,
    },
    Builtin {
        name: "MAX",
        description: "Largest numeric argument",
        implementation: max,
    },
    Builtin {
        name: "MIN",
        description: "Smallest numeric argument",
        implementation: min,
    },
    Builtin {
        name: "COUNT",
        description: "Number of numeric arguments",
        implementation: count,
    },
    Builtin {
        name: "TRIM",
        description: "First argument without leading/trailing whitespace",
        implementation: trim,
    },
    Builtin {
        name: "UPPER",
        description: "First argument in upper case",
        implementation: upper,
    },
    Builtin {
        name: "LOWER",
        description: "First argument in lower case",
        implementation: lower,
    },
];

/// Named functions available to formulas.
///
/// `FunctionRegistry::default()` holds [`BUILTINS`]; [`register`](Self::register)
/// adds or replaces entries.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionImpl>,
}

impl FunctionRegistry {
    /// A registry with no functions at all.
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// Register `implementation` under `name` (stored upper-cased).
    /// Returns the previous implementation, if any.
    pub fn register(&mut self, name: &str, implementation: FunctionImpl) -> Option<FunctionImpl> {
        self.functions
            .insert(name.to_ascii_uppercase(), implementation)
    }

    pub fn get(&self, name: &str) -> Option<FunctionImpl> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for builtin in BUILTINS {
            registry.register(builtin.name, builtin.implementation);
        }
        registry
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

fn numbers(args: &[Value]) -> impl Iterator<Item = f64> + '_ {
    args.iter().filter_map(Value::as_number)
}

fn sum(args: &[Value]) -> Value {
    Value::Number(numbers(args).sum())
}

fn average(args: &[Value]) -> Value {
    let (total, n) = numbers(args).fold((0.0, 0usize), |(t, n), x| (t + x, n + 1));
    if n == 0 {
        Value::Number(0.0)
    } else {
        Value::Number(total / n as f64)
    }
}

fn max(args: &[Value]) -> Value {
    numbers(args).reduce(f64::max).map_or(Value::Null, Value::Number)
}

fn min(args: &[Value]) -> Value {
    numbers(args).reduce(f64::min).map_or(Value::Null, Value::Number)
}

fn count(args: &[Value]) -> Value {
    Value::Number(numbers(args).count() as f64)
}

/// Text form of the first argument; missing or null yields None.
fn first_text(args: &[Value]) -> Option<String> {
    args.first()
        .filter(|v| !v.is_null())
        .map(Value::as_text)
}

fn trim(args: &[Value]) -> Value {
    Value::Text(first_text(args).map(|s| s.trim().to_string()).unwrap_or_default())
}

fn upper(args: &[Value]) -> Value {
    Value::Text(first_text(args).map(|s| s.to_uppercase()).unwrap_or_default())
}

fn lower(args: &[Value]) -> Value {
    Value::Text(first_text(args).map(|s| s.to_lowercase()).unwrap_or_default())
}
