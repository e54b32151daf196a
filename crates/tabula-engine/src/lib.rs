//! tabula_engine - Spreadsheet formula engine.

pub mod builtins;
pub mod engine;
pub mod error;

pub use error::{EngineError, Result};
