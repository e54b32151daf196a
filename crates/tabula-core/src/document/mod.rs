//! Sheet state and logic (UI-agnostic).

mod clipboard;
mod ops;
mod recalc;
mod state;

pub use clipboard::Clipboard;
pub use state::Sheet;
