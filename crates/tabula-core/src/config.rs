//! Sheet configuration.
//!
//! Every field is optional in the TOML form; missing fields take the
//! defaults below. Unknown fields are rejected so typos surface early.
//!
//! ```toml
//! rows = 200
//! columns = 52
//! default_row_height = 25
//! default_column_width = 100
//! ```

use serde::Deserialize;

use crate::error::{Result, SheetError};

pub const DEFAULT_ROWS: usize = 100;
pub const DEFAULT_COLUMNS: usize = 26;
pub const DEFAULT_ROW_HEIGHT: u32 = 25;
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

/// Grid dimensions and default row/column sizes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub rows: usize,
    pub columns: usize,
    pub default_row_height: u32,
    pub default_column_width: u32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            default_row_height: DEFAULT_ROW_HEIGHT,
            default_column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl SheetConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SheetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(SheetError::InvalidDimension("row"));
        }
        if self.columns == 0 {
            return Err(SheetError::InvalidDimension("column"));
        }
        Ok(())
    }
}
