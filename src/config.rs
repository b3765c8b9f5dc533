//! Session-owned formatting configuration.
//!
//! Every output mode has its own block of tuning parameters. The per-column
//! overrides of the TABLE mode are stored and shown, but the table renderer
//! does not apply them.

use std::collections::BTreeMap;

use crate::error::{ShellError, ShellResult};
use crate::render::Theme;

pub const DEFAULT_MAX_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct FormatConfig {
    pub table: TableFormat,
    pub line: LineFormat,
    pub csv: CsvFormat,
    pub theme: Theme,
}

impl FormatConfig {
    pub fn new(max_width: usize) -> Self {
        Self {
            table: TableFormat {
                max_width,
                columns: TableColumnConfig::default(),
            },
            line: LineFormat {
                max_width: None,
                truncate_line: true,
            },
            csv: CsvFormat {
                separator: ",".to_string(),
            },
            theme: Theme::PLAIN,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableFormat {
    pub max_width: usize,
    pub columns: TableColumnConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineFormat {
    /// `None` means unlimited.
    pub max_width: Option<usize>,
    pub truncate_line: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    pub separator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOverride {
    pub max_width: Option<usize>,
    pub min_width: Option<usize>,
    pub truncate: Option<bool>,
}

/// Per-column overrides for TABLE mode, keyed by column index or name as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableColumnConfig {
    entries: BTreeMap<String, ColumnOverride>,
}

impl TableColumnConfig {
    pub fn get(&self, column: &str) -> Option<&ColumnOverride> {
        self.entries.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnOverride)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create or update the override for `column`.
    ///
    /// `params` are `[MAX_WIDTH] [MIN_WIDTH] [TRUNCATE]`, all optional from the
    /// right. Each one is checked on its own: valid values are stored even when
    /// a sibling is malformed, malformed ones are left unset and reported
    /// together in the returned error.
    pub fn set(&mut self, column: &str, params: &[&str]) -> ShellResult<()> {
        let entry = self.entries.entry(column.to_string()).or_default();
        let mut problems = Vec::new();

        if let Some(raw) = params.first() {
            match parse_width(raw) {
                Some(width) => entry.max_width = Some(width),
                None => problems.push(format!("MAX_WIDTH is not numeric ({})", raw)),
            }
        }

        if let Some(raw) = params.get(1) {
            match parse_width(raw) {
                Some(width) => entry.min_width = Some(width),
                None => problems.push(format!("MIN_WIDTH is not numeric ({})", raw)),
            }
        }

        if let Some(raw) = params.get(2) {
            match parse_truncate(raw) {
                Some(truncate) => entry.truncate = Some(truncate),
                None => problems.push(format!("TRUNCATE value unrecognised ({})", raw)),
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ShellError::InvalidParameter(problems.join("; ")))
        }
    }

    pub fn remove(&mut self, column: &str) -> ShellResult<ColumnOverride> {
        self.entries.remove(column).ok_or_else(|| {
            ShellError::InvalidParameter(format!("no configuration for column {}", column))
        })
    }
}

fn parse_width(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_truncate(raw: &str) -> Option<bool> {
    match raw.to_uppercase().as_str() {
        "TRUE" | "YES" => Some(true),
        "FALSE" | "NO" => Some(false),
        _ => None,
    }
}
