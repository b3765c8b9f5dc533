/*!
 * Result set rendering
 *
 * Turns a result set into display lines for the active output mode:
 * - LINE: one `name:value` line per column and row
 * - TABLE: boxed layout with per-column width and alignment
 * - CSV and FILE are declared modes without a renderer
 *
 * Both renderers paint through the session's `Theme`.
 */

pub mod layout;
pub mod line;
pub mod table;
pub mod theme;

use std::fmt;

use crate::config::FormatConfig;
use crate::database::ResultSet;
use crate::error::{ShellError, ShellResult};

pub use theme::Theme;

/// Output mode names offered by completion, in declaration order.
pub const OUTPUT_MODES: [&str; 4] = ["TABLE", "LINE", "CSV", "FILE"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Table,
    Line,
    Csv,
    File,
    /// A name that is not in the format registry at all.
    Unsupported(String),
}

impl OutputMode {
    /// Case-insensitive. Never fails: unknown names surface when rendering.
    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "TABLE" => OutputMode::Table,
            "LINE" => OutputMode::Line,
            "CSV" => OutputMode::Csv,
            "FILE" => OutputMode::File,
            other => OutputMode::Unsupported(other.to_string()),
        }
    }

    pub fn is_declared(&self) -> bool {
        !matches!(self, OutputMode::Unsupported(_))
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Table => f.write_str("TABLE"),
            OutputMode::Line => f.write_str("LINE"),
            OutputMode::Csv => f.write_str("CSV"),
            OutputMode::File => f.write_str("FILE"),
            OutputMode::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Render `result` in `mode`. Modes without a renderer produce no lines and
/// an `UnknownRenderMode` error.
pub fn render(result: &ResultSet, mode: &OutputMode, config: &FormatConfig) -> ShellResult<Vec<String>> {
    match mode {
        OutputMode::Table => Ok(table::render(result, &config.table, &config.theme)),
        OutputMode::Line => Ok(line::render(result, &config.line, &config.theme)),
        OutputMode::Csv | OutputMode::File | OutputMode::Unsupported(_) => {
            Err(ShellError::UnknownRenderMode(mode.to_string()))
        }
    }
}
