use super::layout::display_len;
use super::theme::Theme;
use crate::config::LineFormat;
use crate::database::ResultSet;

const SEPARATOR: char = ':';

/// One `name:value` line per column, a blank line after each row.
pub fn render(result: &ResultSet, _format: &LineFormat, theme: &Theme) -> Vec<String> {
    let name_width = result
        .columns()
        .iter()
        .map(|c| display_len(&c.name))
        .max()
        .unwrap_or(0)
        + 1;

    let mut lines = Vec::with_capacity(result.rows().len() * (result.columns().len() + 1));
    for row in result.rows() {
        for (column, value) in result.columns().iter().zip(row) {
            let name = format!("{:<width$}", column.name, width = name_width);
            lines.push(format!(
                "{}{}{}",
                theme.column_name(&name),
                SEPARATOR,
                theme.data(&value.to_string())
            ));
        }
        lines.push(String::new());
    }
    lines
}
