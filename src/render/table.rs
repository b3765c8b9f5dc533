use super::layout::ColumnLayout;
use super::theme::Theme;
use crate::config::TableFormat;
use crate::database::ResultSet;

const FRAME: char = '=';
const BORDER: char = '|';
const JOINT: char = '+';
const RULE: char = '-';

/// Boxed layout:
///
/// ```text
/// ===========
/// | id| name|
/// +---+-----+
/// |  1| a   |
/// ===========
/// ```
///
/// The column overrides in `format` are not consulted; widths always come
/// from the data.
pub fn render(result: &ResultSet, _format: &TableFormat, theme: &Theme) -> Vec<String> {
    if result.is_empty() {
        return Vec::new();
    }

    let layouts = ColumnLayout::compute(result);
    let frame = FRAME
        .to_string()
        .repeat(ColumnLayout::frame_width(&layouts));

    let mut lines = Vec::with_capacity(result.rows().len() + 4);
    let frame = theme.frame(&frame);
    lines.push(frame.clone());

    let names = result.columns().iter().map(|c| c.name.clone());
    lines.push(format_row(&layouts, names, theme, |text| theme.column_name(text)));

    let mut separator = String::from(JOINT);
    for layout in &layouts {
        separator.extend(std::iter::repeat(RULE).take(layout.width + 1));
        separator.push(JOINT);
    }
    lines.push(theme.frame(&separator));

    for row in result.rows() {
        lines.push(format_row(
            &layouts,
            row.iter().map(|v| v.to_string()),
            theme,
            |text| theme.data(text),
        ));
    }

    lines.push(frame);
    lines
}

fn format_row(
    layouts: &[ColumnLayout],
    cells: impl Iterator<Item = String>,
    theme: &Theme,
    paint: impl Fn(&str) -> String,
) -> String {
    let border = theme.frame(&BORDER.to_string());
    let mut line = border.clone();
    for (layout, cell) in layouts.iter().zip(cells) {
        line.push(' ');
        line.push_str(&paint(&layout.alignment.pad(&cell, layout.width)));
        line.push_str(&border);
    }
    line
}
