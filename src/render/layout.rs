use crate::database::{CellValue, ResultSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    /// Numbers align right, text aligns left, everything else is centered.
    pub fn for_value(value: &CellValue) -> Self {
        match value {
            CellValue::Integer(_) | CellValue::Real(_) => Alignment::Right,
            CellValue::Text(_) => Alignment::Left,
            CellValue::Null | CellValue::Blob(_) => Alignment::Center,
        }
    }

    pub fn pad(self, text: &str, width: usize) -> String {
        match self {
            Alignment::Left => format!("{:<width$}", text, width = width),
            Alignment::Right => format!("{:>width$}", text, width = width),
            Alignment::Center => format!("{:^width$}", text, width = width),
        }
    }
}

/// Display width and alignment of one column for a single render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub width: usize,
    pub alignment: Alignment,
}

impl ColumnLayout {
    /// Widths cover the column name and every stringified cell. Alignment is
    /// taken from the first row only, even if later rows hold other kinds.
    pub fn compute(result: &ResultSet) -> Vec<ColumnLayout> {
        let first_row = result.rows().first();

        result
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let width = result
                    .rows()
                    .iter()
                    .map(|row| display_len(&row[idx].to_string()))
                    .fold(display_len(&column.name), usize::max);
                let alignment = first_row
                    .map(|row| Alignment::for_value(&row[idx]))
                    .unwrap_or(Alignment::Center);
                ColumnLayout { width, alignment }
            })
            .collect()
    }

    /// Width of the boxed table: every column adds one padding space and one
    /// border character, plus the leading border.
    pub fn frame_width(layouts: &[ColumnLayout]) -> usize {
        layouts.iter().map(|l| l.width).sum::<usize>() + 2 * layouts.len() + 1
    }
}

pub(crate) fn display_len(text: &str) -> usize {
    text.chars().count()
}
