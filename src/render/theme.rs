/// ANSI colours for the parts of rendered output. Padding is applied before
/// painting, so coloured lines have the same visible width as plain ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
    column_name: Option<&'static str>,
    frame: Option<&'static str>,
    data: Option<&'static str>,
}

const YELLOW: &str = "\x1b[1;33m";
const BLUE: &str = "\x1b[0;34m";
const LIGHT_GRAY: &str = "\x1b[0;37m";
const RESET: &str = "\x1b[0m";

impl Theme {
    pub const PLAIN: Theme = Theme {
        column_name: None,
        frame: None,
        data: None,
    };

    pub const COLORED: Theme = Theme {
        column_name: Some(YELLOW),
        frame: Some(BLUE),
        data: Some(LIGHT_GRAY),
    };

    pub fn column_name(&self, text: &str) -> String {
        paint(self.column_name, text)
    }

    pub fn frame(&self, text: &str) -> String {
        paint(self.frame, text)
    }

    pub fn data(&self, text: &str) -> String {
        paint(self.data, text)
    }
}

fn paint(color: Option<&str>, text: &str) -> String {
    match color {
        Some(color) => format!("{}{}{}", color, text, RESET),
        None => text.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn strip_colors(line: &str) -> String {
    let ansi = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    ansi.replace_all(line, "").into_owned()
}
