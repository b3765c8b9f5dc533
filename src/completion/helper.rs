/*!
 * SQLite completion helper
 *
 * Main interface integrating all completion functionality, implementing various rustyline traits
 */

use super::engine::CompletionEngine;
use regex::Regex;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::{self, MatchingBracketValidator, Validator};
use rustyline::Context;
use std::borrow::Cow;

/// Keywords shown in bold while typing.
const HIGHLIGHT_KEYWORDS: [&str; 24] = [
    "SELECT", "FROM", "WHERE", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE",
    "DROP", "ALTER", "TABLE", "VIEW", "INDEX", "JOIN", "ON", "GROUP", "ORDER", "BY", "HAVING",
    "LIMIT", "BEGIN", "COMMIT",
];

/// SQLite Helper (integrating all functionality)
pub struct SqliteHelper {
    engine: CompletionEngine,
    keywords: Option<Regex>,
    highlighter: MatchingBracketHighlighter,
    validator: MatchingBracketValidator,
    hinter: HistoryHinter,
}

impl SqliteHelper {
    pub fn new(engine: CompletionEngine) -> Self {
        let pattern = format!(r"(?i)\b({})\b", HIGHLIGHT_KEYWORDS.join("|"));
        let keywords = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(error = %e, "keyword highlighting disabled");
                None
            }
        };

        Self {
            engine,
            keywords,
            highlighter: MatchingBracketHighlighter::new(),
            validator: MatchingBracketValidator::new(),
            hinter: HistoryHinter::new(),
        }
    }
}

impl Completer for SqliteHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let (start, candidates) = self.engine.complete_line(line, pos);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for SqliteHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for SqliteHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        // Brackets first: the matching bracket is located by byte offset in the raw line
        let line = self.highlighter.highlight(line, pos);
        match &self.keywords {
            Some(re) if re.is_match(&line) => {
                Cow::Owned(re.replace_all(&line, "\x1b[1m$1\x1b[0m").into_owned())
            }
            _ => line,
        }
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(format!("\x1b[1;34m{}\x1b[0m", prompt))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        let bracket = self.highlighter.highlight_char(line, pos, forced);
        bracket || self.keywords.is_some()
    }
}

impl Validator for SqliteHelper {
    fn validate(
        &self,
        ctx: &mut validate::ValidationContext,
    ) -> Result<validate::ValidationResult, ReadlineError> {
        self.validator.validate(ctx)
    }

    fn validate_while_typing(&self) -> bool {
        self.validator.validate_while_typing()
    }
}

impl rustyline::Helper for SqliteHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::metadata::SchemaCache;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn helper() -> SqliteHelper {
        let engine = CompletionEngine::new(
            Arc::new(Mutex::new(SchemaCache::new())),
            HashMap::new(),
            Vec::new(),
        );
        SqliteHelper::new(engine)
    }

    #[test]
    fn highlights_keywords_in_any_case() {
        let helper = helper();
        assert_eq!(
            helper.highlight("select x from t", 0),
            "\x1b[1mselect\x1b[0m x \x1b[1mfrom\x1b[0m t"
        );
    }

    #[test]
    fn leaves_identifiers_containing_keywords_alone() {
        let helper = helper();
        assert_eq!(helper.highlight("fromage", 0), "fromage");
    }

    #[test]
    fn highlights_bracket_matching_the_cursor() {
        let helper = helper();
        let line = "select count(x)";
        assert!(helper.highlight_char(line, line.len(), false));
        assert_eq!(
            helper.highlight(line, line.len()),
            "\x1b[1mselect\x1b[0m count\x1b[1;34m(\x1b[0mx)"
        );
    }
}
