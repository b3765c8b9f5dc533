/*!
 * Completion engine
 *
 * Core completion logic responsible for:
 * - Classifying what the word under the cursor is
 * - Collecting candidates for that classification
 * - Filtering them by the typed prefix
 */

use super::metadata::SchemaCache;
use crate::database::connection::ISOLATION_LEVELS;
use crate::logging::LOG_LEVELS;
use crate::render::OUTPUT_MODES;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Default database file suffixes offered by `use` completion.
pub const DATABASE_FILENAME_SUFFIXES: [&str; 2] = ["db", "sqlite"];

/// Characters that end the word being completed.
const WORD_BREAKS: [char; 3] = ['(', ',', ';'];

/// What kind of argument a command takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    DatabaseFile,
    OutputMode,
    LogLevel,
    IsolationLevel,
    TableName,
    /// The command takes free text; nothing is offered
    Nothing,
    /// Unrecognised input, treated as SQL
    Sql,
}

/// Input context analysis result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputContext {
    /// First word of the line
    CommandName,
    /// Argument of a known command, or SQL
    Argument(CompletionKind),
}

/// Return the candidates starting with `prefix`, keeping their input order.
/// An empty prefix returns every candidate.
pub fn complete<S: AsRef<str>>(prefix: &str, candidates: &[S]) -> Vec<String> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let candidate: &str = candidate.as_ref();
            (prefix.is_empty() || candidate.starts_with(prefix)).then(|| candidate.to_string())
        })
        .collect()
}

pub struct CompletionEngine {
    metadata: Arc<Mutex<SchemaCache>>,
    /// Registered commands, sorted, with their argument kind
    commands: Vec<(String, CompletionKind)>,
    db_suffixes: Vec<String>,
    base_dir: PathBuf,
}

impl CompletionEngine {
    pub fn new(
        metadata: Arc<Mutex<SchemaCache>>,
        commands: HashMap<String, CompletionKind>,
        db_suffixes: Vec<String>,
    ) -> Self {
        let mut commands: Vec<(String, CompletionKind)> = commands.into_iter().collect();
        commands.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            metadata,
            commands,
            db_suffixes,
            base_dir: PathBuf::from("."),
        }
    }

    /// Directory that relative database file names are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Start offset of the word ending at `pos`.
    pub fn word_start(line: &str, pos: usize) -> usize {
        line[..pos]
            .char_indices()
            .rev()
            .find(|&(_, c)| c.is_whitespace() || WORD_BREAKS.contains(&c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0)
    }

    /// Completion for the word ending at `pos`: its start offset and the candidates.
    pub fn complete_line(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let start = Self::word_start(line, pos);
        let prefix = &line[start..pos];
        let context = self.analyze_context(&line[..start]);
        (start, self.candidates(context, line, prefix))
    }

    /// Analyze everything before the word being completed
    pub fn analyze_context(&self, before_word: &str) -> InputContext {
        match before_word.split_whitespace().next() {
            None => InputContext::CommandName,
            Some(first) => InputContext::Argument(self.command_kind(first)),
        }
    }

    fn command_kind(&self, name: &str) -> CompletionKind {
        self.commands
            .iter()
            .find(|(command, _)| command == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(CompletionKind::Sql)
    }

    pub fn candidates(&self, context: InputContext, line: &str, prefix: &str) -> Vec<String> {
        match context {
            InputContext::CommandName => {
                let names: Vec<&str> = self.commands.iter().map(|(n, _)| n.as_str()).collect();
                complete(prefix, &names)
            }
            InputContext::Argument(kind) => match kind {
                CompletionKind::DatabaseFile => self.database_file_candidates(prefix),
                CompletionKind::OutputMode => complete(prefix, &OUTPUT_MODES),
                CompletionKind::LogLevel => complete(prefix, &LOG_LEVELS),
                CompletionKind::IsolationLevel => complete(prefix, &ISOLATION_LEVELS),
                CompletionKind::TableName => self.table_candidates(prefix),
                CompletionKind::Sql => self.sql_candidates(line, prefix),
                CompletionKind::Nothing => Vec::new(),
            },
        }
    }

    fn table_candidates(&self, prefix: &str) -> Vec<String> {
        // If metadata is locked, return empty suggestions
        let Ok(metadata) = self.metadata.try_lock() else {
            return Vec::new();
        };
        complete(prefix, metadata.table_names())
    }

    /// Table names, then `table.column` for every table named in the line.
    fn sql_candidates(&self, line: &str, prefix: &str) -> Vec<String> {
        let Ok(metadata) = self.metadata.try_lock() else {
            return Vec::new();
        };

        let mut candidates: Vec<String> = metadata.table_names().to_vec();
        let mut seen: Vec<&str> = Vec::new();
        for token in line.split(|c: char| c.is_whitespace() || c == ')' || WORD_BREAKS.contains(&c)) {
            if token.is_empty() || seen.contains(&token) || !metadata.contains_table(token) {
                continue;
            }
            seen.push(token);
            candidates.extend(
                metadata
                    .lookup_columns(token)
                    .into_iter()
                    .map(|column| format!("{}.{}", token, column)),
            );
        }

        complete(prefix, &candidates)
    }

    /// Directories (with a trailing `/`) and files with a database suffix, in
    /// the directory named by the prefix.
    fn database_file_candidates(&self, prefix: &str) -> Vec<String> {
        let (dir_prefix, dir) = match prefix.rfind('/') {
            Some(idx) => {
                let dir_prefix = &prefix[..=idx];
                (dir_prefix, self.base_dir.join(dir_prefix))
            }
            None => ("", self.base_dir.clone()),
        };

        let mut names = self.list_database_files(&dir);
        names.sort();
        let candidates: Vec<String> = names
            .into_iter()
            .map(|name| format!("{}{}", dir_prefix, name))
            .collect();
        complete(prefix, &candidates)
    }

    fn list_database_files(&self, dir: &Path) -> Vec<String> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(error = %e, dir = %dir.display(), "cannot list directory");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() {
                names.push(format!("{}/", name));
            } else if path.is_file()
                && self
                    .db_suffixes
                    .iter()
                    .any(|suffix| name.ends_with(suffix.as_str()))
            {
                names.push(name);
            }
        }
        names
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
