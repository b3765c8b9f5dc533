/*!
 * Command dispatch
 *
 * Every input line is either a meta-command looked up in the registry, or
 * raw SQL handed to the query executor.
 */

pub mod meta;
pub mod query;
pub mod session;

use std::collections::HashMap;
use std::io::Write;

use crate::completion::CompletionKind;
use crate::error::ShellResult;

pub use query::QueryExecutor;
pub use session::Session;

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub type Handler = fn(&mut Session, &str, &mut dyn Write) -> ShellResult<Flow>;

#[derive(Clone, Copy)]
enum Action {
    Run(Handler),
    Help,
}

pub struct Command {
    pub usage: &'static str,
    pub help: &'static str,
    pub completion: CompletionKind,
    action: Action,
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, Command>,
    query_executor: QueryExecutor,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
            query_executor: QueryExecutor::new(),
        };

        registry.register(
            "use",
            "use [DATABASE FILE NAME]",
            "Opens the given SQLite database file. use <TAB><TAB> lists database files (*.db, *.sqlite) and directories.",
            CompletionKind::DatabaseFile,
            Action::Run(meta::use_database),
        );
        registry.register(
            "mode",
            "mode [MODE]",
            "Set output mode to MODE. Without MODE the actual mode is shown. mode <TAB><TAB> lists all available modes.",
            CompletionKind::OutputMode,
            Action::Run(meta::mode),
        );
        registry.register(
            "cfg_table_column",
            "cfg_table_column [COLUMN] [MAX_WIDTH] [MIN_WIDTH] [TRUNCATE_LINE] | cfg_table_column DEL COLUMN",
            "Sets formatting parameters of output mode TABLE for a single column. Without parameters the actual configuration is shown. TRUNCATE_LINE is True/False/Yes/No. All parameters from right to left are optional.",
            CompletionKind::Nothing,
            Action::Run(meta::cfg_table_column),
        );
        registry.register(
            "sys_update_table_names",
            "sys_update_table_names",
            "Update the cache of table and column names.",
            CompletionKind::Nothing,
            Action::Run(meta::sys_update_table_names),
        );
        registry.register(
            "show_column_names",
            "show_column_names TABLE",
            "Print the cached column names of TABLE.",
            CompletionKind::TableName,
            Action::Run(meta::show_column_names),
        );
        registry.register(
            "loglevel",
            "loglevel [LEVEL]",
            "Get/Set loglevel.",
            CompletionKind::LogLevel,
            Action::Run(meta::loglevel),
        );
        registry.register(
            "isolation_level",
            "isolation_level [LEVEL]",
            "Sets the database isolation level to LEVEL. Without LEVEL the actual isolation level is shown.",
            CompletionKind::IsolationLevel,
            Action::Run(meta::isolation_level),
        );
        registry.register(
            "commit",
            "commit",
            "Commit actual transaction.",
            CompletionKind::Nothing,
            Action::Run(meta::commit),
        );
        registry.register(
            "rollback",
            "rollback",
            "Rollback actual transaction.",
            CompletionKind::Nothing,
            Action::Run(meta::rollback),
        );
        registry.register(
            "shell",
            "shell COMMAND | !COMMAND",
            "Run a command in your shell.",
            CompletionKind::Nothing,
            Action::Run(meta::shell),
        );
        registry.register(
            "help",
            "help [COMMAND] | ?",
            "List commands, or show help for COMMAND.",
            CompletionKind::Nothing,
            Action::Help,
        );
        for name in ["quit", "exit", "EOF"] {
            registry.register(
                name,
                name,
                "Exit shell.",
                CompletionKind::Nothing,
                Action::Run(meta::quit),
            );
        }

        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        usage: &'static str,
        help: &'static str,
        completion: CompletionKind,
        action: Action,
    ) {
        self.commands.insert(
            name,
            Command {
                usage,
                help,
                completion,
                action,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Command names with the kind of argument each one completes.
    pub fn completion_kinds(&self) -> HashMap<String, CompletionKind> {
        self.commands
            .iter()
            .map(|(name, command)| (name.to_string(), command.completion))
            .collect()
    }

    /// Run one input line.
    pub fn dispatch(&self, session: &mut Session, line: &str, out: &mut dyn Write) -> ShellResult<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (name, arg) = if let Some(rest) = line.strip_prefix('!') {
            ("shell", rest.trim())
        } else if let Some(rest) = line.strip_prefix('?') {
            ("help", rest.trim())
        } else {
            match line.split_once(char::is_whitespace) {
                Some((name, rest)) => (name, rest.trim()),
                None => (line, ""),
            }
        };

        match self.commands.get(name).map(|command| command.action) {
            Some(Action::Run(handler)) => handler(session, arg, out),
            Some(Action::Help) => {
                self.show_help(arg, out)?;
                Ok(Flow::Continue)
            }
            None => {
                self.query_executor.execute(session, line, out)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn show_help(&self, topic: &str, out: &mut dyn Write) -> ShellResult<()> {
        if topic.is_empty() {
            let mut names: Vec<&str> = self.commands.keys().copied().collect();
            names.sort();
            writeln!(out, "Documented commands (type help <topic>):")?;
            writeln!(out, "{}", names.join("  "))?;
            writeln!(out, "Anything else is executed as SQL.")?;
            return Ok(());
        }

        match self.commands.get(topic) {
            Some(command) => {
                writeln!(out, ">> {}", command.usage)?;
                writeln!(out, "   {}", command.help)?;
            }
            None => writeln!(out, "No help on {}", topic)?,
        }
        Ok(())
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::SchemaCache;
    use crate::config::FormatConfig;
    use crate::database::{Database, IsolationLevel};
    use crate::error::ShellError;
    use crate::logging::LogLevel;
    use crate::render::OutputMode;
    use std::sync::{Arc, Mutex};

    fn new_session() -> Session {
        Session::new(Arc::new(Mutex::new(SchemaCache::new())), FormatConfig::default())
    }

    fn connected_session() -> Session {
        let mut session = new_session();
        session.attach(Database::open_in_memory().unwrap()).unwrap();
        session
    }

    fn run(registry: &CommandRegistry, session: &mut Session, line: &str) -> (ShellResult<Flow>, String) {
        let mut out = Vec::new();
        let result = registry.dispatch(session, line, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn run_ok(registry: &CommandRegistry, session: &mut Session, line: &str) -> String {
        let (result, output) = run(registry, session, line);
        assert_eq!(result.unwrap(), Flow::Continue, "line {:?}", line);
        output
    }

    #[test]
    fn renders_query_results_as_table() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        run_ok(&registry, &mut session, "CREATE TABLE t (id INTEGER, name TEXT)");
        run_ok(&registry, &mut session, "INSERT INTO t VALUES (1, 'a'), (2, 'bb')");
        let output = run_ok(&registry, &mut session, "SELECT id, name FROM t ORDER BY id");
        assert_eq!(
            output,
            "===========\n| id| name|\n+---+-----+\n|  1| a   |\n|  2| bb  |\n===========\n"
        );
    }

    #[test]
    fn line_mode_and_empty_results() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        run_ok(&registry, &mut session, "CREATE TABLE t (id INTEGER, name TEXT)");
        run_ok(&registry, &mut session, "mode line");
        assert_eq!(session.mode, OutputMode::Line);
        assert_eq!(run_ok(&registry, &mut session, "SELECT * FROM t"), "");
        run_ok(&registry, &mut session, "INSERT INTO t VALUES (7, NULL)");
        assert_eq!(
            run_ok(&registry, &mut session, "SELECT * FROM t"),
            "id   :7\nname :NULL\n\n"
        );
    }

    #[test]
    fn unknown_mode_reports_one_error_and_session_continues() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        assert_eq!(run_ok(&registry, &mut session, "mode XML"), "");
        let (result, output) = run(&registry, &mut session, "SELECT 1 AS x");
        assert!(matches!(result, Err(ShellError::UnknownRenderMode(name)) if name == "XML"));
        assert_eq!(output, "");
        assert_eq!(run_ok(&registry, &mut session, "mode"), "Actual mode is XML.\n");
        run_ok(&registry, &mut session, "mode TABLE");
        assert!(!run_ok(&registry, &mut session, "SELECT 1 AS x").is_empty());
    }

    #[test]
    fn csv_mode_is_declared_but_not_rendered() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        run_ok(&registry, &mut session, "mode csv");
        let (result, output) = run(&registry, &mut session, "SELECT 1");
        assert!(matches!(result, Err(ShellError::UnknownRenderMode(name)) if name == "CSV"));
        assert!(output.is_empty());
    }

    #[test]
    fn operations_without_connection_are_declined() {
        let registry = CommandRegistry::new();
        let mut session = new_session();
        for line in [
            "SELECT 1",
            "sys_update_table_names",
            "isolation_level DEFERRED",
            "commit",
            "rollback",
        ] {
            let (result, _) = run(&registry, &mut session, line);
            assert!(
                matches!(result, Err(ShellError::NoActiveConnection)),
                "line {:?}",
                line
            );
        }
        assert_eq!(session.isolation_level, IsolationLevel::Autocommit);
    }

    #[test]
    fn failed_statement_keeps_session_usable() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        let (result, _) = run(&registry, &mut session, "SELEC 1");
        assert!(matches!(result, Err(ShellError::Statement(_))));
        assert_eq!(run_ok(&registry, &mut session, "SELECT 2 AS two"), "======\n| two|\n+----+\n|   2|\n======\n");
    }

    #[test]
    fn failed_statement_rolls_back_open_transaction() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        run_ok(&registry, &mut session, "CREATE TABLE t (id INTEGER PRIMARY KEY)");
        run_ok(&registry, &mut session, "isolation_level DEFERRED");
        run_ok(&registry, &mut session, "INSERT INTO t VALUES (1)");
        assert!(!session.database().unwrap().is_autocommit());
        let (result, _) = run(&registry, &mut session, "INSERT INTO t VALUES (1)");
        assert!(result.is_err());
        assert!(session.database().unwrap().is_autocommit());
        run_ok(&registry, &mut session, "mode line");
        assert_eq!(run_ok(&registry, &mut session, "SELECT count(*) AS n FROM t"), "n :0\n\n");
    }

    #[test]
    fn commit_persists_transaction() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        run_ok(&registry, &mut session, "CREATE TABLE t (id INTEGER)");
        run_ok(&registry, &mut session, "isolation_level IMMEDIATE");
        assert_eq!(
            run_ok(&registry, &mut session, "isolation_level"),
            "Actual isolation_level is IMMEDIATE\n"
        );
        run_ok(&registry, &mut session, "INSERT INTO t VALUES (1)");
        run_ok(&registry, &mut session, "commit");
        assert!(session.database().unwrap().is_autocommit());
        run_ok(&registry, &mut session, "rollback");
        run_ok(&registry, &mut session, "mode line");
        assert_eq!(run_ok(&registry, &mut session, "SELECT count(*) AS n FROM t"), "n :1\n\n");
    }

    #[test]
    fn ddl_invalidates_cache_until_refresh() {
        let registry = CommandRegistry::new();
        let mut session = connected_session();
        let metadata = session.metadata();
        assert!(metadata.lock().unwrap().is_populated());

        run_ok(&registry, &mut session, "CREATE TABLE zeta (z TEXT)");
        assert!(!metadata.lock().unwrap().is_populated());
        assert_eq!(run_ok(&registry, &mut session, "show_column_names zeta"), "");

        run_ok(&registry, &mut session, "CREATE TABLE alpha (a INTEGER, b TEXT)");
        run_ok(&registry, &mut session, "sys_update_table_names");
        assert_eq!(metadata.lock().unwrap().table_names(), ["alpha", "zeta"]);
        assert_eq!(run_ok(&registry, &mut session, "show_column_names alpha"), "a\nb\n");
    }

    #[test]
    fn use_opens_file_and_loads_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        {
            let db = Database::open(&path).unwrap();
            db.execute("CREATE TABLE orders (id INTEGER, total REAL)").unwrap();
            db.execute("CREATE VIEW big AS SELECT id FROM orders WHERE total > 100").unwrap();
        }

        let registry = CommandRegistry::new();
        let mut session = new_session();
        run_ok(&registry, &mut session, &format!("use {}", path.display()));
        assert_eq!(session.database_name().as_deref(), Some("shop.db"));
        assert_eq!(
            session.metadata().lock().unwrap().table_names(),
            ["big", "orders"]
        );

        // Reconnecting to another file drops the old schema
        let other = dir.path().join("empty.sqlite");
        run_ok(&registry, &mut session, &format!("use {}", other.display()));
        assert!(session.metadata().lock().unwrap().table_names().is_empty());
        assert!(session.lookup_columns("orders").is_empty());
    }

    #[test]
    fn use_loads_schema_despite_view_over_dropped_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.db");
        {
            let db = Database::open(&path).unwrap();
            db.execute("CREATE TABLE users (id INTEGER, name TEXT)").unwrap();
            db.execute("CREATE TABLE base (x INTEGER)").unwrap();
            db.execute("CREATE VIEW stale AS SELECT x FROM base").unwrap();
            db.execute("DROP TABLE base").unwrap();
        }

        let registry = CommandRegistry::new();
        let mut session = new_session();
        run_ok(&registry, &mut session, &format!("use {}", path.display()));
        assert_eq!(
            session.metadata().lock().unwrap().table_names(),
            ["stale", "users"]
        );
        assert_eq!(run_ok(&registry, &mut session, "show_column_names users"), "id\nname\n");
        assert_eq!(run_ok(&registry, &mut session, "show_column_names stale"), "");

        run_ok(&registry, &mut session, "sys_update_table_names");
        assert!(session.metadata().lock().unwrap().contains_table("users"));
    }

    #[test]
    fn use_without_file_name_is_rejected() {
        let registry = CommandRegistry::new();
        let mut session = new_session();
        let (result, _) = run(&registry, &mut session, "use");
        assert!(matches!(result, Err(ShellError::InvalidParameter(_))));
    }

    #[test]
    fn cfg_table_column_set_show_and_delete() {
        let registry = CommandRegistry::new();
        let mut session = new_session();
        run_ok(&registry, &mut session, "cfg_table_column name 20 5 yes");
        let (result, _) = run(&registry, &mut session, "cfg_table_column 2 abc 5 maybe");
        assert!(matches!(result, Err(ShellError::InvalidParameter(_))));

        let entry = session.formats.table.columns.get("2").unwrap();
        assert_eq!(entry.max_width, None);
        assert_eq!(entry.min_width, Some(5));
        assert_eq!(entry.truncate, None);

        let listing = run_ok(&registry, &mut session, "cfg_table_column");
        assert!(listing.starts_with("Configuration for Outputformat TABLE:\nMaximum Table Width: 80\n"));
        assert!(listing.contains("Column Configurations:"));
        assert!(listing.contains("name"));
        assert!(listing.contains("unset"));

        run_ok(&registry, &mut session, "cfg_table_column del name");
        assert!(session.formats.table.columns.get("name").is_none());
        let (result, _) = run(&registry, &mut session, "cfg_table_column DEL name");
        assert!(result.is_err());
        let (result, _) = run(&registry, &mut session, "cfg_table_column DEL");
        assert!(result.is_err());
    }

    #[test]
    fn loglevel_get_and_set() {
        let registry = CommandRegistry::new();
        let mut session = new_session();
        assert_eq!(run_ok(&registry, &mut session, "loglevel"), "Actual loglevel is INFO\n");
        run_ok(&registry, &mut session, "loglevel DEBUG");
        assert_eq!(session.log_level, LogLevel::Debug);
        let (result, _) = run(&registry, &mut session, "loglevel LOUD");
        assert!(result.is_err());
        assert_eq!(session.log_level, LogLevel::Debug);
    }

    #[test]
    fn loglevel_reports_the_startup_filter() {
        let handle = crate::logging::init("debug");
        let expected = match std::env::var("RUST_LOG") {
            Ok(filter) if tracing_subscriber::EnvFilter::try_new(&filter).is_ok() => {
                LogLevel::from_filter(&filter)
            }
            _ => LogLevel::Debug,
        };
        let registry = CommandRegistry::new();
        let mut session = new_session().with_log_handle(handle);
        assert_eq!(
            run_ok(&registry, &mut session, "loglevel"),
            format!("Actual loglevel is {}\n", expected)
        );
    }

    #[test]
    fn help_lists_and_describes_commands() {
        let registry = CommandRegistry::new();
        let mut session = new_session();
        let listing = run_ok(&registry, &mut session, "help");
        assert!(listing.contains("cfg_table_column"));
        assert!(listing.contains("sys_update_table_names"));
        let topic = run_ok(&registry, &mut session, "? mode");
        assert!(topic.starts_with(">> mode [MODE]\n"));
        assert_eq!(run_ok(&registry, &mut session, "help nope"), "No help on nope\n");
    }

    #[test]
    fn shell_escape_prints_stdout() {
        let registry = CommandRegistry::new();
        let mut session = new_session();
        assert_eq!(run_ok(&registry, &mut session, "!echo hello"), "hello\n");
        assert_eq!(run_ok(&registry, &mut session, "shell echo again"), "again\n");
    }

    #[test]
    fn quit_commands_end_the_loop() {
        let registry = CommandRegistry::new();
        for line in ["quit", "exit", "EOF"] {
            let mut session = connected_session();
            let (result, _) = run(&registry, &mut session, line);
            assert_eq!(result.unwrap(), Flow::Quit);
            assert!(session.database_name().is_none());
        }
    }

    #[test]
    fn registry_exposes_completion_kinds() {
        let registry = CommandRegistry::new();
        let kinds = registry.completion_kinds();
        assert_eq!(kinds["use"], CompletionKind::DatabaseFile);
        assert_eq!(kinds["mode"], CompletionKind::OutputMode);
        assert_eq!(kinds["show_column_names"], CompletionKind::TableName);
        assert!(registry.get("select").is_none());
    }
}
