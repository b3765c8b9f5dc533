use crate::commands::{CommandRegistry, Flow, Session};
use crate::completion::{CompletionEngine, SchemaCache, SqliteHelper};
use crate::config::FormatConfig;
use crate::logging::LogHandle;
use crate::render::{OutputMode, Theme};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::{history::DefaultHistory, CompletionType, Config, Editor};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const INTRO_TEXT: &str = "
Welcome to a better(?) SQLite shell.

   help or ?  : for documentation
   shell or ! : Run a command in your shell.
                like: \"!ls -la\"
";

/// Startup options collected from the command line.
pub struct Options {
    pub database: Option<PathBuf>,
    pub mode: OutputMode,
    pub max_width: usize,
    pub db_suffixes: Vec<String>,
    pub history: Option<PathBuf>,
    pub color: bool,
}

pub struct Cli {
    registry: CommandRegistry,
    session: Session,
    editor: Editor<SqliteHelper, DefaultHistory>,
    history: Option<PathBuf>,
}

impl Cli {
    pub fn new(options: Options, log_handle: LogHandle) -> Result<Self> {
        let registry = CommandRegistry::new();

        // 创建共享的数据库元数据
        let metadata = Arc::new(Mutex::new(SchemaCache::new()));
        let mut session = Session::new(metadata.clone(), FormatConfig::new(options.max_width))
            .with_log_handle(log_handle);
        session.mode = options.mode;
        if options.color {
            session.formats.theme = Theme::COLORED;
        }

        // 配置 rustyline 编辑器
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(true)
            .edit_mode(rustyline::EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(config)?;
        let engine = CompletionEngine::new(metadata, registry.completion_kinds(), options.db_suffixes);
        editor.set_helper(Some(SqliteHelper::new(engine)));

        if let Some(path) = &options.history {
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(error = %e, path = %path.display(), "no history loaded");
            }
        }

        if let Some(path) = &options.database {
            if let Err(e) = session.open(path) {
                tracing::error!("{}", e);
            }
        }

        Ok(Self {
            registry,
            session,
            editor,
            history: options.history,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", INTRO_TEXT);

        loop {
            let prompt = self.get_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if self.execute(&line) == Flow::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    self.execute("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("{:?}", err);
                    break;
                }
            }
        }

        self.save_history();
        Ok(())
    }

    /// Run `;`-separated commands without entering the interactive loop.
    pub fn run_batch(&mut self, commands: &str) -> Result<()> {
        for command in commands.split(';') {
            if command.trim().is_empty() {
                continue;
            }
            if self.execute(command) == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Errors are reported and swallowed; only quit commands end the session.
    fn execute(&mut self, line: &str) -> Flow {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let flow = match self.registry.dispatch(&mut self.session, line, &mut out) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::error!("{}", e);
                Flow::Continue
            }
        };
        let _ = out.flush();
        flow
    }

    fn get_prompt(&self) -> String {
        match self.session.database_name() {
            Some(db) => format!("sqlite [{}]> ", db),
            None => "sqlite> ".to_string(),
        }
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!(error = %e, path = %path.display(), "failed to save history");
            }
        }
    }
}
