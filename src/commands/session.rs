use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::completion::SchemaCache;
use crate::config::FormatConfig;
use crate::database::{Database, IsolationLevel};
use crate::error::{ShellError, ShellResult};
use crate::logging::{LogHandle, LogLevel};
use crate::render::OutputMode;

/// State of one interactive session. Everything here is only touched between
/// commands.
pub struct Session {
    database: Option<Database>,
    metadata: Arc<Mutex<SchemaCache>>,
    pub mode: OutputMode,
    pub formats: FormatConfig,
    pub isolation_level: IsolationLevel,
    pub log_level: LogLevel,
    log_handle: Option<LogHandle>,
}

impl Session {
    pub fn new(metadata: Arc<Mutex<SchemaCache>>, formats: FormatConfig) -> Self {
        Self {
            database: None,
            metadata,
            mode: OutputMode::default(),
            formats,
            isolation_level: IsolationLevel::default(),
            log_level: LogLevel::Info,
            log_handle: None,
        }
    }

    pub fn with_log_handle(mut self, handle: LogHandle) -> Self {
        self.log_level = handle.initial_level();
        self.log_handle = Some(handle);
        self
    }

    pub fn metadata(&self) -> Arc<Mutex<SchemaCache>> {
        self.metadata.clone()
    }

    /// The live connection, or `NoActiveConnection`.
    pub fn database(&self) -> ShellResult<&Database> {
        self.database.as_ref().ok_or_else(|| {
            tracing::info!("Use 'use FILENAME' to initialise/setup a connection.");
            ShellError::NoActiveConnection
        })
    }

    pub fn database_name(&self) -> Option<String> {
        self.database.as_ref().map(|db| {
            db.path()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| db.path().display().to_string())
        })
    }

    /// Open `path`, replacing any previous connection.
    pub fn open(&mut self, path: &Path) -> ShellResult<()> {
        self.disconnect();
        let database = Database::open(path)?;
        self.attach(database)
    }

    /// Make `database` the active connection and load its schema.
    pub fn attach(&mut self, database: Database) -> ShellResult<()> {
        self.disconnect();
        tracing::debug!("Connected to database '{}'.", database.path().display());
        tracing::debug!("SQLiteVersion is '{}'.", database.sqlite_version());
        self.database = Some(database);
        self.refresh_schema()
    }

    pub fn disconnect(&mut self) {
        if let Some(database) = self.database.take() {
            tracing::debug!("Closing database '{}'.", database.path().display());
        }
        self.invalidate_schema();
    }

    pub fn refresh_schema(&self) -> ShellResult<()> {
        let database = self.database()?;
        let mut cache = self.lock_metadata();
        cache.refresh(database)
    }

    /// Drop the whole schema cache; it stays empty until the next refresh.
    pub fn invalidate_schema(&self) {
        self.lock_metadata().clear();
    }

    pub fn lookup_columns(&self, table: &str) -> Vec<String> {
        self.lock_metadata().lookup_columns(table)
    }

    pub fn set_log_level(&mut self, level: LogLevel) -> ShellResult<()> {
        if let Some(handle) = &self.log_handle {
            handle.set_level(level)?;
        }
        self.log_level = level;
        Ok(())
    }

    fn lock_metadata(&self) -> std::sync::MutexGuard<'_, SchemaCache> {
        self.metadata
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
