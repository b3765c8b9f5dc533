use std::io::Write;
use std::time::Instant;

use super::session::Session;
use crate::database::{IsolationLevel, StatementKind, StatementOutcome};
use crate::error::ShellResult;
use crate::render;

/// Forwards raw SQL to the database and renders any rows it returns.
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        QueryExecutor
    }

    pub fn execute(&self, session: &Session, sql: &str, out: &mut dyn Write) -> ShellResult<()> {
        // Check if query is empty
        if sql.trim().is_empty() {
            return Ok(());
        }

        let database = session.database()?;
        let kind = StatementKind::classify(sql);

        if kind == StatementKind::Dml
            && session.isolation_level != IsolationLevel::Autocommit
            && database.is_autocommit()
        {
            database.begin(session.isolation_level)?;
        }

        let start_time = Instant::now();
        let outcome = match database.execute(sql) {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(rollback_err) = database.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback after failed command failed");
                }
                return Err(e);
            }
        };
        let duration = start_time.elapsed();

        if kind == StatementKind::Ddl {
            session.invalidate_schema();
            tracing::info!("Schema changed, run 'sys_update_table_names' to refresh completion.");
        }

        match outcome {
            StatementOutcome::Changed(count) => {
                tracing::debug!(
                    "Total number of rows updated: {} ({:.3} sec)",
                    count,
                    duration.as_secs_f64()
                );
            }
            StatementOutcome::Rows(result) => {
                tracing::debug!(
                    "Result lines count is {} ({:.3} sec)",
                    result.rows().len(),
                    duration.as_secs_f64()
                );
                if !result.is_empty() {
                    for line in render::render(&result, &session.mode, &session.formats)? {
                        writeln!(out, "{}", line)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}
