use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use super::result::{CellValue, Column, ResultSet, StatementOutcome};
use crate::completion::metadata::SchemaSource;
use crate::error::{ShellError, ShellResult};

/// Isolation levels accepted by the `isolation_level` command.
pub const ISOLATION_LEVELS: [&str; 4] = ["DEFERRED", "IMMEDIATE", "EXCLUSIVE", "Autocommit"];

const SQL_GET_OBJECT_NAMES: &str =
    "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') ORDER BY name";
const SQL_GET_COLUMN_NAMES: &str = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    Deferred,
    Immediate,
    Exclusive,
    #[default]
    Autocommit,
}

impl IsolationLevel {
    pub fn parse(name: &str) -> ShellResult<Self> {
        match name {
            "DEFERRED" => Ok(IsolationLevel::Deferred),
            "IMMEDIATE" => Ok(IsolationLevel::Immediate),
            "EXCLUSIVE" => Ok(IsolationLevel::Exclusive),
            "Autocommit" => Ok(IsolationLevel::Autocommit),
            other => Err(ShellError::InvalidParameter(format!(
                "unknown isolation_level: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ISOLATION_LEVELS[*self as usize])
    }
}

pub struct Database {
    conn: Connection,
    path: PathBuf,
    sqlite_version: String,
}

impl Database {
    pub fn open(path: &Path) -> ShellResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| ShellError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn, path.to_path_buf())
    }

    #[cfg(test)]
    pub fn open_in_memory() -> ShellResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, PathBuf::from(":memory:"))
    }

    fn from_connection(conn: Connection, path: PathBuf) -> ShellResult<Self> {
        let sqlite_version: String =
            conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(Self {
            conn,
            path,
            sqlite_version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sqlite_version(&self) -> &str {
        &self.sqlite_version
    }

    /// Run one statement. Row-producing statements are fully collected.
    pub fn execute(&self, sql: &str) -> ShellResult<StatementOutcome> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();

        if column_count == 0 {
            let changed = stmt.execute([])?;
            return Ok(StatementOutcome::Changed(changed));
        }

        let columns: Vec<Column> = stmt.column_names().into_iter().map(Column::new).collect();
        let mut result = ResultSet::with_columns(columns);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(cell_value(row.get_ref(i)?));
            }
            result.push_row(cells)?;
        }

        Ok(StatementOutcome::Rows(result))
    }

    /// True while no transaction is open.
    pub fn is_autocommit(&self) -> bool {
        self.conn.is_autocommit()
    }

    pub fn begin(&self, level: IsolationLevel) -> ShellResult<()> {
        let sql = match level {
            IsolationLevel::Deferred => "BEGIN DEFERRED",
            IsolationLevel::Immediate => "BEGIN IMMEDIATE",
            IsolationLevel::Exclusive => "BEGIN EXCLUSIVE",
            IsolationLevel::Autocommit => return Ok(()),
        };
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn commit(&self) -> ShellResult<()> {
        if !self.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    pub fn rollback(&self) -> ShellResult<()> {
        if !self.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

impl SchemaSource for Database {
    fn object_names(&self) -> ShellResult<Vec<String>> {
        let mut stmt = self.conn.prepare(SQL_GET_OBJECT_NAMES)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn column_names(&self, table: &str) -> ShellResult<Vec<String>> {
        let mut stmt = self.conn.prepare(SQL_GET_COLUMN_NAMES)?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

fn cell_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(r) => CellValue::Real(r),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
    }
}
