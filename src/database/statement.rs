use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Coarse classification of a SQL statement, used to decide whether the
/// schema cache goes stale and whether an implicit transaction is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Changes the schema (CREATE / ALTER / DROP).
    Ddl,
    /// Changes rows (INSERT / UPDATE / DELETE / REPLACE).
    Dml,
    Other,
}

impl StatementKind {
    pub fn classify(sql: &str) -> Self {
        match Parser::parse_sql(&SQLiteDialect {}, sql) {
            Ok(statements) if !statements.is_empty() => {
                // The shell only forwards one statement at a time; the first decides.
                Self::from_statement(&statements[0])
            }
            // sqlparser does not cover every SQLite extension; fall back to the leading keyword.
            _ => Self::from_keyword(sql),
        }
    }

    fn from_statement(statement: &Statement) -> Self {
        match statement {
            Statement::CreateTable { .. }
            | Statement::CreateVirtualTable { .. }
            | Statement::CreateView { .. }
            | Statement::CreateIndex { .. }
            | Statement::AlterTable { .. }
            | Statement::Drop { .. } => StatementKind::Ddl,
            Statement::Insert { .. } | Statement::Update { .. } | Statement::Delete { .. } => {
                StatementKind::Dml
            }
            _ => StatementKind::Other,
        }
    }

    fn from_keyword(sql: &str) -> Self {
        let first = sql
            .split_whitespace()
            .next()
            .map(|w| w.to_uppercase())
            .unwrap_or_default();
        match first.as_str() {
            "CREATE" | "ALTER" | "DROP" => StatementKind::Ddl,
            "INSERT" | "UPDATE" | "DELETE" | "REPLACE" => StatementKind::Dml,
            _ => StatementKind::Other,
        }
    }
}
