pub mod connection;
pub mod result;
pub mod statement;

pub use connection::{Database, IsolationLevel};
pub use result::{CellValue, Column, ResultSet, StatementOutcome};
pub use statement::StatementKind;
