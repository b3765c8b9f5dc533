/*!
 * SQLite CLI - completion module
 *
 * Provides cmd-style tab completion, supporting:
 * - Command names and their keyword arguments
 * - Database file names
 * - Table names and qualified column names from the schema cache
 */

pub mod engine;
pub mod helper;
pub mod metadata;

// Re-export main interfaces
pub use engine::{CompletionEngine, CompletionKind};
pub use helper::SqliteHelper;
pub use metadata::{SchemaCache, SchemaSource};
