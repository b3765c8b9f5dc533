/*!
 * Schema metadata cache
 *
 * Local copy of the table/view names and their columns, used by completion:
 * - table names are kept sorted and free of duplicates
 * - refresh always rebuilds the whole cache
 * - clear on reconnect or after a schema change
 */

use std::collections::HashMap;

use crate::error::ShellResult;

/// Schema introspection the cache needs from the database store.
pub trait SchemaSource {
    /// Names of all tables and views.
    fn object_names(&self) -> ShellResult<Vec<String>>;
    /// Ordered column names of one table or view.
    fn column_names(&self, table: &str) -> ShellResult<Vec<String>>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchemaCache {
    /// Sorted ascending, byte-wise
    table_names: Vec<String>,
    /// Table name -> ordered column names
    columns_by_table: HashMap<String, Vec<String>>,
    populated: bool,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the cache from `source`. If the object names cannot be read the
    /// previous contents stay; an object whose columns cannot be read (a view
    /// over a dropped table, say) is cached without columns.
    pub fn refresh(&mut self, source: &dyn SchemaSource) -> ShellResult<()> {
        let mut table_names = source.object_names()?;
        table_names.sort();
        table_names.dedup();

        let mut columns_by_table = HashMap::with_capacity(table_names.len());
        for table in &table_names {
            let columns = source.column_names(table).unwrap_or_else(|e| {
                tracing::warn!(table = %table, error = %e, "cannot read columns");
                Vec::new()
            });
            columns_by_table.insert(table.clone(), columns);
        }

        tracing::debug!(tables = table_names.len(), "schema cache refreshed");

        self.table_names = table_names;
        self.columns_by_table = columns_by_table;
        self.populated = true;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.table_names.clear();
        self.columns_by_table.clear();
        self.populated = false;
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn table_names(&self) -> &[String] {
        &self.table_names
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.table_names
            .binary_search_by(|name| name.as_str().cmp(table))
            .is_ok()
    }

    /// Columns of `table`, empty when unknown.
    pub fn lookup_columns(&self, table: &str) -> Vec<String> {
        self.columns_by_table
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}
