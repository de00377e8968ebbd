//! Lazily populated, thread-safe column metadata cache
//!
//! The first lookup of a table fetches all of its columns from the
//! [`MetadataProvider`] in one call; every later lookup is served from memory.
//! Population is serialized per table, so concurrent first lookups of the same
//! table result in a single provider call while lookups of other tables
//! proceed independently. Failed fetches are not cached, and leave no entry
//! behind for the table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::error::SchemaLookupError;
use super::schema::{ColumnDescribe, MetadataProvider};
use crate::ast::AttributeRef;

/// Column name to column metadata for one table
pub type TableColumns = HashMap<String, ColumnDescribe>;

type TableSlot = Arc<Mutex<Option<Arc<TableColumns>>>>;

pub struct SchemaCache {
    provider: Box<dyn MetadataProvider>,
    tables: DashMap<String, TableSlot>,
}

impl SchemaCache {
    pub fn new(provider: impl MetadataProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            tables: DashMap::new(),
        }
    }

    /// All columns of `table`, fetching them on first use
    pub fn columns_for(&self, table: &str) -> Result<Arc<TableColumns>, SchemaLookupError> {
        let slot = self.slot(table);
        let mut entry = slot.lock();

        if let Some(columns) = &*entry {
            trace!(table, "schema cache hit");
            return Ok(Arc::clone(columns));
        }

        debug!(table, "schema cache miss, fetching columns");
        let fetched = match self.provider.list_columns(table) {
            Ok(fetched) => fetched,
            Err(err) => {
                debug!(table, error = %err, "column fetch failed");
                self.tables
                    .remove_if(table, |_, current| Arc::ptr_eq(current, &slot));
                return Err(err);
            }
        };

        let columns: Arc<TableColumns> = Arc::new(
            fetched
                .into_iter()
                .map(|column| (column.name.clone(), column))
                .collect(),
        );
        debug!(table, columns = columns.len(), "cached table columns");
        *entry = Some(Arc::clone(&columns));
        // a waiter on a slot dropped by a failed fetch re-registers it
        self.tables
            .entry(table.to_string())
            .or_insert_with(|| Arc::clone(&slot));
        Ok(columns)
    }

    /// Metadata for the column `attribute` refers to, or `None` if the table
    /// has no such column
    pub fn column_for(
        &self,
        attribute: &AttributeRef,
    ) -> Result<Option<ColumnDescribe>, SchemaLookupError> {
        let columns = self.columns_for(attribute.table())?;
        Ok(columns.get(attribute.column()).cloned())
    }

    /// Whether `table` has been fetched successfully
    pub fn is_cached(&self, table: &str) -> bool {
        let slot = self.tables.get(table).map(|slot| Arc::clone(slot.value()));
        slot.map(|slot| slot.lock().is_some()).unwrap_or(false)
    }

    /// Number of tables fetched successfully
    pub fn cached_tables(&self) -> usize {
        // slot locks are never taken while a map shard is held
        let slots: Vec<TableSlot> = self
            .tables
            .iter()
            .map(|slot| Arc::clone(slot.value()))
            .collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    fn slot(&self, table: &str) -> TableSlot {
        if let Some(slot) = self.tables.get(table) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.tables.entry(table.to_string()).or_default().value())
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("cached_tables", &self.cached_tables())
            .finish_non_exhaustive()
    }
}
