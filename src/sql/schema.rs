//! Table and column metadata, and the provider seam the schema cache reads from

use std::collections::HashMap;
use std::sync::Arc;

use super::error::SchemaLookupError;

/// Source of column metadata, typically backed by a database catalog
pub trait MetadataProvider: Send + Sync {
    /// Describe every column of `table`, in declaration order
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescribe>, SchemaLookupError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Arc<P> {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescribe>, SchemaLookupError> {
        (**self).list_columns(table)
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Box<P> {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescribe>, SchemaLookupError> {
        (**self).list_columns(table)
    }
}

/// Declared type of a column, as far as literal quoting cares
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Decimal,
    Text,
    Boolean,
    Date,
    Timestamp,
    Time,
    Binary,
    Json,
    Other,
}

impl ColumnType {
    /// Map a declared SQL type name (`VARCHAR(255)`, `BIGINT`, `NUMERIC(10,2)`)
    /// to a column type
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or("").trim();

        match base {
            "BOOLEAN" | "BOOL" => return ColumnType::Boolean,
            "DATE" => return ColumnType::Date,
            "DATETIME" => return ColumnType::Timestamp,
            "TIME" | "TIMETZ" => return ColumnType::Time,
            "NUMERIC" | "DECIMAL" | "MONEY" => return ColumnType::Decimal,
            "SERIAL" | "BIGSERIAL" | "SMALLSERIAL" => return ColumnType::Integer,
            "JSON" | "JSONB" => return ColumnType::Json,
            "UUID" | "CITEXT" => return ColumnType::Text,
            "INTERVAL" => return ColumnType::Other,
            _ => {}
        }

        if base.starts_with("TIMESTAMP") {
            ColumnType::Timestamp
        } else if base.starts_with("TIME ") {
            ColumnType::Time
        } else if base.contains("INT") {
            ColumnType::Integer
        } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
            ColumnType::Text
        } else if base.contains("BLOB") || base.contains("BYTEA") || base.contains("BINARY") {
            ColumnType::Binary
        } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
            ColumnType::Float
        } else {
            ColumnType::Other
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Text)
    }
}

/// Metadata for a single column
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescribe {
    pub name: String,
    pub column_type: ColumnType,
    /// Type name as declared in the catalog, if known
    pub declared_type: Option<String>,
    pub nillable: bool,
    pub default: Option<String>,
}

impl ColumnDescribe {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            declared_type: None,
            nillable: true,
            default: None,
        }
    }

    /// Create a column from its declared SQL type name
    pub fn declared(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let declared_type = declared_type.into();
        let mut column = Self::new(name, ColumnType::from_declared(&declared_type));
        column.declared_type = Some(declared_type);
        column
    }

    pub fn with_nillable(mut self, nillable: bool) -> Self {
        self.nillable = nillable;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Description of a table and its columns
#[derive(Debug, Clone)]
pub struct TableDescribe {
    pub name: String,
    columns: Vec<ColumnDescribe>,
}

impl TableDescribe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column, replacing any earlier column of the same name
    pub fn add_column(&mut self, column: ColumnDescribe) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    pub fn with_column(mut self, column: ColumnDescribe) -> Self {
        self.add_column(column);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDescribe> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescribe> {
        self.columns.iter()
    }
}

/// In-memory metadata provider
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    tables: HashMap<String, TableDescribe>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: TableDescribe) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn get_table(&self, name: &str) -> Option<&TableDescribe> {
        self.tables.get(name)
    }
}

impl MetadataProvider for StaticSchema {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescribe>, SchemaLookupError> {
        self.get_table(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| SchemaLookupError::UnknownTable(table.to_string()))
    }
}

/// Builder for `StaticSchema`
pub struct SchemaBuilder {
    schema: StaticSchema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: StaticSchema::new(),
        }
    }

    pub fn with_table(mut self, table: TableDescribe) -> Self {
        self.schema.add_table(table);
        self
    }

    pub fn build(self) -> StaticSchema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
