//! SQL rendering for expression trees
//!
//! This module turns an expression tree built from [`crate::ast`] into SQL
//! text for PostgreSQL or SQLite.
//!
//! # Overview
//!
//! Rendering involves:
//! 1. A metadata provider describing table columns (a database catalog, or a
//!    [`StaticSchema`] in memory)
//! 2. A [`SchemaCache`] that fetches each table's columns once
//! 3. A [`SqlRenderer`] that walks the tree depth-first, delegating identifier
//!    and literal quoting to the dialect
//!
//! # Example
//!
//! ```rust
//! use relexpr::{Node, Table, ValueList};
//! use relexpr::sql::{
//!     ColumnDescribe, ColumnType, RenderConfig, SchemaBuilder, SchemaCache, SqlRenderer,
//!     TableDescribe,
//! };
//!
//! let schema = SchemaBuilder::new()
//!     .with_table(
//!         TableDescribe::new("orders")
//!             .with_column(ColumnDescribe::new("qty", ColumnType::Integer))
//!             .with_column(ColumnDescribe::declared("note", "VARCHAR(80)")),
//!     )
//!     .build();
//! let cache = SchemaCache::new(schema);
//! let renderer = SqlRenderer::new(&cache, RenderConfig::default());
//!
//! let orders = Table::new("orders");
//! let total = Node::from(orders.column("qty")).sum().alias("total");
//! assert_eq!(renderer.render(&total).unwrap(), "SUM(orders.qty) AS total");
//!
//! let row = ValueList::new(
//!     vec![Node::literal("3"), Node::literal(3)],
//!     vec![Some(orders.column("qty")), Some(orders.column("note"))],
//! )
//! .unwrap();
//! assert_eq!(renderer.render(&row.into()).unwrap(), "VALUES (3, '3')");
//! ```
//!
//! # Quoting
//!
//! Literals bound to a column are quoted by that column's declared type:
//! numeric text becomes a bare number for numeric columns, numbers are quoted
//! for text columns, and boolean columns accept `t`/`f`/`yes`/`no` spellings.
//! Unbound literals are quoted by their own type. PostgreSQL renders booleans
//! as `TRUE`/`FALSE`, SQLite as `1`/`0`.

pub mod cache;
pub mod dialect;
pub mod error;
pub mod renderer;
pub mod schema;

// Re-export main types
pub use cache::{SchemaCache, TableColumns};
pub use dialect::{get_dialect, PostgresDialect, SqlDialect, SqlDialectImpl, SqliteDialect};
pub use error::{
    ConstructionError, ConstructionResult, RenderError, RenderResult, SchemaLookupError,
};
pub use renderer::{render, render_simple, RenderConfig, SqlRenderer};
pub use schema::{
    ColumnDescribe, ColumnType, MetadataProvider, SchemaBuilder, StaticSchema, TableDescribe,
};
