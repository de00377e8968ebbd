pub mod ast;
pub mod sql;

pub use ast::*;
pub use sql::{render, ConstructionError, RenderError, SchemaLookupError};
