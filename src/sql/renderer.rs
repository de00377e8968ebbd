//! Expression tree to SQL renderer

use crate::ast::{AttributeRef, Conjunction, InfixOperation, NamedFunction, Node, Value, ValueList};

use super::cache::SchemaCache;
use super::dialect::{get_dialect, SqlDialect, SqlDialectImpl};
use super::error::{RenderError, RenderResult};

/// Configuration for rendering
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Target SQL dialect
    pub dialect: SqlDialect,
}

/// Renders expression trees to SQL text.
///
/// Rendering takes `&self` and never mutates the tree, so one renderer can be
/// shared across threads; the only shared state is the schema cache.
pub struct SqlRenderer<'a> {
    cache: Option<&'a SchemaCache>,
    dialect: Box<dyn SqlDialectImpl>,
}

impl<'a> SqlRenderer<'a> {
    /// Create a renderer that resolves column types through `cache`
    pub fn new(cache: &'a SchemaCache, config: RenderConfig) -> Self {
        Self {
            cache: Some(cache),
            dialect: get_dialect(config.dialect),
        }
    }

    /// Create a renderer without schema; every literal uses default quoting
    pub fn new_without_schema(config: RenderConfig) -> Self {
        Self {
            cache: None,
            dialect: get_dialect(config.dialect),
        }
    }

    pub fn dialect(&self) -> &dyn SqlDialectImpl {
        self.dialect.as_ref()
    }

    /// Render `node` to SQL. Either the whole fragment is produced or an
    /// error is returned.
    pub fn render(&self, node: &Node) -> RenderResult<String> {
        let mut sql = String::new();
        self.visit(node, &mut sql)?;
        Ok(sql)
    }

    fn visit(&self, node: &Node, sql: &mut String) -> RenderResult<()> {
        match node {
            Node::Literal(literal) => {
                let quoted = self.quote_literal(&literal.value, literal.attribute.as_ref())?;
                sql.push_str(&quoted);
            }
            Node::SqlLiteral(raw) => sql.push_str(raw),
            Node::Attribute(attribute) => {
                sql.push_str(&self.dialect.qualify(attribute.table(), attribute.column()))
            }
            Node::Infix(operation) => self.visit_infix(operation, sql)?,
            Node::Function(function) => self.visit_named_function(function, sql)?,
            Node::And(conjunction) => self.visit_and(conjunction, sql)?,
            Node::Not(inner) => {
                sql.push_str("NOT (");
                self.visit(inner, sql)?;
                sql.push(')');
            }
            Node::Values(values) => self.visit_values(values, sql)?,
            Node::As(alias) => {
                self.visit(&alias.expr, sql)?;
                sql.push_str(" AS ");
                sql.push_str(&alias.alias);
            }
        }
        Ok(())
    }

    fn visit_infix(&self, operation: &InfixOperation, sql: &mut String) -> RenderResult<()> {
        self.visit(&operation.left, sql)?;
        sql.push(' ');
        sql.push_str(operation.operator.as_str());
        sql.push(' ');
        self.visit(&operation.right, sql)
    }

    fn visit_named_function(&self, function: &NamedFunction, sql: &mut String) -> RenderResult<()> {
        sql.push_str(function.name());
        sql.push('(');
        if function.is_distinct() {
            sql.push_str("DISTINCT ");
        }
        for (i, argument) in function.arguments().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.visit(argument, sql)?;
        }
        sql.push(')');
        if let Some(alias) = function.alias() {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }
        Ok(())
    }

    fn visit_and(&self, conjunction: &Conjunction, sql: &mut String) -> RenderResult<()> {
        for (i, child) in conjunction.children().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            self.visit(child, sql)?;
        }
        Ok(())
    }

    fn visit_values(&self, values: &ValueList, sql: &mut String) -> RenderResult<()> {
        sql.push_str("VALUES (");
        for (i, (expr, column)) in values.items().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            match expr {
                Node::SqlLiteral(raw) => sql.push_str(raw),
                Node::Literal(literal) => {
                    let quoted = self.quote_literal(&literal.value, column)?;
                    sql.push_str(&quoted);
                }
                other => {
                    return Err(RenderError::UnsupportedNode {
                        variant: other.kind(),
                        context: "VALUES list",
                    })
                }
            }
        }
        sql.push(')');
        Ok(())
    }

    fn quote_literal(&self, value: &Value, attribute: Option<&AttributeRef>) -> RenderResult<String> {
        let column = match (attribute, self.cache) {
            (Some(attribute), Some(cache)) => cache.column_for(attribute)?,
            _ => None,
        };
        Ok(self.dialect.quote(value, column.as_ref()))
    }
}

/// Render a node with a schema cache
pub fn render(node: &Node, cache: &SchemaCache, config: RenderConfig) -> RenderResult<String> {
    SqlRenderer::new(cache, config).render(node)
}

/// Render a node without schema; bound literals fall back to default quoting
pub fn render_simple(node: &Node, dialect: SqlDialect) -> RenderResult<String> {
    SqlRenderer::new_without_schema(RenderConfig { dialect }).render(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AttributeRef, Table};
    use crate::sql::error::SchemaLookupError;
    use crate::sql::schema::{ColumnDescribe, ColumnType, SchemaBuilder, TableDescribe};

    fn t(column: &str) -> Node {
        Table::new("t").column(column).into()
    }

    fn cache() -> SchemaCache {
        SchemaCache::new(
            SchemaBuilder::new()
                .with_table(
                    TableDescribe::new("t")
                        .with_column(ColumnDescribe::new("a", ColumnType::Integer))
                        .with_column(ColumnDescribe::declared("b", "VARCHAR(20)")),
                )
                .build(),
        )
    }

    #[test]
    fn test_infix_has_no_parentheses() {
        let sql = render_simple(&(t("a") + t("b") * t("c")), SqlDialect::Postgres).unwrap();
        assert_eq!(sql, "t.a + t.b * t.c");
    }

    #[test]
    fn test_named_function_distinct_and_alias() {
        let f = NamedFunction::new("COUNT", vec![t("id")])
            .unwrap()
            .with_distinct(true)
            .with_alias("n");
        let sql = render_simple(&f.into(), SqlDialect::Postgres).unwrap();
        assert_eq!(sql, "COUNT(DISTINCT t.id) AS n");
    }

    #[test]
    fn test_function_without_arguments() {
        let f = NamedFunction::new("NOW", Vec::<Node>::new()).unwrap();
        assert_eq!(render_simple(&f.into(), SqlDialect::Postgres).unwrap(), "NOW()");
    }

    #[test]
    fn test_not_always_parenthesizes() {
        let sql = render_simple(&t("flag").negate(), SqlDialect::Postgres).unwrap();
        assert_eq!(sql, "NOT (t.flag)");
    }

    #[test]
    fn test_values_quote_against_columns() {
        let cache = cache();
        let values = ValueList::new(
            vec![Node::literal("5"), Node::literal(5), Node::sql("DEFAULT")],
            vec![
                Some(AttributeRef::new("t", "a")),
                Some(AttributeRef::new("t", "b")),
                None,
            ],
        )
        .unwrap();
        let sql = render(&values.into(), &cache, RenderConfig::default()).unwrap();
        assert_eq!(sql, "VALUES (5, '5', DEFAULT)");
    }

    #[test]
    fn test_values_reject_non_literal_items() {
        let values = ValueList::unbound(vec![Node::literal(1), t("a").and(t("b"))]).unwrap();
        let err = render_simple(&values.into(), SqlDialect::Postgres).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnsupportedNode {
                variant: "Conjunction",
                context: "VALUES list"
            }
        );
    }

    #[test]
    fn test_unknown_table_surfaces_lookup_error() {
        let cache = cache();
        let node = Node::bound_literal(1, AttributeRef::new("nope", "a"));
        let err = render(&node, &cache, RenderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::SchemaLookup(SchemaLookupError::UnknownTable("nope".to_string()))
        );
    }

    #[test]
    fn test_bound_literal_without_schema_uses_default_rule() {
        let node = Node::bound_literal("5", AttributeRef::new("t", "a"));
        assert_eq!(render_simple(&node, SqlDialect::Postgres).unwrap(), "'5'");
    }
}
