//! Serialization of trees and configuration (requires the `serde` feature)
#![cfg(feature = "serde")]

use pretty_assertions::assert_eq;
use relexpr::sql::{render_simple, ColumnDescribe, RenderConfig, SqlDialect};
use relexpr::{Conjunction, Node, Table};

#[test]
fn test_tree_survives_json() {
    let t = Table::new("t");
    let tree: Node = Conjunction::pair(
        Node::from(t.column("a")).sum().alias("total"),
        Node::bound_literal("x", t.column("b")).negate(),
    )
    .into();

    let json = serde_json::to_string(&tree).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tree);
    assert_eq!(
        render_simple(&back, SqlDialect::Postgres).unwrap(),
        "SUM(t.a) AS total AND NOT ('x')"
    );
}

#[test]
fn test_function_without_name_is_rejected() {
    let json = r#"{"Function":{"name":"","arguments":[],"distinct":false,"alias":null}}"#;
    let err = serde_json::from_str::<Node>(json).unwrap_err();
    assert!(err.to_string().contains("name"), "{}", err);

    let json = r#"{"Function":{"name":"COUNT","arguments":[{"Literal":{"value":{"Integer":1},"attribute":null}}],"distinct":true}}"#;
    let node: Node = serde_json::from_str(json).unwrap();
    assert_eq!(render_simple(&node, SqlDialect::Postgres).unwrap(), "COUNT(DISTINCT 1)");
}

#[test]
fn test_config_from_json() {
    let config: RenderConfig = serde_json::from_str(r#"{"dialect":"Sqlite"}"#).unwrap();
    assert_eq!(config.dialect, SqlDialect::Sqlite);
}

#[test]
fn test_column_metadata_from_json() {
    let column: ColumnDescribe = serde_json::from_str(
        r#"{"name":"qty","column_type":"Integer","declared_type":"INT","nillable":false,"default":null}"#,
    )
    .unwrap();
    assert_eq!(column.name, "qty");
    assert!(!column.nillable);
}
