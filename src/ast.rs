use std::ops;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::sql::error::{ConstructionError, ConstructionResult};

/// A table that attribute references can be taken from
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    name: String,
}

impl Table {
    /// Create a table handle by name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference a column of this table
    pub fn column(&self, column: impl Into<String>) -> AttributeRef {
        AttributeRef::new(self.name.clone(), column)
    }
}

/// A (table, column) pair identifying a column in a query
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    table: String,
    column: String,
}

impl AttributeRef {
    /// Reference `column` of `table`
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Owning table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column name
    pub fn column(&self) -> &str {
        &self.column
    }
}

/// A scalar value carried by a literal node
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A literal value, optionally bound to the column it will be compared
/// against or stored in. The binding only affects quoting.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub attribute: Option<AttributeRef>,
}

/// Arithmetic operators usable in an infix operation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    Multiply,
    Divide,
    Add,
    Subtract,
}

impl InfixOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct InfixOperation {
    pub operator: InfixOperator,
    pub left: Arc<Node>,
    pub right: Arc<Node>,
}

/// A function call such as `COUNT(DISTINCT t.id) AS n`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "NamedFunctionParts", into = "NamedFunctionParts")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFunction {
    name: String,
    arguments: Vec<Arc<Node>>,
    distinct: bool,
    alias: Option<String>,
}

impl NamedFunction {
    /// Call `name` with `arguments`; the name must not be blank
    pub fn new<I, N>(name: impl Into<String>, arguments: I) -> ConstructionResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConstructionError::EmptyFunctionName);
        }
        Ok(Self::unchecked(name, arguments.into_iter().map(Into::into).collect()))
    }

    fn unchecked(name: impl Into<String>, arguments: Vec<Arc<Node>>) -> Self {
        Self {
            name: name.into(),
            arguments,
            distinct: false,
            alias: None,
        }
    }

    /// Render as `NAME(DISTINCT ...)`
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Append ` AS alias` after the call
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Node> {
        self.arguments.iter().map(|node| &**node)
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// Unvalidated fields of a named function
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct NamedFunctionParts {
    name: String,
    arguments: Vec<Arc<Node>>,
    #[serde(default)]
    distinct: bool,
    #[serde(default)]
    alias: Option<String>,
}

#[cfg(feature = "serde")]
impl TryFrom<NamedFunctionParts> for NamedFunction {
    type Error = ConstructionError;

    fn try_from(parts: NamedFunctionParts) -> ConstructionResult<Self> {
        let function = NamedFunction::new(parts.name, parts.arguments)?.with_distinct(parts.distinct);
        Ok(match parts.alias {
            Some(alias) => function.with_alias(alias),
            None => function,
        })
    }
}

#[cfg(feature = "serde")]
impl From<NamedFunction> for NamedFunctionParts {
    fn from(function: NamedFunction) -> Self {
        Self {
            name: function.name,
            arguments: function.arguments,
            distinct: function.distinct,
            alias: function.alias,
        }
    }
}

/// Logical AND over two or more children.
///
/// Children are kept exactly as given: a conjunction built from another
/// conjunction stays nested.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Arc<Node>>", into = "Vec<Arc<Node>>")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    children: Vec<Arc<Node>>,
}

impl Conjunction {
    /// Conjunction of exactly two nodes
    pub fn pair(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Self {
        Self {
            children: vec![left.into(), right.into()],
        }
    }

    /// Conjunction of an already-built sequence of at least two nodes
    pub fn of_many<I, N>(children: I) -> ConstructionResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        let children: Vec<Arc<Node>> = children.into_iter().map(Into::into).collect();
        if children.len() < 2 {
            return Err(ConstructionError::TooFewChildren {
                actual: children.len(),
            });
        }
        Ok(Self { children })
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().map(|node| &**node)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the conjunction has no children; never true for a built one
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn left(&self) -> &Node {
        &self.children[0]
    }

    pub fn right(&self) -> &Node {
        &self.children[1]
    }
}

/// A single `VALUES (...)` row. Position `i` of `expressions` is quoted
/// against position `i` of `columns` when that column is known.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "ValueListParts", into = "ValueListParts")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ValueList {
    expressions: Vec<Arc<Node>>,
    columns: Vec<Option<AttributeRef>>,
}

impl ValueList {
    /// A row whose expressions and target columns line up one to one
    pub fn new<I, N>(expressions: I, columns: Vec<Option<AttributeRef>>) -> ConstructionResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        let expressions: Vec<Arc<Node>> = expressions.into_iter().map(Into::into).collect();
        if expressions.is_empty() {
            return Err(ConstructionError::EmptyValueList);
        }
        if expressions.len() != columns.len() {
            return Err(ConstructionError::LengthMismatch {
                expressions: expressions.len(),
                columns: columns.len(),
            });
        }
        Ok(Self {
            expressions,
            columns,
        })
    }

    /// A row with no column bindings; every item uses default quoting
    pub fn unbound<I, N>(expressions: I) -> ConstructionResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<Node>>,
    {
        let expressions: Vec<Arc<Node>> = expressions.into_iter().map(Into::into).collect();
        let columns = vec![None; expressions.len()];
        Self::new(expressions, columns)
    }

    /// Pairs of (expression, target column)
    pub fn items(&self) -> impl Iterator<Item = (&Node, Option<&AttributeRef>)> {
        self.expressions
            .iter()
            .map(|node| &**node)
            .zip(self.columns.iter().map(Option::as_ref))
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl TryFrom<Vec<Arc<Node>>> for Conjunction {
    type Error = ConstructionError;

    fn try_from(children: Vec<Arc<Node>>) -> ConstructionResult<Self> {
        Conjunction::of_many(children)
    }
}

impl From<Conjunction> for Vec<Arc<Node>> {
    fn from(conjunction: Conjunction) -> Self {
        conjunction.children
    }
}

/// Unvalidated (expressions, columns) halves of a value list
pub type ValueListParts = (Vec<Arc<Node>>, Vec<Option<AttributeRef>>);

impl TryFrom<ValueListParts> for ValueList {
    type Error = ConstructionError;

    fn try_from((expressions, columns): ValueListParts) -> ConstructionResult<Self> {
        ValueList::new(expressions, columns)
    }
}

impl From<ValueList> for ValueListParts {
    fn from(values: ValueList) -> Self {
        (values.expressions, values.columns)
    }
}

/// `<expr> AS <alias>`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub expr: Arc<Node>,
    pub alias: String,
}

/// An expression tree node
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Literal),
    /// Pre-formatted SQL emitted verbatim
    SqlLiteral(String),
    Attribute(AttributeRef),
    Infix(InfixOperation),
    Function(NamedFunction),
    And(Conjunction),
    Not(Arc<Node>),
    Values(ValueList),
    As(Alias),
}

impl Node {
    /// Variant name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Literal(_) => "Literal",
            Node::SqlLiteral(_) => "SqlLiteral",
            Node::Attribute(_) => "Attribute",
            Node::Infix(_) => "InfixOperation",
            Node::Function(_) => "NamedFunction",
            Node::And(_) => "Conjunction",
            Node::Not(_) => "Negation",
            Node::Values(_) => "ValueList",
            Node::As(_) => "As",
        }
    }

    /// An unbound literal, quoted by its own type
    pub fn literal(value: impl Into<Value>) -> Node {
        Node::Literal(Literal {
            value: value.into(),
            attribute: None,
        })
    }

    /// A literal quoted according to the type of `attribute`'s column
    pub fn bound_literal(value: impl Into<Value>, attribute: AttributeRef) -> Node {
        Node::Literal(Literal {
            value: value.into(),
            attribute: Some(attribute),
        })
    }

    /// Raw SQL text, emitted as is
    pub fn sql(raw: impl Into<String>) -> Node {
        Node::SqlLiteral(raw.into())
    }

    /// `left <operator> right`, without parentheses
    pub fn infix(
        operator: InfixOperator,
        left: impl Into<Arc<Node>>,
        right: impl Into<Arc<Node>>,
    ) -> Node {
        Node::Infix(InfixOperation {
            operator,
            left: left.into(),
            right: right.into(),
        })
    }

    pub fn multiplication(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Node {
        Node::infix(InfixOperator::Multiply, left, right)
    }

    pub fn division(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Node {
        Node::infix(InfixOperator::Divide, left, right)
    }

    pub fn addition(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Node {
        Node::infix(InfixOperator::Add, left, right)
    }

    pub fn subtraction(left: impl Into<Arc<Node>>, right: impl Into<Arc<Node>>) -> Node {
        Node::infix(InfixOperator::Subtract, left, right)
    }

    /// `self AND other`, as a two-child conjunction
    pub fn and(self, other: impl Into<Arc<Node>>) -> Node {
        Node::And(Conjunction::pair(self, other))
    }

    /// `NOT (self)`
    pub fn negate(self) -> Node {
        Node::Not(Arc::new(self))
    }

    /// `self AS alias`
    pub fn alias(self, alias: impl Into<String>) -> Node {
        Node::As(Alias {
            expr: Arc::new(self),
            alias: alias.into(),
        })
    }

    /// `COUNT(self)` or `COUNT(DISTINCT self)`
    pub fn count(self, distinct: bool) -> Node {
        Node::Function(NamedFunction::unchecked("COUNT", vec![Arc::new(self)]).with_distinct(distinct))
    }

    /// `SUM(self)`
    pub fn sum(self) -> Node {
        self.aggregate("SUM")
    }

    /// `MAX(self)`
    pub fn maximum(self) -> Node {
        self.aggregate("MAX")
    }

    /// `MIN(self)`
    pub fn minimum(self) -> Node {
        self.aggregate("MIN")
    }

    /// `AVG(self)`
    pub fn average(self) -> Node {
        self.aggregate("AVG")
    }

    fn aggregate(self, name: &'static str) -> Node {
        Node::Function(NamedFunction::unchecked(name, vec![Arc::new(self)]))
    }
}

impl From<AttributeRef> for Node {
    fn from(attribute: AttributeRef) -> Self {
        Node::Attribute(attribute)
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal(literal)
    }
}

impl From<NamedFunction> for Node {
    fn from(function: NamedFunction) -> Self {
        Node::Function(function)
    }
}

impl From<Conjunction> for Node {
    fn from(conjunction: Conjunction) -> Self {
        Node::And(conjunction)
    }
}

impl From<ValueList> for Node {
    fn from(values: ValueList) -> Self {
        Node::Values(values)
    }
}

impl ops::Add for Node {
    type Output = Node;

    fn add(self, rhs: Node) -> Node {
        Node::addition(self, rhs)
    }
}

impl ops::Sub for Node {
    type Output = Node;

    fn sub(self, rhs: Node) -> Node {
        Node::subtraction(self, rhs)
    }
}

impl ops::Mul for Node {
    type Output = Node;

    fn mul(self, rhs: Node) -> Node {
        Node::multiplication(self, rhs)
    }
}

impl ops::Div for Node {
    type Output = Node;

    fn div(self, rhs: Node) -> Node {
        Node::division(self, rhs)
    }
}

impl ops::Not for Node {
    type Output = Node;

    fn not(self) -> Node {
        self.negate()
    }
}
