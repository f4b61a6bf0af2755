//! Typed handles for document field paths.
//!
//! A [`FieldPath`] is a dot-delimited location inside a document such as
//! `"address.location.type"`. Paths are wrapped by one of two handle types which decide which
//! builders are available:
//!
//! - [`Field`] for scalar values and embedded documents: comparisons, set membership, existence,
//!   regular expressions, and update operators.
//! - [`ArrayField`] for arrays: `$all`, `$size`, element matching and exact array equality.
//!
//! Handles are usually produced by `#[derive(QueryFields)]`, but can be written by hand:
//!
//! ```ignore
//! use docquery::field::{Field, ArrayField};
//!
//! const BEDROOMS: Field = Field::from_static("bedrooms");
//! const AMENITIES: ArrayField = ArrayField::from_static("amenities");
//!
//! let filter = BEDROOMS.gt(6).and([AMENITIES.contains_all(["Wifi", "Kitchen"])]);
//! ```

use std::{borrow::Cow, fmt};

use bson::Bson;

use crate::{
    expression::Expression,
    operator::{Operator, RegexOption, UpdateOp},
    update::{UpdateExpression, UpdateOperator},
};

/// A dot-delimited path addressing a location within a nested document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    /// Creates a path from an owned or borrowed string.
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        FieldPath(path.into())
    }

    /// Creates a path from a static string, usable in `const` contexts.
    pub const fn from_static(path: &'static str) -> Self {
        FieldPath(Cow::Borrowed(path))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a segment, producing `self.segment`.
    pub fn child(&self, segment: &str) -> Self {
        FieldPath(Cow::Owned(format!("{}.{}", self.0, segment)))
    }

    /// Appends a literal array index, producing `self.index`.
    pub fn index(&self, index: usize) -> Self {
        FieldPath(Cow::Owned(format!("{}.{}", self.0, index)))
    }

    /// Joins an optional prefix with a segment.
    ///
    /// Without a prefix the segment becomes the whole path.
    pub fn join(prefix: Option<&FieldPath>, segment: &'static str) -> Self {
        match prefix {
            Some(prefix) => prefix.child(segment),
            None => FieldPath::from_static(segment),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldPath {
    fn from(path: &'static str) -> Self {
        FieldPath::from_static(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        FieldPath(Cow::Owned(path))
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0.into_owned()
    }
}

/// Handle for a scalar or embedded-document field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    path: FieldPath,
}

impl Field {
    /// Creates a field handle for the given path.
    pub fn new(path: impl Into<FieldPath>) -> Self {
        Field { path: path.into() }
    }

    /// Creates a field handle from a static path, usable in `const` contexts.
    pub const fn from_static(path: &'static str) -> Self {
        Field { path: FieldPath::from_static(path) }
    }

    /// Returns the path this handle addresses.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    fn with(&self, operator: Operator) -> Expression {
        Expression::operator(self.path.clone(), operator)
    }

    /// Matches documents where the field equals `value`.
    ///
    /// Serialized as the bare value, `{field: value}`, without an `$eq` wrapper.
    pub fn equals(&self, value: impl Into<Bson>) -> Expression {
        Expression::value(self.path.clone(), value.into())
    }

    /// Matches documents where the field does not equal `value` (`$ne`).
    pub fn not_equals(&self, value: impl Into<Bson>) -> Expression {
        self.with(Operator::ne(value))
    }

    /// Matches documents where the field is greater than `value` (`$gt`).
    pub fn gt(&self, value: impl Into<Bson>) -> Expression {
        self.with(Operator::gt(value))
    }

    /// Matches documents where the field is greater than or equal to `value` (`$gte`).
    pub fn gte(&self, value: impl Into<Bson>) -> Expression {
        self.with(Operator::gte(value))
    }

    /// Matches documents where the field is less than `value` (`$lt`).
    pub fn lt(&self, value: impl Into<Bson>) -> Expression {
        self.with(Operator::lt(value))
    }

    /// Matches documents where the field is less than or equal to `value` (`$lte`).
    pub fn lte(&self, value: impl Into<Bson>) -> Expression {
        self.with(Operator::lte(value))
    }

    /// Matches documents where the field equals any of `values` (`$in`).
    ///
    /// Values keep their order, duplicates included.
    pub fn is_in<V: Into<Bson>>(&self, values: impl IntoIterator<Item = V>) -> Expression {
        self.with(Operator::is_in(values))
    }

    /// Matches documents where the field equals none of `values` or is missing (`$nin`).
    pub fn not_in<V: Into<Bson>>(&self, values: impl IntoIterator<Item = V>) -> Expression {
        self.with(Operator::not_in(values))
    }

    /// Matches documents that contain the field (`{"$exists": true}`).
    pub fn exists(&self) -> Expression {
        self.with(Operator::exists())
    }

    /// Matches documents that do not contain the field (`{"$exists": false}`).
    pub fn not_exists(&self) -> Expression {
        self.with(Operator::not_exists())
    }

    /// Matches string values against a regular expression (`$regex`).
    ///
    /// When `options` is non-empty a second `$options` entry follows `$regex` in the same
    /// operator block, holding the flag characters concatenated in the order given.
    pub fn regex(
        &self,
        pattern: impl Into<String>,
        options: impl IntoIterator<Item = RegexOption>,
    ) -> Expression {
        let flags = options
            .into_iter()
            .map(RegexOption::as_char)
            .collect::<String>();

        if flags.is_empty() {
            self.with(Operator::regex(pattern))
        } else {
            Expression::operators(
                self.path.clone(),
                vec![Operator::regex(pattern), Operator::regex_options(flags)],
            )
        }
    }

    /// Inverts a single operator (`{field: {"$not": {op: value}}}`).
    pub fn not(&self, operator: Operator) -> Expression {
        self.with(Operator::not(operator))
    }

    /// Matches documents where the field satisfies every operator in `operators`.
    ///
    /// The operators are emitted in order into one block: `{field: {op1: v1, op2: v2}}`.
    pub fn matches_all(&self, operators: impl IntoIterator<Item = Operator>) -> Expression {
        Expression::operators(self.path.clone(), operators.into_iter().collect())
    }

    fn update(&self, op: UpdateOp, value: Bson) -> UpdateExpression {
        UpdateExpression::Operator(UpdateOperator::new(op, self.path.clone(), value))
    }

    /// Replaces the value of the field (`$set`).
    pub fn set(&self, value: impl Into<Bson>) -> UpdateExpression {
        self.update(UpdateOp::Set, value.into())
    }

    /// Increments the field by `value` (`$inc`).
    pub fn inc(&self, value: impl Into<Bson>) -> UpdateExpression {
        self.update(UpdateOp::Inc, value.into())
    }

    /// Lowers the field to `value` if `value` is smaller (`$min`).
    ///
    /// Values of different types are compared using the BSON comparison order.
    pub fn min(&self, value: impl Into<Bson>) -> UpdateExpression {
        self.update(UpdateOp::Min, value.into())
    }

    /// Raises the field to `value` if `value` is larger (`$max`).
    pub fn max(&self, value: impl Into<Bson>) -> UpdateExpression {
        self.update(UpdateOp::Max, value.into())
    }

    /// Multiplies the numeric field by `value` (`$mul`).
    pub fn mul(&self, value: impl Into<Bson>) -> UpdateExpression {
        self.update(UpdateOp::Mul, value.into())
    }

    /// Renames the field to the path of `to` (`$rename`).
    pub fn rename(&self, to: &Field) -> UpdateExpression {
        self.update(UpdateOp::Rename, Bson::String(to.path.to_string()))
    }

    /// Removes the field (`$unset`).
    pub fn unset(&self) -> UpdateExpression {
        self.update(UpdateOp::Unset, Bson::String(String::new()))
    }

    /// Sets the field to the current date (`$currentDate`).
    pub fn current_date(&self) -> UpdateExpression {
        self.update(UpdateOp::CurrentDate, Bson::Boolean(true))
    }
}

impl From<FieldPath> for Field {
    fn from(path: FieldPath) -> Self {
        Field { path }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.fmt(f)
    }
}

/// Handle for an array field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayField {
    path: FieldPath,
}

impl ArrayField {
    /// Creates an array field handle for the given path.
    pub fn new(path: impl Into<FieldPath>) -> Self {
        ArrayField { path: path.into() }
    }

    /// Creates an array field handle from a static path, usable in `const` contexts.
    pub const fn from_static(path: &'static str) -> Self {
        ArrayField { path: FieldPath::from_static(path) }
    }

    /// Returns the path this handle addresses.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Replaces the whole array with `values` (`$set`).
    pub fn set<V: Into<Bson>>(&self, values: impl IntoIterator<Item = V>) -> UpdateExpression {
        UpdateExpression::Operator(UpdateOperator::new(
            UpdateOp::Set,
            self.path.clone(),
            Bson::Array(values.into_iter().map(Into::into).collect()),
        ))
    }

    /// Removes the whole array (`$unset`).
    pub fn unset(&self) -> UpdateExpression {
        UpdateExpression::Operator(UpdateOperator::new(
            UpdateOp::Unset,
            self.path.clone(),
            Bson::String(String::new()),
        ))
    }

    /// Addresses the element at `index` (`path.index`).
    pub fn element_no(&self, index: usize) -> Field {
        Field { path: self.path.index(index) }
    }

    /// Matches arrays containing every one of `values` (`$all`).
    pub fn contains_all<V: Into<Bson>>(&self, values: impl IntoIterator<Item = V>) -> Expression {
        Expression::operator(self.path.clone(), Operator::all(values))
    }

    /// Matches arrays with exactly `size` elements (`$size`).
    pub fn size(&self, size: i32) -> Expression {
        Expression::operator(self.path.clone(), Operator::size(size))
    }

    /// Matches arrays of scalars against one or more operators.
    ///
    /// The operators form a single block on the array field, `{field: {op1: v1, ...}}`, so each
    /// operator may be satisfied by a different element. Use [`ArrayField::elem_match`] when a
    /// single element has to satisfy all of them.
    pub fn contains_element(&self, operators: impl IntoIterator<Item = Operator>) -> Expression {
        let mut operators = operators.into_iter().collect::<Vec<_>>();

        match operators.len() {
            1 => Expression::operator(self.path.clone(), operators.remove(0)),
            _ => Expression::operators(self.path.clone(), operators),
        }
    }

    /// Matches arrays with at least one element satisfying every operator (`$elemMatch`).
    pub fn elem_match(&self, operators: impl IntoIterator<Item = Operator>) -> Expression {
        Expression::operator(self.path.clone(), Operator::elem_match(operators))
    }

    /// Matches arrays that are exactly the documents produced by `expressions`, in order.
    ///
    /// Each sub-expression is lowered to its document and the array is compared as a bare value,
    /// `{field: [doc1, doc2, ...]}`. Paths inside `expressions` are relative to the array element.
    /// Use [`ArrayField::elem_match_expressions`] to match a single element by condition instead.
    pub fn contains_element_matching(
        &self,
        expressions: impl IntoIterator<Item = Expression>,
    ) -> Expression {
        let documents = expressions
            .into_iter()
            .map(|expr| Bson::Document(expr.to_document()))
            .collect();

        Expression::value(self.path.clone(), Bson::Array(documents))
    }

    /// Matches arrays of embedded documents where one element satisfies every sub-expression
    /// (`$elemMatch`).
    ///
    /// Paths inside `expressions` are relative to the array element.
    pub fn elem_match_expressions(
        &self,
        expressions: impl IntoIterator<Item = Expression>,
    ) -> Expression {
        Expression::operator(self.path.clone(), Operator::elem_match_expressions(expressions))
    }

    /// Matches arrays that are exactly `values`, in order.
    pub fn contains_exact<V: Into<Bson>>(&self, values: impl IntoIterator<Item = V>) -> Expression {
        Expression::value(
            self.path.clone(),
            Bson::Array(values.into_iter().map(Into::into).collect()),
        )
    }
}

impl From<FieldPath> for ArrayField {
    fn from(path: FieldPath) -> Self {
        ArrayField { path }
    }
}

impl fmt::Display for ArrayField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.fmt(f)
    }
}
