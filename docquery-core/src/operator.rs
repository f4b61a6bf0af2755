//! The operator vocabulary.
//!
//! Every operator kind is a variant of a closed enum carrying its wire symbol, so misspelled
//! operators cannot be expressed and matches over operator kinds are exhaustive:
//!
//! - [`QueryOp`] - comparison, set, existence, array, pattern and negation operators
//! - [`LogicalOp`] - connectives combining whole expressions
//! - [`UpdateOp`] - mutation directives used by update expressions
//!
//! [`Operator`] pairs a [`QueryOp`] with its [`Operand`]. Operators never inspect their operand
//! against the type of the field they end up attached to; type mismatches surface only when the
//! database rejects the query.

use std::fmt;

use bson::Bson;

use crate::expression::Expression;

/// Query operators usable inside a per-field operator block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOp {
    /// Equal to.
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Equal to any value of a set.
    In,
    /// Equal to no value of a set.
    Nin,
    /// Field presence.
    Exists,
    /// Array contains all values.
    All,
    /// Array length.
    Size,
    /// Some array element satisfies every condition.
    ElemMatch,
    /// Regular expression pattern.
    Regex,
    /// Flags for a sibling `$regex`.
    Options,
    /// Negation of an operator.
    Not,
}

impl QueryOp {
    /// Returns the wire symbol of this operator.
    pub const fn symbol(&self) -> &'static str {
        match self {
            QueryOp::Eq => "$eq",
            QueryOp::Ne => "$ne",
            QueryOp::Gt => "$gt",
            QueryOp::Gte => "$gte",
            QueryOp::Lt => "$lt",
            QueryOp::Lte => "$lte",
            QueryOp::In => "$in",
            QueryOp::Nin => "$nin",
            QueryOp::Exists => "$exists",
            QueryOp::All => "$all",
            QueryOp::Size => "$size",
            QueryOp::ElemMatch => "$elemMatch",
            QueryOp::Regex => "$regex",
            QueryOp::Options => "$options",
            QueryOp::Not => "$not",
        }
    }
}

/// Logical connectives combining expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
    /// No child may match.
    Nor,
}

impl LogicalOp {
    /// Returns the wire symbol of this connective.
    pub const fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "$and",
            LogicalOp::Or => "$or",
            LogicalOp::Nor => "$nor",
        }
    }
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    /// Replace the value.
    Set,
    /// Increment by an amount.
    Inc,
    /// Keep the smaller of current and given value.
    Min,
    /// Keep the larger of current and given value.
    Max,
    /// Multiply by a number.
    Mul,
    /// Rename the field.
    Rename,
    /// Remove the field.
    Unset,
    /// Set to the current date.
    CurrentDate,
}

impl UpdateOp {
    /// Returns the wire symbol of this update operator.
    pub const fn symbol(&self) -> &'static str {
        match self {
            UpdateOp::Set => "$set",
            UpdateOp::Inc => "$inc",
            UpdateOp::Min => "$min",
            UpdateOp::Max => "$max",
            UpdateOp::Mul => "$mul",
            UpdateOp::Rename => "$rename",
            UpdateOp::Unset => "$unset",
            UpdateOp::CurrentDate => "$currentDate",
        }
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Regular expression flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegexOption {
    /// Match upper and lower case alike.
    CaseInsensitive,
    /// `^` and `$` match at line boundaries instead of string boundaries.
    Multiline,
    /// Ignore unescaped white space and `#` comments in the pattern.
    Extended,
    /// `.` also matches newlines.
    DotAll,
}

impl RegexOption {
    /// Returns the single-character flag code.
    pub const fn as_char(self) -> char {
        match self {
            RegexOption::CaseInsensitive => 'i',
            RegexOption::Multiline => 'm',
            RegexOption::Extended => 'x',
            RegexOption::DotAll => 's',
        }
    }
}

/// The right-hand side of an [`Operator`].
#[derive(Debug, Clone)]
pub enum Operand {
    /// A scalar, set, or any other BSON value.
    Value(Bson),
    /// Nested operators, emitted as one document of their entries.
    Operators(Vec<Operator>),
    /// Nested expressions, emitted as one document merging their entries.
    Expressions(Vec<Expression>),
}

/// A query operator together with its operand.
///
/// Constructors mirror the operator names:
///
/// ```ignore
/// use docquery::operator::Operator;
///
/// let wifi = Operator::eq("Wifi");
/// let range = [Operator::gte(80), Operator::lt(85)];
/// ```
#[derive(Debug, Clone)]
pub struct Operator {
    op: QueryOp,
    operand: Operand,
}

impl Operator {
    /// Creates an operator from its parts.
    pub fn new(op: QueryOp, operand: Operand) -> Self {
        Operator { op, operand }
    }

    fn value(op: QueryOp, value: impl Into<Bson>) -> Self {
        Operator::new(op, Operand::Value(value.into()))
    }

    fn values<V: Into<Bson>>(op: QueryOp, values: impl IntoIterator<Item = V>) -> Self {
        Operator::value(op, Bson::Array(values.into_iter().map(Into::into).collect()))
    }

    /// Returns the operator kind.
    pub fn op(&self) -> QueryOp {
        self.op
    }

    /// Returns the wire symbol of the operator kind.
    pub fn symbol(&self) -> &'static str {
        self.op.symbol()
    }

    /// Returns the operand.
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// `$eq`
    pub fn eq(value: impl Into<Bson>) -> Self {
        Operator::value(QueryOp::Eq, value)
    }

    /// `$ne`
    pub fn ne(value: impl Into<Bson>) -> Self {
        Operator::value(QueryOp::Ne, value)
    }

    /// `$gt`
    pub fn gt(value: impl Into<Bson>) -> Self {
        Operator::value(QueryOp::Gt, value)
    }

    /// `$gte`
    pub fn gte(value: impl Into<Bson>) -> Self {
        Operator::value(QueryOp::Gte, value)
    }

    /// `$lt`
    pub fn lt(value: impl Into<Bson>) -> Self {
        Operator::value(QueryOp::Lt, value)
    }

    /// `$lte`
    pub fn lte(value: impl Into<Bson>) -> Self {
        Operator::value(QueryOp::Lte, value)
    }

    /// `$in` over `values`, in order.
    pub fn is_in<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Self {
        Operator::values(QueryOp::In, values)
    }

    /// `$nin` over `values`, in order.
    pub fn not_in<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Self {
        Operator::values(QueryOp::Nin, values)
    }

    /// `{"$exists": true}`
    pub fn exists() -> Self {
        Operator::value(QueryOp::Exists, true)
    }

    /// `{"$exists": false}`
    pub fn not_exists() -> Self {
        Operator::value(QueryOp::Exists, false)
    }

    /// `$all` over `values`, in order.
    pub fn all<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Self {
        Operator::values(QueryOp::All, values)
    }

    /// `$size`
    pub fn size(size: i32) -> Self {
        Operator::value(QueryOp::Size, size)
    }

    /// `$regex`
    pub fn regex(pattern: impl Into<String>) -> Self {
        Operator::value(QueryOp::Regex, pattern.into())
    }

    /// `$options`, the flag string accompanying a `$regex`.
    pub fn regex_options(flags: impl Into<String>) -> Self {
        Operator::value(QueryOp::Options, flags.into())
    }

    /// `$not` wrapping another operator.
    pub fn not(operator: Operator) -> Self {
        Operator::new(QueryOp::Not, Operand::Operators(vec![operator]))
    }

    /// `$elemMatch` over operators applied to scalar elements.
    pub fn elem_match(operators: impl IntoIterator<Item = Operator>) -> Self {
        Operator::new(QueryOp::ElemMatch, Operand::Operators(operators.into_iter().collect()))
    }

    /// `$elemMatch` over expressions applied to embedded-document elements.
    pub fn elem_match_expressions(expressions: impl IntoIterator<Item = Expression>) -> Self {
        Operator::new(QueryOp::ElemMatch, Operand::Expressions(expressions.into_iter().collect()))
    }
}
