//! Convenient re-exports of commonly used types from docquery.
//!
//! ```ignore
//! use docquery::prelude::*;
//! ```

pub use docquery_core::{
    error::{QueryError, QueryResult},
    expression::{ExprKind, Expression, ExpressionVisitor},
    field::{ArrayField, Field, FieldPath},
    operator::{LogicalOp, Operand, Operator, QueryOp, RegexOption, UpdateOp},
    schema::{Elements, FieldSet, QueryFields},
    update::{UpdateExpression, UpdateOperator},
};
pub use docquery_macros::QueryFields;

#[cfg(feature = "mongodb")]
pub use docquery_mongodb::{ExpressionCollectionExt, MongoQueryStore};
