//! Update expressions.
//!
//! Update leaves come from the update builders on [`Field`](crate::field::Field) (`set`, `inc`,
//! `rename`, ...). Combining them with [`UpdateExpression::and`] groups the leaves by operator when
//! serialized:
//!
//! ```ignore
//! // {"$set": {"listing_url": "http://www.source-fellows.com", "name": "Horst"}}
//! let update = listing.listing_url.set("http://www.source-fellows.com")
//!     .and([listing.name.set("Horst")]);
//! ```
//!
//! The group for an operator is placed where that operator first occurs in the tree, so the
//! output order is reproducible.
//!
//! # Unrecognized payloads
//!
//! [`UpdateExpression::Opaque`] holds a payload that is not an update operator. The lenient
//! serializers ([`UpdateExpression::to_document`] and everything built on it) leave such payloads
//! out and log a warning; [`UpdateExpression::try_to_document`] fails with
//! [`QueryError::UnrecognizedUpdate`](crate::error::QueryError::UnrecognizedUpdate) instead.

use std::fmt;

use bson::{Bson, Document};
use serde::{Serialize, Serializer};

use crate::{
    error::QueryResult,
    field::FieldPath,
    operator::UpdateOp,
    render::render_document,
    translate::{UnrecognizedPolicy, UpdateTranslator},
};

/// One update directive: an update operator applied to a field with a value.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOperator {
    op: UpdateOp,
    field: FieldPath,
    value: Bson,
}

impl UpdateOperator {
    /// Creates an update directive.
    pub fn new(op: UpdateOp, field: FieldPath, value: Bson) -> Self {
        UpdateOperator { op, field, value }
    }

    /// Returns the update operator.
    pub fn op(&self) -> UpdateOp {
        self.op
    }

    /// Returns the targeted field.
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    /// Returns the value written with the operator.
    pub fn value(&self) -> &Bson {
        &self.value
    }
}

/// An update expression.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateExpression {
    /// A single update directive.
    Operator(UpdateOperator),
    /// Several update expressions applied together.
    Combined(Vec<UpdateExpression>),
    /// A payload that is not an update operator.
    Opaque(Bson),
}

impl UpdateExpression {
    /// Wraps a payload that is not an update operator.
    pub fn opaque(value: impl Into<Bson>) -> Self {
        UpdateExpression::Opaque(value.into())
    }

    /// Combines this update with `more`, producing `[self, more...]`.
    pub fn and(self, more: impl IntoIterator<Item = UpdateExpression>) -> Self {
        UpdateExpression::Combined(std::iter::once(self).chain(more).collect())
    }

    /// Lowers the update into its update document, leaving out unrecognized payloads.
    pub fn to_document(&self) -> Document {
        let document = UpdateTranslator::new(UnrecognizedPolicy::Skip)
            .translate(self)
            .unwrap_or_default();
        tracing::trace!(update = %render_document(&document), "serialized update expression");
        document
    }

    /// Lowers the update into its update document, failing on unrecognized payloads.
    pub fn try_to_document(&self) -> QueryResult<Document> {
        UpdateTranslator::new(UnrecognizedPolicy::Reject).translate(self)
    }

    /// Encodes the update document into BSON bytes.
    pub fn to_bytes(&self) -> QueryResult<Vec<u8>> {
        Ok(bson::ser::serialize_to_vec(&self.to_document())?)
    }
}

impl From<UpdateOperator> for UpdateExpression {
    fn from(operator: UpdateOperator) -> Self {
        UpdateExpression::Operator(operator)
    }
}

impl fmt::Display for UpdateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_document(&self.to_document()))
    }
}

impl Serialize for UpdateExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl From<UpdateExpression> for Document {
    fn from(update: UpdateExpression) -> Self {
        update.to_document()
    }
}

impl From<&UpdateExpression> for Document {
    fn from(update: &UpdateExpression) -> Self {
        update.to_document()
    }
}
