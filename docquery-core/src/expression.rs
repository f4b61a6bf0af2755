//! Filter expressions.
//!
//! An [`Expression`] is either a leaf attached to one field path or a logical combination of
//! child expressions. Leaves are produced by the builders on [`Field`](crate::field::Field) and
//! [`ArrayField`](crate::field::ArrayField); combinations by [`Expression::and`],
//! [`Expression::or`] and [`Expression::nor`].
//!
//! # Combining
//!
//! Every combinator wraps the receiver and its arguments in exactly one new logical node, in
//! argument order. Existing nodes are never merged, so the two filters below differ:
//!
//! ```ignore
//! // {"$and": [{"$and": [a, b]}, c]}
//! let nested = a.clone().and([b.clone()]).and([c.clone()]);
//!
//! // {"$and": [a, b, c]}
//! let flat = a.and([b, c]);
//! ```
//!
//! Expressions are immutable and reference counted: cloning one is cheap, and the same
//! expression can appear in any number of combinations or be serialized from several threads.

use std::{fmt, sync::Arc};

use bson::{Bson, Document};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    error::QueryResult,
    field::FieldPath,
    operator::{LogicalOp, Operator},
    render::render_document,
    translate::BsonTranslator,
};

/// The shape of an expression node.
#[derive(Debug)]
pub enum ExprKind {
    /// Implicit equality or an array literal: `{field: value}`.
    Value {
        /// The field to compare.
        field: FieldPath,
        /// The value the field must equal.
        value: Bson,
    },
    /// A single operator: `{field: {op: operand}}`.
    Operator {
        /// The field the operator applies to.
        field: FieldPath,
        /// The operator.
        operator: Operator,
    },
    /// Several operators on one field: `{field: {op1: operand1, op2: operand2}}`.
    Operators {
        /// The field the operators apply to.
        field: FieldPath,
        /// The operators, in emission order.
        operators: Vec<Operator>,
    },
    /// A logical connective over child expressions: `{connective: [child, ...]}`.
    Logical {
        /// The connective.
        op: LogicalOp,
        /// The children, never empty.
        exprs: Vec<Expression>,
    },
}

/// A filter expression.
#[derive(Debug, Clone)]
pub struct Expression(Arc<ExprKind>);

impl Expression {
    fn from_kind(kind: ExprKind) -> Self {
        Expression(Arc::new(kind))
    }

    /// Creates an implicit-equality leaf.
    pub fn value(field: FieldPath, value: Bson) -> Self {
        Expression::from_kind(ExprKind::Value { field, value })
    }

    /// Creates a single-operator leaf.
    pub fn operator(field: FieldPath, operator: Operator) -> Self {
        Expression::from_kind(ExprKind::Operator { field, operator })
    }

    /// Creates an operator-list leaf.
    pub fn operators(field: FieldPath, operators: Vec<Operator>) -> Self {
        Expression::from_kind(ExprKind::Operators { field, operators })
    }

    /// Returns the node shape.
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Returns the field path of a leaf, or `None` for logical nodes.
    pub fn field(&self) -> Option<&FieldPath> {
        match self.kind() {
            ExprKind::Value { field, .. }
            | ExprKind::Operator { field, .. }
            | ExprKind::Operators { field, .. } => Some(field),
            ExprKind::Logical { .. } => None,
        }
    }

    fn combine(self, op: LogicalOp, more: impl IntoIterator<Item = Expression>) -> Self {
        let exprs = std::iter::once(self).chain(more).collect();

        Expression::from_kind(ExprKind::Logical { op, exprs })
    }

    /// Combines this expression with `more` using logical AND.
    ///
    /// The result is a new `$and` node with children `[self, more...]`.
    pub fn and(self, more: impl IntoIterator<Item = Expression>) -> Self {
        self.combine(LogicalOp::And, more)
    }

    /// Combines this expression with `more` using logical OR.
    ///
    /// The result is a new `$or` node with children `[self, more...]`.
    pub fn or(self, more: impl IntoIterator<Item = Expression>) -> Self {
        self.combine(LogicalOp::Or, more)
    }

    /// Combines this expression with `more` using logical NOR.
    pub fn nor(self, more: impl IntoIterator<Item = Expression>) -> Self {
        self.combine(LogicalOp::Nor, more)
    }

    /// Lowers the expression into its query document.
    pub fn to_document(&self) -> Document {
        let document = BsonTranslator.visit_expr(self);
        tracing::trace!(filter = %render_document(&document), "serialized filter expression");
        document
    }

    /// Encodes the query document into BSON bytes.
    pub fn to_bytes(&self) -> QueryResult<Vec<u8>> {
        Ok(bson::ser::serialize_to_vec(&self.to_document())?)
    }

    /// Renders the query document as relaxed extended JSON.
    pub fn to_extended_json(&self) -> Value {
        Bson::Document(self.to_document()).into_relaxed_extjson()
    }

    /// Renders the query document as a relaxed extended JSON string.
    pub fn to_json_string(&self) -> QueryResult<String> {
        Ok(serde_json::to_string(&self.to_extended_json())?)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_document(&self.to_document()))
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl From<Expression> for Document {
    fn from(expr: Expression) -> Self {
        expr.to_document()
    }
}

impl From<&Expression> for Document {
    fn from(expr: &Expression) -> Self {
        expr.to_document()
    }
}

/// Walks an expression tree, producing one output per node.
///
/// Implementors handle each node shape; [`ExpressionVisitor::visit_expr`] dispatches on the shape.
pub trait ExpressionVisitor {
    /// The value produced for each visited node.
    type Output;

    /// Visits a logical node.
    fn visit_logical(&mut self, op: LogicalOp, exprs: &[Expression]) -> Self::Output;

    /// Visits an implicit-equality leaf.
    fn visit_value(&mut self, field: &FieldPath, value: &Bson) -> Self::Output;

    /// Visits a single-operator leaf.
    fn visit_operator(&mut self, field: &FieldPath, operator: &Operator) -> Self::Output;

    /// Visits an operator-list leaf.
    fn visit_operators(&mut self, field: &FieldPath, operators: &[Operator]) -> Self::Output;

    /// Dispatches on the shape of `expr`.
    fn visit_expr(&mut self, expr: &Expression) -> Self::Output {
        match expr.kind() {
            ExprKind::Logical { op, exprs } => self.visit_logical(*op, exprs),
            ExprKind::Value { field, value } => self.visit_value(field, value),
            ExprKind::Operator { field, operator } => self.visit_operator(field, operator),
            ExprKind::Operators { field, operators } => self.visit_operators(field, operators),
        }
    }
}

#[cfg(test)]
mod tests {
    use bson::{Decimal128, doc};
    use proptest::prelude::*;

    use super::*;
    use crate::{field::{ArrayField, Field}, operator::RegexOption};

    fn size_h() -> Field {
        Field::from_static("size.h")
    }

    fn size_uom() -> Field {
        Field::from_static("size.uom")
    }

    fn status() -> Field {
        Field::from_static("status")
    }

    #[test]
    fn test_should_serialize_equals_as_bare_value() {
        assert_eq!(size_uom().equals("in").to_document(), doc! { "size.uom": "in" });
    }

    #[test]
    fn test_should_wrap_comparison_operators() {
        let f = Field::from_static("qty");
        assert_eq!(f.not_equals(1).to_document(), doc! { "qty": { "$ne": 1 } });
        assert_eq!(f.gt(1).to_document(), doc! { "qty": { "$gt": 1 } });
        assert_eq!(f.gte(1).to_document(), doc! { "qty": { "$gte": 1 } });
        assert_eq!(f.lt(1).to_document(), doc! { "qty": { "$lt": 1 } });
        assert_eq!(f.lte(1).to_document(), doc! { "qty": { "$lte": 1 } });
    }

    #[test]
    fn test_should_serialize_set_and_existence_operators() {
        let url = Field::from_static("listing_url");
        assert_eq!(
            url.is_in(["a", "b", "a"]).to_document(),
            doc! { "listing_url": { "$in": ["a", "b", "a"] } },
        );
        assert_eq!(url.not_in(["a"]).to_document(), doc! { "listing_url": { "$nin": ["a"] } });
        assert_eq!(url.exists().to_document(), doc! { "listing_url": { "$exists": true } });
        assert_eq!(url.not_exists().to_document(), doc! { "listing_url": { "$exists": false } });
    }

    #[test]
    fn test_should_serialize_array_operators() {
        let amenities = ArrayField::from_static("amenities");
        assert_eq!(
            amenities.contains_all(["Wifi", "Kitchen", "Iron"]).to_document(),
            doc! { "amenities": { "$all": ["Wifi", "Kitchen", "Iron"] } },
        );
        assert_eq!(amenities.size(15).to_document(), doc! { "amenities": { "$size": 15 } });
    }

    #[test]
    fn test_should_serialize_simple_and() {
        let expr = size_h().lt(15).and([size_uom().equals("in")]);
        assert_eq!(
            expr.to_document(),
            doc! { "$and": [ { "size.h": { "$lt": 15 } }, { "size.uom": "in" } ] },
        );
    }

    #[test]
    fn test_should_serialize_and_with_three_parts() {
        let expr = size_h().lt(15).and([size_uom().equals("in"), status().equals("D")]);
        assert_eq!(
            expr.to_document(),
            doc! { "$and": [ { "size.h": { "$lt": 15 } }, { "size.uom": "in" }, { "status": "D" } ] },
        );
    }

    #[test]
    fn test_should_serialize_simple_or() {
        let expr = size_h().lt(15).or([size_uom().equals("in")]);
        assert_eq!(
            expr.to_document(),
            doc! { "$or": [ { "size.h": { "$lt": 15 } }, { "size.uom": "in" } ] },
        );
    }

    #[test]
    fn test_should_keep_chained_combinations_nested() {
        let a = size_h().lt(15);
        let b = size_uom().equals("in");
        let c = status().equals("D");

        let nested = a.clone().and([b.clone()]).and([c.clone()]);
        let flat = a.and([b, c]);

        assert_eq!(
            nested.to_document(),
            doc! { "$and": [ { "$and": [ { "size.h": { "$lt": 15 } }, { "size.uom": "in" } ] }, { "status": "D" } ] },
        );
        assert_ne!(nested.to_document(), flat.to_document());
    }

    #[test]
    fn test_should_serialize_nor() {
        let expr = status().equals("A").nor([status().equals("D")]);
        assert_eq!(expr.to_document(), doc! { "$nor": [ { "status": "A" }, { "status": "D" } ] });
    }

    #[test]
    fn test_should_reuse_shared_expression() {
        let shared = status().equals("A");
        let first = shared.clone().and([size_h().lt(1)]);
        let second = size_h().gt(9).or([shared.clone()]);

        assert_eq!(shared.to_document(), doc! { "status": "A" });
        assert_eq!(first.to_document().get_array("$and").map(Vec::len).ok(), Some(2));
        assert_eq!(second.to_document().get_array("$or").map(Vec::len).ok(), Some(2));
    }

    #[test]
    fn test_should_serialize_regex_without_options() {
        let name = Field::from_static("reviews.reviewer_name");
        assert_eq!(
            name.regex("Mi.*", []).to_document(),
            doc! { "reviews.reviewer_name": { "$regex": "Mi.*" } },
        );
    }

    #[test]
    fn test_should_serialize_regex_options_after_pattern() {
        let name = Field::from_static("name");
        let document = name
            .regex("i.*", [RegexOption::CaseInsensitive, RegexOption::Multiline])
            .to_document();

        assert_eq!(document, doc! { "name": { "$regex": "i.*", "$options": "im" } });
        let keys = document
            .get_document("name")
            .map(|block| block.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        assert_eq!(keys, vec!["$regex".to_string(), "$options".to_string()]);
    }

    #[test]
    fn test_should_serialize_not() {
        let price = Field::from_static("price");
        assert_eq!(
            price.not(Operator::gt(1.99)).to_document(),
            doc! { "price": { "$not": { "$gt": 1.99 } } },
        );
    }

    #[test]
    fn test_should_serialize_elem_match_over_expressions() {
        let results = ArrayField::from_static("results");
        let product = Field::from_static("product");
        let score = Field::from_static("score");

        assert_eq!(
            results
                .elem_match_expressions([product.equals("xyz"), score.gte(8)])
                .to_document(),
            doc! { "results": { "$elemMatch": { "product": "xyz", "score": { "$gte": 8 } } } },
        );
    }

    #[test]
    fn test_should_fall_back_to_and_for_colliding_elem_match_keys() {
        let results = ArrayField::from_static("results");
        let score = Field::from_static("score");

        assert_eq!(
            results
                .elem_match_expressions([score.gte(8), score.lt(10)])
                .to_document(),
            doc! { "results": { "$elemMatch": { "$and": [ { "score": { "$gte": 8 } }, { "score": { "$lt": 10 } } ] } } },
        );
    }

    #[test]
    fn test_should_report_field_of_leaves_only() {
        assert_eq!(status().exists().field().map(FieldPath::as_str), Some("status"));
        assert!(status().exists().and([size_h().exists()]).field().is_none());
    }

    #[test]
    fn test_should_marshal_to_encoded_document() {
        let expr = Field::from_static("bedrooms").gt(6).and([
            Field::from_static("bathrooms").gte(Bson::Decimal128(Decimal128::from_bytes([0; 16]))),
        ]);

        let bytes = expr.to_bytes().expect("encodable");
        let decoded: Document = bson::de::deserialize_from_slice(&bytes).expect("decodable");
        assert_eq!(decoded, expr.to_document());
    }

    #[test]
    fn test_should_reject_unencodable_key() {
        let expr = Field::new("bad\0key".to_string()).equals(1);
        assert!(expr.to_bytes().is_err());
    }

    #[test]
    fn test_should_serialize_through_serde() {
        let expr = Field::from_static("bedrooms").gt(6);
        let bson = bson::ser::serialize_to_bson(&expr).expect("serializable");
        assert_eq!(bson, Bson::Document(doc! { "bedrooms": { "$gt": 6 } }));
    }

    #[test]
    fn test_should_render_extended_json() {
        let expr = Field::from_static("bedrooms").gt(6);
        assert_eq!(
            expr.to_json_string().expect("renderable"),
            r#"{"bedrooms":{"$gt":6}}"#,
        );
    }

    #[test]
    fn test_should_render_debug_string() {
        let expr = size_h().lt(15).and([size_uom().equals("in")]);
        assert_eq!(
            expr.to_string(),
            r#"{"$and": [{"size.h": {"$lt": 15}}, {"size.uom": "in"}]}"#,
        );
    }

    #[test]
    fn test_should_compare_dates() {
        let scraped = Field::from_static("last_scraped");
        let when = chrono::DateTime::parse_from_rfc3339("2019-02-16T05:00:00Z")
            .expect("valid date")
            .with_timezone(&chrono::Utc);

        assert_eq!(
            scraped.gte(bson::DateTime::from_chrono(when)).to_document(),
            doc! { "last_scraped": { "$gte": bson::DateTime::from_chrono(when) } },
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_should_be_shareable_across_threads() {
        assert_send_sync::<Expression>();
        assert_send_sync::<Operator>();
        assert_send_sync::<crate::update::UpdateExpression>();
    }

    #[test]
    fn test_should_serialize_shared_expression_from_many_threads() {
        let expr = Field::from_static("bedrooms").gt(6).and([
            ArrayField::from_static("amenities").contains_all(["Wifi", "Kitchen"]),
            status().is_in(["A", "D"]),
        ]);
        let expected = expr.to_document();

        let documents = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| expr.to_document()))
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().expect("serializer thread panicked"))
                .collect::<Vec<_>>()
        });

        assert_eq!(documents.len(), 8);
        assert!(documents.iter().all(|document| *document == expected));
    }

    proptest! {
        #[test]
        fn prop_and_preserves_child_order(values in proptest::collection::vec(any::<i64>(), 1..8)) {
            let first = Field::from_static("n").equals(values[0]);
            let rest = values[1..].iter().map(|v| Field::from_static("n").equals(*v)).collect::<Vec<_>>();
            let expected = values.iter().map(|v| Bson::Document(doc! { "n": *v })).collect::<Vec<_>>();

            prop_assert_eq!(first.and(rest).to_document(), doc! { "$and": expected });
        }

        #[test]
        fn prop_gt_wraps_any_value(path in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}", value in any::<i32>()) {
            let expr = Field::new(path.clone()).gt(value);
            let mut expected = Document::new();
            expected.insert(path, doc! { "$gt": value });

            prop_assert_eq!(expr.to_document(), expected);
        }

        #[test]
        fn prop_marshal_matches_document(values in proptest::collection::vec(any::<i32>(), 0..6)) {
            let expr = ArrayField::from_static("xs").contains_all(values.clone())
                .or([Field::from_static("y").is_in(values)]);
            let bytes = expr.to_bytes().expect("encodable");
            let decoded: Document = bson::de::deserialize_from_slice(&bytes).expect("decodable");

            prop_assert_eq!(decoded, expr.to_document());
        }
    }
}
