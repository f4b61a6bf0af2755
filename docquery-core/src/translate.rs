//! Translation of expression trees into BSON documents.
//!
//! Filters are lowered node by node through [`ExpressionVisitor`]. Updates are flattened first and
//! regrouped by update operator, because the wire format has one entry per operator rather than
//! one per field.

use bson::{Bson, Document};

use crate::{
    error::{QueryError, QueryResult},
    expression::{Expression, ExpressionVisitor},
    field::FieldPath,
    operator::{LogicalOp, Operand, Operator, UpdateOp},
    render::render_value,
    update::{UpdateExpression, UpdateOperator},
};

/// Lowers filter expressions into query documents.
pub(crate) struct BsonTranslator;

impl BsonTranslator {
    fn operand(&mut self, operand: &Operand) -> Bson {
        match operand {
            Operand::Value(value) => value.clone(),
            Operand::Operators(operators) => Bson::Document(self.operators(operators)),
            Operand::Expressions(exprs) => Bson::Document(self.merged(exprs)),
        }
    }

    fn operators(&mut self, operators: &[Operator]) -> Document {
        let mut block = Document::new();
        for operator in operators {
            block.insert(operator.symbol(), self.operand(operator.operand()));
        }
        block
    }

    /// Merges the entries of every sub-expression into one document.
    ///
    /// When two sub-expressions produce the same key the merge would drop a condition, so the
    /// sub-expressions are kept apart under `$and` instead.
    fn merged(&mut self, exprs: &[Expression]) -> Document {
        let documents = exprs
            .iter()
            .map(|expr| self.visit_expr(expr))
            .collect::<Vec<_>>();

        let mut merged = Document::new();
        for document in &documents {
            for (key, value) in document {
                if merged.contains_key(key) {
                    return self.visit_logical(LogicalOp::And, exprs);
                }
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

impl ExpressionVisitor for BsonTranslator {
    type Output = Document;

    fn visit_logical(&mut self, op: LogicalOp, exprs: &[Expression]) -> Self::Output {
        let children = exprs
            .iter()
            .map(|expr| Bson::Document(self.visit_expr(expr)))
            .collect::<Vec<_>>();

        let mut document = Document::new();
        document.insert(op.symbol(), children);
        document
    }

    fn visit_value(&mut self, field: &FieldPath, value: &Bson) -> Self::Output {
        let mut document = Document::new();
        document.insert(field.as_str(), value.clone());
        document
    }

    fn visit_operator(&mut self, field: &FieldPath, operator: &Operator) -> Self::Output {
        self.visit_operators(field, std::slice::from_ref(operator))
    }

    fn visit_operators(&mut self, field: &FieldPath, operators: &[Operator]) -> Self::Output {
        let mut document = Document::new();
        document.insert(field.as_str(), self.operators(operators));
        document
    }
}

/// How update payloads that are not update operators are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnrecognizedPolicy {
    /// Log a warning and leave the payload out.
    Skip,
    /// Fail the whole serialization.
    Reject,
}

/// Lowers update expressions into update documents.
///
/// Leaves are visited depth first. Each update operator gets one entry, positioned where the
/// operator first occurs; the entry lists every `field: value` pair using that operator in
/// visiting order.
pub(crate) struct UpdateTranslator {
    policy: UnrecognizedPolicy,
    groups: Vec<(UpdateOp, Document)>,
}

impl UpdateTranslator {
    pub(crate) fn new(policy: UnrecognizedPolicy) -> Self {
        UpdateTranslator { policy, groups: Vec::new() }
    }

    pub(crate) fn translate(mut self, update: &UpdateExpression) -> QueryResult<Document> {
        self.collect(update)?;

        Ok(self
            .groups
            .into_iter()
            .map(|(op, fields)| (op.symbol().to_string(), Bson::Document(fields)))
            .collect())
    }

    fn collect(&mut self, update: &UpdateExpression) -> QueryResult<()> {
        match update {
            UpdateExpression::Operator(operator) => {
                self.push(operator);
                Ok(())
            }
            UpdateExpression::Combined(updates) => {
                updates.iter().try_for_each(|update| self.collect(update))
            }
            UpdateExpression::Opaque(value) => match self.policy {
                UnrecognizedPolicy::Skip => {
                    tracing::warn!(
                        payload = %render_value(value),
                        "skipping update payload that is not an update operator"
                    );
                    Ok(())
                }
                UnrecognizedPolicy::Reject => {
                    Err(QueryError::UnrecognizedUpdate(render_value(value)))
                }
            },
        }
    }

    fn push(&mut self, operator: &UpdateOperator) {
        let index = match self.groups.iter().position(|(op, _)| *op == operator.op()) {
            Some(index) => index,
            None => {
                self.groups.push((operator.op(), Document::new()));
                self.groups.len() - 1
            }
        };

        self.groups[index]
            .1
            .insert(operator.field().as_str(), operator.value().clone());
    }
}
