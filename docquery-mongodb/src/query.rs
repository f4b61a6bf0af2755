//! Running filter and update expressions against MongoDB collections.
//!
//! Expressions are lowered with [`Expression::to_document`] and
//! [`UpdateExpression::try_to_document`]. Updates are serialized strictly here: a payload that is
//! not an update operator fails the call instead of being dropped silently before a write.

use async_trait::async_trait;
use bson::Document;
use futures::TryStreamExt;
use mongodb::Collection;
use serde::de::DeserializeOwned;

use docquery_core::{
    error::{QueryError, QueryResult},
    expression::Expression,
    render::render_document,
    update::UpdateExpression,
};

/// Document counts reported by an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCounts {
    /// Documents that matched the filter.
    pub matched: u64,
    /// Documents that were actually changed.
    pub modified: u64,
}

/// Runs docquery expressions against a [`Collection`].
#[async_trait]
pub trait ExpressionCollectionExt<T> {
    /// Returns every document matching `filter`.
    async fn find_matching(&self, filter: &Expression) -> QueryResult<Vec<T>>;

    /// Counts the documents matching `filter`.
    async fn count_matching(&self, filter: &Expression) -> QueryResult<u64>;

    /// Applies `update` to the first document matching `filter`.
    async fn update_one_matching(
        &self,
        filter: &Expression,
        update: &UpdateExpression,
    ) -> QueryResult<UpdateCounts>;

    /// Applies `update` to every document matching `filter`.
    async fn update_many_matching(
        &self,
        filter: &Expression,
        update: &UpdateExpression,
    ) -> QueryResult<UpdateCounts>;
}

#[async_trait]
impl<T> ExpressionCollectionExt<T> for Collection<T>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    async fn find_matching(&self, filter: &Expression) -> QueryResult<Vec<T>> {
        let filter = filter.to_document();
        tracing::debug!(collection = %self.name(), filter = %render_document(&filter), "find");

        self.find(filter)
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))?
            .try_collect::<Vec<T>>()
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))
    }

    async fn count_matching(&self, filter: &Expression) -> QueryResult<u64> {
        let filter = filter.to_document();
        tracing::debug!(collection = %self.name(), filter = %render_document(&filter), "count");

        self.count_documents(filter)
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))
    }

    async fn update_one_matching(
        &self,
        filter: &Expression,
        update: &UpdateExpression,
    ) -> QueryResult<UpdateCounts> {
        let (filter, update) = (filter.to_document(), update_document(update)?);
        tracing::debug!(
            collection = %self.name(),
            filter = %render_document(&filter),
            update = %render_document(&update),
            "update one"
        );

        let result = self
            .update_one(filter, update)
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))?;

        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn update_many_matching(
        &self,
        filter: &Expression,
        update: &UpdateExpression,
    ) -> QueryResult<UpdateCounts> {
        let (filter, update) = (filter.to_document(), update_document(update)?);
        tracing::debug!(
            collection = %self.name(),
            filter = %render_document(&filter),
            update = %render_document(&update),
            "update many"
        );

        let result = self
            .update_many(filter, update)
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))?;

        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }
}

/// Serializes `update` strictly and refuses an empty result, which the server would reject.
fn update_document(update: &UpdateExpression) -> QueryResult<Document> {
    let document = update.try_to_document()?;

    if document.is_empty() {
        return Err(QueryError::Serialization(
            "update expression contains no update operators".to_string(),
        ));
    }

    Ok(document)
}
