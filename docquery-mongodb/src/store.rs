//! Connection holder for a single MongoDB database.

use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{Client, Collection, options::ClientOptions};

use docquery_core::error::{QueryError, QueryResult};

/// A MongoDB client bound to one database.
#[derive(Debug, Clone)]
pub struct MongoQueryStore {
    client: Client,
    database: String,
}

impl MongoQueryStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoQueryStoreBuilder {
        MongoQueryStoreBuilder::new(dsn, database)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Returns a typed handle to `name`. Documents are decoded into `T` on read.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.client.database(&self.database).collection(name)
    }

    /// Copies every document of `source` into `target`, replacing `target` if it exists.
    pub async fn clone_collection(&self, source: &str, target: &str) -> QueryResult<()> {
        tracing::debug!(source, target, "cloning collection");

        self.collection::<Document>(source)
            .aggregate([doc! { "$match": {} }, doc! { "$out": target }])
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))?;

        Ok(())
    }

    pub async fn drop_collection(&self, name: &str) -> QueryResult<()> {
        self.collection::<Document>(name)
            .drop()
            .await
            .map_err(|e| QueryError::Backend(e.to_string()))?;

        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

/// Builds a [`MongoQueryStore`] from a connection string.
pub struct MongoQueryStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoQueryStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }

    /// Parses the connection string and creates the client.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the first operation
    /// rather than here.
    pub async fn build(self) -> QueryResult<MongoQueryStore> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| QueryError::Initialization(e.to_string()))?;

        Ok(MongoQueryStore::new(
            Client::with_options(options).map_err(|e| QueryError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
