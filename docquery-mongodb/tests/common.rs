use docquery_mongodb::MongoQueryStore;

pub const LISTINGS: &str = "listingsAndReviews";

/// Connects to the database named by `DOCQUERY_MONGODB_URI`, or returns `None` when it is unset.
///
/// The suites expect the `sample_airbnb` dataset. `DOCQUERY_MONGODB_DATABASE` overrides the
/// database name.
pub async fn store() -> Option<MongoQueryStore> {
    let Ok(uri) = std::env::var("DOCQUERY_MONGODB_URI") else {
        eprintln!("DOCQUERY_MONGODB_URI is not set, skipping");
        return None;
    };
    let database = std::env::var("DOCQUERY_MONGODB_DATABASE")
        .unwrap_or_else(|_| "sample_airbnb".to_string());

    Some(
        MongoQueryStore::builder(&uri, &database)
            .build()
            .await
            .expect("failed to create client"),
    )
}
