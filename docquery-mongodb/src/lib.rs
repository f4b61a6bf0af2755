//! MongoDB adapter for docquery.
//!
//! Filter and update expressions already lower to plain [`bson::Document`] values, so any driver
//! call can take them directly. This crate adds the glue that is otherwise repeated in every
//! project: a small connection holder and an extension trait that runs expressions against a
//! [`mongodb::Collection`].
//!
//! To use this adapter, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docquery = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docquery::{field::Field, mongodb::{ExpressionCollectionExt, MongoQueryStore}};
//! use bson::Document;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoQueryStore::builder("mongodb://localhost:27017", "sample_airbnb")
//!         .build()
//!         .await?;
//!
//!     let listings = store.collection::<Document>("listingsAndReviews");
//!     let large = listings
//!         .count_matching(&Field::from_static("bedrooms").gt(6))
//!         .await?;
//!
//!     println!("{large} listings with more than six bedrooms");
//!
//!     store.shutdown().await;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docquery_mongodb;

pub mod query;
pub mod store;

pub use query::{ExpressionCollectionExt, UpdateCounts};
pub use store::{MongoQueryStore, MongoQueryStoreBuilder};
