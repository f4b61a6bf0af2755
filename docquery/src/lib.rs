//! Typed, composable filter and update expressions for document databases.
//!
//! This crate is the entry point of the docquery project. It re-exports the expression model from
//! `docquery-core`, the `#[derive(QueryFields)]` macro, and (behind the `mongodb` feature) the
//! MongoDB adapter.
//!
//! # Features
//!
//! - **Typed field handles** - Derive handles from your data model instead of writing path strings
//! - **Composable filters** - Comparison, membership, array, regex and logical operators
//! - **Grouped updates** - Update directives are collected per operator on output
//! - **Driver agnostic** - Everything lowers to plain BSON documents
//!
//! # Quick Start
//!
//! ```ignore
//! use docquery::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, QueryFields)]
//! pub struct Review {
//!     pub reviewer_name: String,
//! }
//!
//! #[derive(Debug, Serialize, Deserialize, QueryFields)]
//! pub struct Listing {
//!     pub listing_url: String,
//!     pub bedrooms: i32,
//!     pub amenities: Vec<String>,
//!     #[query(nested)]
//!     pub reviews: Vec<Review>,
//! }
//!
//! let listing = Listing::fields();
//!
//! // {"$and": [{"bedrooms": {"$gt": 8}}, {"amenities": {"$all": ["Wifi"]}}]}
//! let filter = listing.bedrooms.gt(8).and([listing.amenities.contains_all(["Wifi"])]);
//!
//! // {"reviews.50.reviewer_name": "Milo"}
//! let fiftieth = listing.reviews.element_no(50).reviewer_name.equals("Milo");
//!
//! // {"$set": {"listing_url": "..."}, "$inc": {"bedrooms": 1}}
//! let update = listing
//!     .listing_url
//!     .set("https://example.com")
//!     .and([listing.bedrooms.inc(1)]);
//!
//! println!("{filter} {fiftieth} {update}");
//! ```
//!
//! # Adapters
//!
//! - [`mongodb`] - Run expressions against a MongoDB collection (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docquery;

pub mod prelude;

pub use docquery_core::{error, expression, field, operator, render, schema, update};
pub use docquery_macros::QueryFields;

// Re-export BSON types for convenience
pub use bson;

/// MongoDB adapter.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docquery_mongodb::{
        ExpressionCollectionExt, MongoQueryStore, MongoQueryStoreBuilder, UpdateCounts,
    };
}
