//! Typed filter and update expressions for document databases.
//!
//! This crate is the core of the docquery project and provides:
//!
//! - **Field handles** ([`field`]) - Typed dot-path handles for scalar and array fields
//! - **Operators** ([`operator`]) - The closed vocabulary of query, logical and update operators
//! - **Filter expressions** ([`expression`]) - Immutable expression trees and their visitor
//! - **Update expressions** ([`update`]) - Update directives grouped by operator on output
//! - **Field sets** ([`schema`]) - Traits implemented by `#[derive(QueryFields)]`
//! - **Rendering** ([`render`]) - Human-readable output for logs and `Display`
//! - **Error handling** ([`error`]) - Error and result types
//!
//! Nothing here talks to a database. Expressions lower to [`bson::Document`] values (and bytes)
//! that any MongoDB-compatible client accepts as filter or update arguments.
//!
//! # Example
//!
//! ```ignore
//! use docquery_core::field::{ArrayField, Field};
//! use bson::doc;
//!
//! let bedrooms = Field::from_static("bedrooms");
//! let amenities = ArrayField::from_static("amenities");
//!
//! let filter = bedrooms.gt(8).and([amenities.contains_all(["Wifi"])]);
//!
//! assert_eq!(
//!     filter.to_document(),
//!     doc! { "$and": [ { "bedrooms": { "$gt": 8 } }, { "amenities": { "$all": ["Wifi"] } } ] },
//! );
//! ```

#[allow(unused_extern_crates)]
extern crate self as docquery_core;

pub mod error;
pub mod expression;
pub mod field;
pub mod operator;
pub mod render;
pub mod schema;
pub mod update;

mod translate;
