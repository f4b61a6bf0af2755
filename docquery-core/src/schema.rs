//! Field sets generated from data-model structs.
//!
//! `#[derive(QueryFields)]` on a struct `Listing` generates a `ListingFields` struct holding one
//! handle per field and implements [`QueryFields`] for `Listing` and [`FieldSet`] for
//! `ListingFields`. Embedded documents marked `#[query(nested)]` become nested field sets; arrays
//! of embedded documents become [`Elements`], which can be indexed with
//! [`Elements::element_no`].
//!
//! ```ignore
//! use docquery::prelude::*;
//!
//! #[derive(QueryFields)]
//! struct Review {
//!     #[serde(rename = "reviewer_name")]
//!     reviewer_name: String,
//! }
//!
//! #[derive(QueryFields)]
//! struct Listing {
//!     bedrooms: i32,
//!     #[query(nested)]
//!     reviews: Vec<Review>,
//! }
//!
//! let listing = Listing::fields();
//! listing.reviews.reviewer_name.equals("Milo");            // reviews.reviewer_name
//! listing.reviews.element_no(50).reviewer_name.equals("Milo"); // reviews.50.reviewer_name
//! ```

use std::ops::Deref;

use crate::field::{ArrayField, FieldPath};

/// A set of field handles rooted at an optional path prefix.
pub trait FieldSet: Sized {
    /// Builds the handles with every path prefixed by `prefix`.
    fn rooted_at(prefix: Option<&FieldPath>) -> Self;
}

/// A data-model type with a generated field set.
pub trait QueryFields {
    /// The generated field set.
    type Fields: FieldSet;

    /// Returns the field set rooted at the document root.
    fn fields() -> Self::Fields {
        Self::Fields::rooted_at(None)
    }
}

/// Handles for an array of embedded documents.
///
/// Dereferences to the element field set without an index, which addresses the members of every
/// element (`reviews.reviewer_name`).
#[derive(Debug, Clone)]
pub struct Elements<F> {
    array: ArrayField,
    fields: F,
}

impl<F: FieldSet> Elements<F> {
    /// Builds the handles for the array at `path`.
    pub fn new(path: FieldPath) -> Self {
        let fields = F::rooted_at(Some(&path));

        Elements { array: ArrayField::from(path), fields }
    }

    /// Returns the handle for the array itself.
    pub fn array(&self) -> &ArrayField {
        &self.array
    }

    /// Returns the element field set rooted at `path.index`.
    pub fn element_no(&self, index: usize) -> F {
        F::rooted_at(Some(&self.array.path().index(index)))
    }
}

impl<F> Deref for Elements<F> {
    type Target = F;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;
    use crate::field::Field;

    #[derive(Debug, Clone)]
    struct ReviewFields {
        reviewer_name: Field,
    }

    impl FieldSet for ReviewFields {
        fn rooted_at(prefix: Option<&FieldPath>) -> Self {
            ReviewFields { reviewer_name: Field::new(FieldPath::join(prefix, "reviewer_name")) }
        }
    }

    struct Review;

    impl QueryFields for Review {
        type Fields = ReviewFields;
    }

    #[test]
    fn test_should_root_field_set_at_document() {
        assert_eq!(Review::fields().reviewer_name.path().as_str(), "reviewer_name");
    }

    #[test]
    fn test_should_address_every_element_without_index() {
        let reviews = Elements::<ReviewFields>::new(FieldPath::from_static("reviews"));
        assert_eq!(reviews.reviewer_name.path().as_str(), "reviews.reviewer_name");
    }

    #[test]
    fn test_should_address_single_element_with_index() {
        let reviews = Elements::<ReviewFields>::new(FieldPath::from_static("reviews"));
        let indexed = reviews.element_no(50);

        assert_eq!(indexed.reviewer_name.path().as_str(), "reviews.50.reviewer_name");
        assert_eq!(
            indexed.reviewer_name.equals("Milo").to_document(),
            doc! { "reviews.50.reviewer_name": "Milo" },
        );
        assert_ne!(indexed.reviewer_name, reviews.reviewer_name);
    }

    #[test]
    fn test_should_expose_array_handle() {
        let reviews = Elements::<ReviewFields>::new(FieldPath::from_static("reviews"));
        assert_eq!(reviews.array().size(3).to_document(), doc! { "reviews": { "$size": 3 } });
    }
}
