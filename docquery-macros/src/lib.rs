//! Procedural macros for the docquery project.
//!
//! `#[derive(QueryFields)]` reads a data-model struct and generates a matching struct of typed
//! field handles, so filters and updates can be written against `listing.bedrooms` instead of the
//! string `"bedrooms"`.
//!
//! # Field paths
//!
//! Each member's path segment is taken from, in order:
//!
//! 1. `#[query(rename = "...")]`
//! 2. `#[serde(rename = "...")]`
//! 3. the container's `#[serde(rename_all = "...")]` rule applied to the field name
//! 4. the lower-cased field name
//!
//! Members of nested structs are prefixed with the parent's path, e.g. `address.location.type`.
//!
//! # Member kinds
//!
//! - sequence types (`Vec`, `VecDeque`, `HashSet`, `BTreeSet`, `LinkedList`, arrays, slices,
//!   optionally wrapped in `Option`) become `ArrayField`
//! - `#[query(nested)]` on a struct member becomes that struct's field set
//! - `#[query(nested)]` on a sequence of structs becomes `Elements<...>`, addressable by index
//! - everything else becomes `Field`
//!
//! `#[query(skip)]`, `#[serde(skip)]` and `#[serde(skip_serializing)]` leave a member out.

#[allow(unused_extern_crates)]
extern crate self as docquery_macros;

mod attrs;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Fields, GenericArgument, PathArguments, Type, parse_macro_input,
    spanned::Spanned,
};

use crate::attrs::{FieldAttrs, rename_all};

/// Derives typed field handles for a struct with named fields.
///
/// See the crate documentation for the supported attributes.
#[proc_macro_derive(QueryFields, attributes(query))]
pub fn derive_query_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// How a member is exposed in the generated field set.
enum MemberKind {
    Scalar,
    Array,
    Nested(Type),
    NestedArray(Type),
}

/// One member of the generated field set.
struct Member {
    ident: syn::Ident,
    segment: String,
    kind: MemberKind,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if let Some(param) = input.generics.type_params().next() {
        return Err(syn::Error::new(
            param.span(),
            "QueryFields cannot be derived for structs with type parameters",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "QueryFields requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "QueryFields can only be derived for structs",
            ));
        }
    };

    let rule = rename_all(&input.attrs)?;
    let mut members = Vec::new();

    for field in fields {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);

        let kind = match (attrs.nested, sequence_element(&field.ty)) {
            (true, Some(element)) => MemberKind::NestedArray(element.clone()),
            (true, None) => MemberKind::Nested(unwrap_option(&field.ty).clone()),
            (false, Some(_)) => MemberKind::Array,
            (false, None) => MemberKind::Scalar,
        };

        members.push(Member {
            segment: attrs.segment(name, rule.as_ref()),
            ident,
            kind,
        });
    }

    Ok(generate(input, &members))
}

fn generate(input: &DeriveInput, members: &[Member]) -> TokenStream2 {
    let name = &input.ident;
    let vis = &input.vis;
    let fields_ident = format_ident!("{}Fields", name);
    let doc = format!("Query field handles for [`{name}`].");
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let declarations = members.iter().map(|member| {
        let ident = &member.ident;
        let ty = match &member.kind {
            MemberKind::Scalar => quote! { ::docquery::field::Field },
            MemberKind::Array => quote! { ::docquery::field::ArrayField },
            MemberKind::Nested(ty) => quote! {
                <#ty as ::docquery::schema::QueryFields>::Fields
            },
            MemberKind::NestedArray(ty) => quote! {
                ::docquery::schema::Elements<<#ty as ::docquery::schema::QueryFields>::Fields>
            },
        };
        let doc = format!("Handle for `{}`.", member.segment);

        quote! {
            #[doc = #doc]
            pub #ident: #ty
        }
    });

    let initializers = members.iter().map(|member| {
        let ident = &member.ident;
        let segment = &member.segment;
        let path = quote! { ::docquery::field::FieldPath::join(prefix, #segment) };
        let value = match &member.kind {
            MemberKind::Scalar => quote! { ::docquery::field::Field::new(#path) },
            MemberKind::Array => quote! { ::docquery::field::ArrayField::new(#path) },
            MemberKind::Nested(ty) => quote! {
                <<#ty as ::docquery::schema::QueryFields>::Fields as ::docquery::schema::FieldSet>::rooted_at(
                    ::core::option::Option::Some(&#path),
                )
            },
            MemberKind::NestedArray(_) => quote! { ::docquery::schema::Elements::new(#path) },
        };

        quote! { #ident: #value }
    });

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        #vis struct #fields_ident {
            #(#declarations,)*
        }

        impl ::docquery::schema::FieldSet for #fields_ident {
            #[allow(unused_variables)]
            fn rooted_at(prefix: ::core::option::Option<&::docquery::field::FieldPath>) -> Self {
                #fields_ident {
                    #(#initializers,)*
                }
            }
        }

        impl #impl_generics ::docquery::schema::QueryFields for #name #ty_generics #where_clause {
            type Fields = #fields_ident;
        }
    }
}

/// Strips one layer of `Option<...>`.
fn unwrap_option(ty: &Type) -> &Type {
    match single_generic(ty, &["Option", "Box"]) {
        Some(inner) => unwrap_option(inner),
        None => ty,
    }
}

/// Returns the element type if `ty` is a sequence, looking through `Option`.
fn sequence_element(ty: &Type) -> Option<&Type> {
    let ty = unwrap_option(ty);

    match ty {
        Type::Array(array) => Some(&array.elem),
        Type::Slice(slice) => Some(&slice.elem),
        Type::Reference(reference) => sequence_element(&reference.elem),
        _ => single_generic(ty, &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList"]),
    }
}

/// Returns the first generic argument of a path type whose last segment is one of `names`.
fn single_generic<'a>(ty: &'a Type, names: &[&str]) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if !names.iter().any(|name| segment.ident == name) {
        return None;
    }

    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn error_message(input: DeriveInput) -> String {
        expand(&input).err().map(|e| e.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_should_reject_type_parameters() {
        let input = parse_quote! {
            struct Wrapper<T> { value: T }
        };
        assert!(error_message(input).contains("type parameters"));
    }

    #[test]
    fn test_should_reject_tuple_structs() {
        let input = parse_quote! {
            struct Pair(i32, i32);
        };
        assert!(error_message(input).contains("named fields"));
    }

    #[test]
    fn test_should_reject_enums() {
        let input = parse_quote! {
            enum Status { Active, Closed }
        };
        assert!(error_message(input).contains("only be derived for structs"));
    }

    #[test]
    fn test_should_reject_unknown_query_option() {
        let input = parse_quote! {
            struct Listing {
                #[query(flatten)]
                name: String,
            }
        };
        assert!(error_message(input).contains("expected `rename"));
    }

    #[test]
    fn test_should_reject_unsupported_rename_all_rule() {
        let input = parse_quote! {
            #[serde(rename_all = "Train-Case")]
            struct Listing { listing_url: String }
        };
        assert!(error_message(input).contains("unsupported rename_all rule"));
    }

    #[test]
    fn test_should_accept_lifetimes() {
        let input = parse_quote! {
            struct Borrowed<'a> { name: &'a str }
        };
        assert!(expand(&input).is_ok());
    }

    #[test]
    fn test_should_generate_field_set_for_nested_arrays() {
        let input = parse_quote! {
            pub struct Listing {
                #[serde(rename = "_id")]
                id: String,
                amenities: Vec<String>,
                #[query(nested)]
                reviews: Vec<Review>,
                #[query(skip)]
                cache: u64,
            }
        };
        let generated = expand(&input).expect("expands").to_string();

        assert!(generated.contains("pub struct ListingFields"));
        assert!(generated.contains("\"_id\""));
        assert!(generated.contains("ArrayField"));
        assert!(generated.contains("Elements"));
        assert!(generated.contains("\"reviews\""));
        assert!(!generated.contains("cache"));
    }
}
