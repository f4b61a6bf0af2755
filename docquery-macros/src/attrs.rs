//! Parsing of `#[query(...)]` and the relevant subset of `#[serde(...)]` attributes.

use syn::{Attribute, LitStr, meta::ParseNestedMeta, token};

/// Field-level settings gathered from attributes.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) query_rename: Option<String>,
    pub(crate) serde_rename: Option<String>,
    pub(crate) nested: bool,
    pub(crate) skip: bool,
}

impl FieldAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = FieldAttrs::default();

        for attr in attrs {
            if attr.path().is_ident("query") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        parsed.query_rename = Some(meta.value()?.parse::<LitStr>()?.value());
                    } else if meta.path.is_ident("nested") {
                        parsed.nested = true;
                    } else if meta.path.is_ident("skip") {
                        parsed.skip = true;
                    } else {
                        return Err(meta.error("expected `rename = \"...\"`, `nested` or `skip`"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                        parsed.serde_rename = Some(meta.value()?.parse::<LitStr>()?.value());
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                        parsed.skip = true;
                    } else {
                        ignore(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }

        Ok(parsed)
    }

    /// Resolves the path segment for a field named `name`.
    pub(crate) fn segment(&self, name: &str, rename_all: Option<&RenameRule>) -> String {
        if let Some(rename) = self.query_rename.as_ref().or(self.serde_rename.as_ref()) {
            return rename.clone();
        }

        match rename_all {
            Some(rule) => rule.apply(name),
            None => name.to_lowercase(),
        }
    }
}

/// Container-level naming rule from `#[serde(rename_all = "...")]`.
pub(crate) enum RenameRule {
    Lower,
    Upper,
    Snake,
    ScreamingSnake,
    Camel,
    Pascal,
    Kebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "camelCase" => RenameRule::Camel,
            "PascalCase" => RenameRule::Pascal,
            "kebab-case" => RenameRule::Kebab,
            _ => return Err(syn::Error::new(lit.span(), "unsupported rename_all rule")),
        })
    }

    pub(crate) fn apply(&self, name: &str) -> String {
        match self {
            RenameRule::Lower => name.to_lowercase(),
            RenameRule::Upper | RenameRule::ScreamingSnake => name.to_uppercase(),
            RenameRule::Snake => name.to_string(),
            RenameRule::Kebab => name.replace('_', "-"),
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply(name);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            RenameRule::Pascal => name
                .split('_')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect(),
        }
    }
}

/// Reads `rename_all` from container attributes.
pub(crate) fn rename_all(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                rule = Some(RenameRule::from_lit(&meta.value()?.parse::<LitStr>()?)?);
            } else {
                ignore(&meta)?;
            }
            Ok(())
        })?;
    }

    Ok(rule)
}

/// Consumes the value of a serde option this macro does not care about.
fn ignore(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn test_should_apply_rename_rules() {
        let name = "last_reading_at";

        assert_eq!(RenameRule::Lower.apply(name), "last_reading_at");
        assert_eq!(RenameRule::Upper.apply(name), "LAST_READING_AT");
        assert_eq!(RenameRule::ScreamingSnake.apply(name), "LAST_READING_AT");
        assert_eq!(RenameRule::Camel.apply(name), "lastReadingAt");
        assert_eq!(RenameRule::Pascal.apply(name), "LastReadingAt");
        assert_eq!(RenameRule::Kebab.apply(name), "last-reading-at");
    }

    #[test]
    fn test_should_prefer_query_rename_over_serde_rename() {
        let field: syn::Field = parse_quote! {
            #[serde(rename = "serde_name", default)]
            #[query(rename = "query_name")]
            name: String
        };
        let attrs = FieldAttrs::parse(&field.attrs).expect("valid attributes");

        assert_eq!(attrs.segment("name", Some(&RenameRule::Upper)), "query_name");
    }

    #[test]
    fn test_should_ignore_unrelated_serde_options() {
        let field: syn::Field = parse_quote! {
            #[serde(default = "default_name", with = "module", deserialize_with = "path")]
            #[serde(rename(serialize = "a", deserialize = "b"))]
            Name: String
        };
        let attrs = FieldAttrs::parse(&field.attrs).expect("valid attributes");

        assert!(!attrs.skip);
        assert_eq!(attrs.segment("Name", None), "name");
    }

    #[test]
    fn test_should_skip_serde_skipped_fields() {
        let field: syn::Field = parse_quote! {
            #[serde(skip_serializing)]
            cache: u64
        };
        assert!(FieldAttrs::parse(&field.attrs).expect("valid attributes").skip);
    }
}
