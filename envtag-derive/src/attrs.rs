//! Attribute parsing for `#[env(...)]` annotations.
//!
//! This module extracts and validates the annotations of a derived type and
//! its fields during macro expansion.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, Field, Lit};

/// Read an annotation value that is written either as a string or as a
/// number/boolean literal, returning its text.
fn literal_text(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: Lit = meta.value()?.parse()?;
    match lit {
        Lit::Str(s) => Ok(s.value()),
        Lit::Int(i) => Ok(i.base10_digits().to_string()),
        Lit::Float(f) => Ok(f.base10_digits().to_string()),
        Lit::Bool(b) => Ok(b.value.to_string()),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, number or boolean literal",
        )),
    }
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: Lit = meta.value()?.parse()?;
    match lit {
        Lit::Str(s) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// Parsed `#[env(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Comma-separated variable names, possibly `^`-prefixed.
    ///
    /// If `None`, the field name is converted to UPPER_SNAKE_CASE at runtime.
    pub name: Option<String>,

    /// Default value text used when no candidate variable is set.
    pub default: Option<String>,

    /// Regex delimiter for array and `Vec` values.
    pub delim: Option<String>,

    /// Required override; checked to be a boolean when decoding.
    pub required: Option<String>,

    /// Field is excluded from decoding.
    pub skip: bool,

    /// Field adds no name segment of its own.
    pub flatten: bool,
}

impl FieldAttrs {
    /// Extract and parse `#[env(...)]` attributes from a struct field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in env_attrs(&field.attrs) {
            attr.parse_nested_meta(|meta| {
                // name = "A,B"
                if meta.path.is_ident("name") {
                    attrs.name = Some(string_value(&meta)?);
                    return Ok(());
                }

                // default = "value" or default = 42
                if meta.path.is_ident("default") {
                    attrs.default = Some(literal_text(&meta)?);
                    return Ok(());
                }

                // delim = "regex"
                if meta.path.is_ident("delim") {
                    attrs.delim = Some(string_value(&meta)?);
                    return Ok(());
                }

                // required = false or required = "false"
                if meta.path.is_ident("required") {
                    attrs.required = Some(literal_text(&meta)?);
                    return Ok(());
                }

                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    return Ok(());
                }

                if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                    return Ok(());
                }

                Err(meta.error("unsupported env attribute"))
            })?;
        }

        if attrs.name.as_deref() == Some("-") {
            attrs.skip = true;
        }

        Ok(attrs)
    }
}

/// How a derived type decodes itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Field by field (structs) or through the single inner value (newtypes).
    #[default]
    Fields,
    /// Through `UnmarshalEnv`.
    Unmarshal,
    /// Through `UnmarshalText`.
    Text,
    /// Through `FromStr`.
    FromStr,
}

/// Parsed `#[env(...)]` attributes from the derived type itself.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// Prefix appended to the type's own names before its fields are resolved.
    pub prefix: Option<String>,

    /// Decoding strategy selected by `unmarshal`, `text` or `from_str`.
    pub strategy: Strategy,

    /// Run `ValidateEnv` after a successful decode.
    pub validate: bool,
}

const PREFIX_CONFLICT: &str = "`prefix` has no effect on types that decode themselves";

impl ContainerAttrs {
    /// Extract and parse `#[env(...)]` attributes from the derive input.
    pub fn from_attrs(input: &[Attribute]) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in env_attrs(input) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("prefix") {
                    attrs.prefix = Some(string_value(&meta)?);
                    if attrs.strategy != Strategy::Fields {
                        return Err(meta.error(PREFIX_CONFLICT));
                    }
                    return Ok(());
                }

                if meta.path.is_ident("validate") {
                    attrs.validate = true;
                    return Ok(());
                }

                let strategy = if meta.path.is_ident("unmarshal") {
                    Strategy::Unmarshal
                } else if meta.path.is_ident("text") {
                    Strategy::Text
                } else if meta.path.is_ident("from_str") {
                    Strategy::FromStr
                } else {
                    return Err(meta.error("unsupported container env attribute"));
                };

                if attrs.strategy != Strategy::Fields {
                    return Err(meta.error(
                        "only one of `unmarshal`, `text` and `from_str` can be used",
                    ));
                }
                if attrs.prefix.is_some() {
                    return Err(meta.error(PREFIX_CONFLICT));
                }
                attrs.strategy = strategy;
                Ok(())
            })?;
        }

        Ok(attrs)
    }
}

fn env_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("env"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput};

    #[test]
    fn test_parse_name_attribute() {
        let field: Field = parse_quote! {
            #[env(name = "TM_IN,TM_INPUT")]
            pub input: String
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.name, Some("TM_IN,TM_INPUT".to_string()));
        assert!(!attrs.skip);
    }

    #[test]
    fn test_parse_default_string() {
        let field: Field = parse_quote! {
            #[env(default = "1h")]
            pub duration: std::time::Duration
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.default, Some("1h".to_string()));
    }

    #[test]
    fn test_parse_default_number() {
        let field: Field = parse_quote! {
            #[env(default = 42)]
            pub field_name: i32
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.default, Some("42".to_string()));
    }

    #[test]
    fn test_parse_required_bool_and_string() {
        let field: Field = parse_quote! {
            #[env(required = false)]
            pub items: Vec<i32>
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.required, Some("false".to_string()));

        let field: Field = parse_quote! {
            #[env(required = "maybe")]
            pub items: Vec<i32>
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.required, Some("maybe".to_string()));
    }

    #[test]
    fn test_parse_skip() {
        let field: Field = parse_quote! {
            #[env(skip)]
            pub handle: u8
        };
        assert!(FieldAttrs::from_field(&field).unwrap().skip);

        let field: Field = parse_quote! {
            #[env(name = "-")]
            pub handle: u8
        };
        assert!(FieldAttrs::from_field(&field).unwrap().skip);
    }

    #[test]
    fn test_parse_multiple_attributes() {
        let field: Field = parse_quote! {
            #[env(name = "LIST", delim = r"\s*;\s*", flatten)]
            pub list: Vec<String>
        };

        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert_eq!(attrs.name, Some("LIST".to_string()));
        assert_eq!(attrs.delim, Some(r"\s*;\s*".to_string()));
        assert!(attrs.flatten);
    }

    #[test]
    fn test_parse_unknown_field_attribute() {
        let field: Field = parse_quote! {
            #[env(from_file)]
            pub secret: String
        };
        assert!(FieldAttrs::from_field(&field).is_err());
    }

    #[test]
    fn test_ignores_other_attributes() {
        let field: Field = parse_quote! {
            #[serde(rename = "x")]
            pub x: String
        };
        let attrs = FieldAttrs::from_field(&field).unwrap();
        assert!(attrs.name.is_none());
    }

    #[test]
    fn test_parse_container_attributes() {
        let input: DeriveInput = parse_quote! {
            #[env(prefix = "APP_", validate)]
            struct Config {}
        };
        let attrs = ContainerAttrs::from_attrs(&input.attrs).unwrap();
        assert_eq!(attrs.prefix, Some("APP_".to_string()));
        assert_eq!(attrs.strategy, Strategy::Fields);
        assert!(attrs.validate);

        let input: DeriveInput = parse_quote! {
            #[env(text)]
            struct Token {}
        };
        let attrs = ContainerAttrs::from_attrs(&input.attrs).unwrap();
        assert_eq!(attrs.strategy, Strategy::Text);
    }

    #[test]
    fn test_conflicting_strategies() {
        let input: DeriveInput = parse_quote! {
            #[env(text, from_str)]
            struct Token {}
        };
        assert!(ContainerAttrs::from_attrs(&input.attrs).is_err());

        let input: DeriveInput = parse_quote! {
            #[env(prefix = "X_", unmarshal)]
            struct Token {}
        };
        let err = ContainerAttrs::from_attrs(&input.attrs).unwrap_err();
        assert_eq!(err.to_string(), PREFIX_CONFLICT);

        let input: DeriveInput = parse_quote! {
            #[env(from_str)]
            #[env(prefix = "X_")]
            struct Token {}
        };
        let err = ContainerAttrs::from_attrs(&input.attrs).unwrap_err();
        assert_eq!(err.to_string(), PREFIX_CONFLICT);
    }
}
