//! Attribute parsing for `#[envmix(...)]` annotations.
//!
//! This module extracts and validates configuration attributes from structs,
//! fields and enum variants during macro expansion.

use syn::{Attribute, Expr, LitStr};

/// Parsed struct-level `#[envmix(...)]` attributes.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// Prefix prepended to every derived environment variable name.
    pub prefix: String,
}

impl ContainerAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in envmix_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                // prefix = "..."
                if meta.path.is_ident("prefix") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.prefix = lit.value();
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level envmix attribute"))
            })?;
        }

        Ok(out)
    }
}

/// Parsed `#[envmix(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Custom environment variable name override.
    ///
    /// If `None`, the prefix followed by the uppercased field name is used.
    pub name: Option<String>,

    /// Default value strategy:
    /// - `None`: Field is required (no default)
    /// - `Some(None)`: Use `Default::default()`
    /// - `Some(Some(expr))`: Use explicit expression as default value
    pub default: Option<Option<Expr>>,
}

impl FieldAttrs {
    /// Extract and parse `#[envmix(...)]` attributes from a struct field.
    ///
    /// Attributes of other macros are ignored; unknown keys inside
    /// `#[envmix(...)]` are errors.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in envmix_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                // name = "..."
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new_spanned(lit, "name must not be empty"));
                    }
                    out.name = Some(lit.value());
                    return Ok(());
                }

                // default or default = value
                if meta.path.is_ident("default") {
                    if meta.input.peek(syn::Token![=]) {
                        let expr: Expr = meta.value()?.parse()?;
                        out.default = Some(Some(expr));
                    } else {
                        out.default = Some(None);
                    }
                    return Ok(());
                }

                Err(meta.error("unsupported envmix field attribute"))
            })?;
        }

        Ok(out)
    }
}

/// Parsed `#[envmix(...)]` attributes from an enum variant.
#[derive(Debug, Default)]
pub struct VariantAttrs {
    /// Literal text for this variant; snake_case variant name if `None`.
    pub value: Option<String>,
}

impl VariantAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in envmix_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                // value = "..."
                if meta.path.is_ident("value") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.value = Some(lit.value());
                    return Ok(());
                }

                Err(meta.error("unsupported envmix variant attribute"))
            })?;
        }

        Ok(out)
    }
}

fn envmix_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("envmix"))
}

/// Convert a CamelCase identifier into snake_case.
pub fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput, Field, Variant};

    #[test]
    fn test_parse_prefix() {
        let input: DeriveInput = parse_quote! {
            #[envmix(prefix = "APP_")]
            struct Config {}
        };

        let attrs = ContainerAttrs::from_attrs(&input.attrs).unwrap();
        assert_eq!(attrs.prefix, "APP_");
    }

    #[test]
    fn test_unknown_container_attribute() {
        let input: DeriveInput = parse_quote! {
            #[envmix(prefx = "APP_")]
            struct Config {}
        };

        assert!(ContainerAttrs::from_attrs(&input.attrs).is_err());
    }

    #[test]
    fn test_parse_name_attribute() {
        let field: Field = parse_quote! {
            #[envmix(name = "SERVER_HOST")]
            pub server_host: String
        };

        let attrs = FieldAttrs::from_attrs(&field.attrs).unwrap();
        assert_eq!(attrs.name, Some("SERVER_HOST".to_string()));
    }

    #[test]
    fn test_parse_empty_name() {
        let field: Field = parse_quote! {
            #[envmix(name = "")]
            pub server_host: String
        };

        assert!(FieldAttrs::from_attrs(&field.attrs).is_err());
    }

    #[test]
    fn test_parse_default_number() {
        let field: Field = parse_quote! {
            #[envmix(default = 42)]
            pub port: u16
        };

        let attrs = FieldAttrs::from_attrs(&field.attrs).unwrap();
        assert!(matches!(attrs.default, Some(Some(_))));
    }

    #[test]
    fn test_parse_default_no_value() {
        let field: Field = parse_quote! {
            #[envmix(default)]
            pub debug: bool
        };

        let attrs = FieldAttrs::from_attrs(&field.attrs).unwrap();
        assert!(matches!(attrs.default, Some(None)));
    }

    #[test]
    fn test_default_stops_at_comma() {
        let field: Field = parse_quote! {
            #[envmix(default = vec![1, 2], name = "LEVELS")]
            pub levels: Vec<u8>
        };

        let attrs = FieldAttrs::from_attrs(&field.attrs).unwrap();
        assert!(matches!(attrs.default, Some(Some(Expr::Macro(_)))));
        assert_eq!(attrs.name, Some("LEVELS".to_string()));
    }

    #[test]
    fn test_other_attributes_ignored() {
        let field: Field = parse_quote! {
            #[serde(default)]
            pub debug: bool
        };

        let attrs = FieldAttrs::from_attrs(&field.attrs).unwrap();
        assert!(attrs.default.is_none());
        assert!(attrs.name.is_none());
    }

    #[test]
    fn test_unknown_field_attribute() {
        let field: Field = parse_quote! {
            #[envmix(from_file)]
            pub secret: String
        };

        assert!(FieldAttrs::from_attrs(&field.attrs).is_err());
    }

    #[test]
    fn test_parse_variant_value() {
        let variant: Variant = parse_quote! {
            #[envmix(value = "production")]
            Prod
        };

        let attrs = VariantAttrs::from_attrs(&variant.attrs).unwrap();
        assert_eq!(attrs.value, Some("production".to_string()));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("Dev"), "dev");
        assert_eq!(to_snake_case("ReadOnly"), "read_only");
        assert_eq!(to_snake_case("lower"), "lower");
    }
}
