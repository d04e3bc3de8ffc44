//! Derive macro implementation for envmix

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

mod attrs;

use attrs::{ContainerAttrs, FieldAttrs, VariantAttrs};

/// Whether the field type is spelled `Option<T>`.
fn is_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident == "Option")
            .unwrap_or(false)
    } else {
        false
    }
}

/// `EnvMix` derive macro
///
/// Implements `envmix::EnvMix` (and `envmix::EnvShape`, so the struct can be
/// nested in other schemas) by generating the schema descriptor.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[envmix(prefix = "PREFIX_")]`: Add prefix to all env var names
///
/// **Field-level**:
/// - `#[envmix(name = "CUSTOM_NAME")]`: Custom environment variable name
/// - `#[envmix(default)]`: Use `Default::default()` if env var not set
/// - `#[envmix(default = value)]`: Use explicit default value if env var not set
///
/// The struct must also implement `serde::Deserialize`, and field types used
/// with a default must implement `serde::Serialize`.
#[proc_macro_derive(EnvMix, attributes(envmix))]
pub fn derive_envmix(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_envmix(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_envmix(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let struct_name_str = struct_name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "EnvMix does not support generic structs",
        ));
    }

    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let prefix = container.prefix;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvMix only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvMix only supports structs",
            ))
        }
    };

    let field_descriptors = fields
        .iter()
        .map(|field| {
            let Some(ident) = field.ident.as_ref() else {
                return Err(syn::Error::new_spanned(field, "expected a named field"));
            };
            let field_name = ident.unraw().to_string();
            let field_type = &field.ty;
            let attrs = FieldAttrs::from_attrs(&field.attrs)?;
            let optional = is_option(field_type);

            let mut descriptor = quote! {
                ::envmix::FieldDescriptor::new(
                    #field_name,
                    <#field_type as ::envmix::EnvShape>::shape(),
                )
            };

            if let Some(env_name) = attrs.name {
                descriptor = quote! { #descriptor.with_env(#env_name) };
            }

            let default = match attrs.default {
                Some(Some(expr)) => Some(quote! {
                    ::envmix::serde_json::to_value::<#field_type>(#expr)
                }),
                Some(None) if optional => {
                    return Err(syn::Error::new_spanned(
                        field,
                        "Option<T> fields cannot have default attribute (they default to None automatically)",
                    ));
                }
                Some(None) => Some(quote! {
                    ::envmix::serde_json::to_value::<#field_type>(
                        <#field_type as ::core::default::Default>::default(),
                    )
                }),
                None if optional => Some(quote! {
                    ::core::result::Result::Ok(::envmix::serde_json::Value::Null)
                }),
                None => None,
            };

            if let Some(default) = default {
                descriptor = quote! { #descriptor.with_default(|| #default) };
            }

            Ok(quote! { .field(#descriptor) })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::envmix::EnvMix for #struct_name {
            fn schema() -> &'static ::envmix::SchemaDescriptor {
                static SCHEMA: ::std::sync::OnceLock<::envmix::SchemaDescriptor> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    ::envmix::SchemaDescriptor::builder(
                        ::core::any::type_name::<#struct_name>(),
                        #struct_name_str,
                        |value| {
                            ::envmix::serde_json::from_value::<#struct_name>(value).map(|_| ())
                        },
                    )
                    .prefix(#prefix)
                    #(#field_descriptors)*
                    .build()
                })
            }
        }

        impl ::envmix::EnvShape for #struct_name {
            fn shape() -> ::envmix::Shape {
                ::envmix::Shape::Nested(<Self as ::envmix::EnvMix>::schema())
            }
        }
    })
}

/// `EnvLiteral` derive macro
///
/// For fieldless enums whose variants stand for fixed literal values. Each
/// variant maps to `#[envmix(value = "...")]` or its snake_case name.
/// Generates `envmix::EnvShape`, `serde::Serialize`, `serde::Deserialize`
/// and an `as_str` method.
#[proc_macro_derive(EnvLiteral, attributes(envmix))]
pub fn derive_env_literal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_env_literal(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_env_literal(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "EnvLiteral does not support generic enums",
        ));
    }

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "EnvLiteral only supports enums",
        ));
    };

    let mut idents = Vec::new();
    let mut literals = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "EnvLiteral variants cannot carry data",
            ));
        }
        let attrs = VariantAttrs::from_attrs(&variant.attrs)?;
        let literal = attrs
            .value
            .unwrap_or_else(|| attrs::to_snake_case(&variant.ident.unraw().to_string()));
        if literals.contains(&literal) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate literal value \"{literal}\""),
            ));
        }
        idents.push(&variant.ident);
        literals.push(literal);
    }

    if idents.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "EnvLiteral requires at least one variant",
        ));
    }

    Ok(quote! {
        impl #enum_name {
            /// Literal values accepted for this type, in declaration order.
            pub const LITERALS: &'static [&'static str] = &[#(#literals),*];

            /// The literal value of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    #(Self::#idents => #literals,)*
                }
            }
        }

        impl ::envmix::EnvShape for #enum_name {
            fn shape() -> ::envmix::Shape {
                ::envmix::Shape::Tagged(Self::LITERALS)
            }
        }

        impl ::envmix::serde::Serialize for #enum_name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::envmix::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::envmix::serde::Deserialize<'de> for #enum_name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::envmix::serde::Deserializer<'de>,
            {
                let value = <::std::string::String as ::envmix::serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                match value.as_str() {
                    #(#literals => ::core::result::Result::Ok(Self::#idents),)*
                    other => ::core::result::Result::Err(
                        <D::Error as ::envmix::serde::de::Error>::unknown_variant(
                            other,
                            Self::LITERALS,
                        ),
                    ),
                }
            }
        }
    })
}
