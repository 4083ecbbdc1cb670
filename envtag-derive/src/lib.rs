//! Derive macro implementation for envtag

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, Generics, Type};

mod attrs;

use attrs::{ContainerAttrs, FieldAttrs, Strategy};

/// `Unmarshal` derive macro
///
/// Implements `envtag::Unmarshal` for a struct, or for any type that decodes
/// itself through one of the hook traits.
///
/// # Supported Attributes
///
/// **Container-level**:
/// - `#[env(prefix = "PREFIX_")]`: Add prefix to all field names
/// - `#[env(unmarshal)]`: Decode with `UnmarshalEnv`
/// - `#[env(text)]`: Decode with `UnmarshalText`
/// - `#[env(from_str)]`: Decode with `FromStr`
/// - `#[env(validate)]`: Run `ValidateEnv` after decoding
///
/// **Field-level**:
/// - `#[env(name = "A,^B")]`: Candidate environment variable names
/// - `#[env(default = "value")]`: Default text if no candidate is set
/// - `#[env(delim = "regex")]`: Delimiter for arrays and `Vec`s
/// - `#[env(required = bool)]`: Override whether the field is required
/// - `#[env(skip)]`: Leave the field untouched
/// - `#[env(flatten)]`: Add no name segment for a nested struct
///
/// A tuple struct with one field decodes exactly like that field.
///
/// Structs with named fields, unit structs and `unmarshal`/`text` types must
/// implement `Default`: a fresh value (an element of a `Vec`, or the content of
/// an `Option` that was `None`) is built by decoding into `Default::default()`.
///
/// # Example
///
/// See the `envtag` crate documentation for usage examples.
#[proc_macro_derive(Unmarshal, attributes(env))]
pub fn derive_unmarshal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let name = &input.ident;
    let mut generics = input.generics.clone();

    let (decode, inner) = match container.strategy {
        Strategy::Unmarshal => (
            quote! { ::envtag::UnmarshalEnv::unmarshal_env(self, state)?; },
            None,
        ),
        Strategy::Text => (quote! { ::envtag::de::decode_text(self, state)?; }, None),
        Strategy::FromStr => (
            quote! { ::envtag::de::decode_from_str(self, state)?; },
            None,
        ),
        Strategy::Fields => expand_fields(input, &container, &mut generics)?,
    };

    // A newtype is exactly as optional as the value it wraps.
    let optional = inner.as_ref().map(|ty| {
        quote! { const OPTIONAL: bool = <#ty as ::envtag::Unmarshal>::OPTIONAL; }
    });
    let validate = container.validate.then(|| {
        quote! { ::envtag::ValidateEnv::validate_env(self, state)?; }
    });

    let build = match (&container.strategy, &inner) {
        (Strategy::FromStr, _) => Some(quote! {
            let value: Self = ::envtag::de::new_from_str(state)?;
        }),
        (_, Some(ty)) => Some(quote! {
            let value = ::envtag::de::new_registered(state, |state| {
                <#ty as ::envtag::Unmarshal>::unmarshal_new(state).map(Self)
            })?;
        }),
        _ => None,
    };
    let unmarshal_new = match build {
        Some(build) => {
            let validate = container.validate.then(|| {
                quote! { ::envtag::ValidateEnv::validate_env(&value, state)?; }
            });
            quote! {
                #build
                #validate
                ::core::result::Result::Ok(value)
            }
        }
        // Everything else decodes into a default value, which also validates it.
        None => {
            if generics.type_params().next().is_some() {
                let (_, ty_generics, _) = input.generics.split_for_impl();
                generics
                    .make_where_clause()
                    .predicates
                    .push(parse_quote!(#name #ty_generics: ::core::default::Default));
            }
            quote! { ::envtag::de::new_default(state) }
        }
    };

    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envtag::Unmarshal for #name #ty_generics #where_clause {
            #optional

            fn unmarshal(
                &mut self,
                state: &::envtag::UnmarshalState<'_>,
            ) -> ::core::result::Result<(), ::envtag::Error> {
                #decode
                #validate
                ::core::result::Result::Ok(())
            }

            fn unmarshal_new(
                state: &::envtag::UnmarshalState<'_>,
            ) -> ::core::result::Result<Self, ::envtag::Error> {
                #unmarshal_new
            }
        }
    })
}

/// Generate field-by-field decoding. Returns the decoding statements and, for
/// newtypes, the wrapped type.
fn expand_fields(
    input: &DeriveInput,
    container: &ContainerAttrs,
    generics: &mut Generics,
) -> syn::Result<(TokenStream2, Option<Type>)> {
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Unmarshal can only be derived for structs, unless `unmarshal`, `text` or `from_str` is used",
            ));
        }
    };
    let bounded = generics.type_params().next().is_some();

    if let Fields::Unnamed(fields) = &data.fields {
        let mut iter = fields.unnamed.iter();
        let (Some(field), None) = (iter.next(), iter.next()) else {
            return Err(syn::Error::new_spanned(
                fields,
                "Unmarshal only supports tuple structs with exactly one field",
            ));
        };
        if container.prefix.is_some() {
            return Err(syn::Error::new(
                input.ident.span(),
                "`prefix` requires a struct with named fields",
            ));
        }
        if let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("env")) {
            return Err(syn::Error::new_spanned(
                attr,
                "newtype fields take the names of the field that holds them",
            ));
        }

        let ty = &field.ty;
        if bounded {
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(#ty: ::envtag::Unmarshal));
        }
        let decode = quote! {
            ::envtag::de::decode_registered(self, state, |__this, state| {
                ::envtag::Unmarshal::unmarshal(&mut __this.0, state)
            })?;
        };
        return Ok((decode, Some(ty.clone())));
    }

    let mut statics = Vec::new();
    let mut calls = Vec::new();

    for (index, field) in data.fields.iter().enumerate() {
        let attrs = FieldAttrs::from_field(field)?;
        if attrs.skip {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

        let ident_text = ident.unraw().to_string();
        let mut descriptor = quote! { ::envtag::Field::new(#ident_text) };
        if let Some(name) = &attrs.name {
            descriptor = quote! { #descriptor.with_name(#name) };
        }
        if let Some(default) = &attrs.default {
            descriptor = quote! { #descriptor.with_default(#default) };
        }
        if let Some(delim) = &attrs.delim {
            descriptor = quote! { #descriptor.with_delim(#delim) };
        }
        if let Some(required) = &attrs.required {
            descriptor = quote! { #descriptor.with_required(#required) };
        }
        if attrs.flatten {
            descriptor = quote! { #descriptor.flattened() };
        }

        let static_ident = format_ident!("__ENVTAG_FIELD_{}", index);
        statics.push(quote! {
            static #static_ident: ::envtag::Field = #descriptor;
        });
        calls.push(quote! {
            fields.field(&mut __this.#ident, &#static_ident)?;
        });

        if bounded {
            let ty = &field.ty;
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(#ty: ::envtag::Unmarshal));
        }
    }

    let decoder = match &container.prefix {
        Some(prefix) => quote! { ::envtag::StructDecoder::with_prefix(state, #prefix) },
        None => quote! { ::envtag::StructDecoder::new(state) },
    };

    let decode = quote! {
        #(#statics)*
        ::envtag::de::decode_registered(self, state, |__this, state| {
            #[allow(unused_mut)]
            let mut fields = #decoder;
            #(#calls)*
            fields.finish()
        })?;
    };
    Ok((decode, None))
}
