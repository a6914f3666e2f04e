//! Procedural macros for the docmodel project.
//!
//! This crate provides the `Model` derive macro, which emits the type
//! definition the schema deriver consumes. The macro is meant to be used
//! through the `docmodel` facade crate, which re-exports it next to the
//! `Model` trait.

#[allow(unused_extern_crates)]
extern crate self as docmodel_macros;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Fields, GenericArgument, LitStr, PathArguments, Type,
    parse_macro_input,
};

/// Derives the `Model` trait for a named-field struct.
///
/// Field metadata is configured through `#[model(...)]` attributes mirroring
/// the schema tag grammar:
///
/// - `bson = "name[,omitempty][,inline]"` - serialized key and flags; an empty
///   name falls back to the lower-cased field name, `-` drops the field
/// - `hint = "id"` / `hint = "date"` - selects a value transformer
/// - `nested_id = "false"` - disables identifier injection for a struct field
/// - `default = "<literal>"` - default value, parsed per scalar kind
///
/// `Option<T>` fields become optional with the unwrapped kind, `Vec<T>` fields
/// become slices, primitive types map to scalar kinds, and any other path type
/// is treated as a nested model.
///
/// # Example
///
/// ```ignore
/// use docmodel::Model;
///
/// #[derive(Model)]
/// struct User {
///     #[model(bson = "_id", hint = "id")]
///     id: String,
///     #[model(bson = ",omitempty")]
///     name: Option<String>,
///     #[model(default = "18")]
///     age: i64,
/// }
/// ```
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_model(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_model(input: &DeriveInput) -> Result<TokenStream2, Error> {
    let ident = &input.ident;
    let name = ident.to_string();

    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            ident,
            "Model can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(Error::new_spanned(
            ident,
            "Model can only be derived for structs with named fields",
        ));
    };

    let field_specs = fields
        .named
        .iter()
        .map(field_spec_tokens)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        impl ::docmodel::typespec::Model for #ident {
            fn model_name() -> &'static str {
                #name
            }

            fn type_spec() -> ::docmodel::typespec::TypeSpec {
                ::docmodel::typespec::TypeSpec {
                    name: #name.to_string(),
                    fields: ::std::vec![#(#field_specs),*],
                }
            }
        }
    })
}

#[derive(Default)]
struct ModelTags {
    bson: Option<String>,
    hint: Option<String>,
    nested_id: Option<String>,
    default: Option<String>,
}

fn field_spec_tokens(field: &syn::Field) -> Result<TokenStream2, Error> {
    let name = field
        .ident
        .as_ref()
        .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?
        .to_string();

    let tags = parse_model_tags(field)?;
    let (optional, kind) = field_kind_tokens(&field.ty)?;

    let bson = tag_tokens(&tags.bson);
    let hint = tag_tokens(&tags.hint);
    let nested_id = tag_tokens(&tags.nested_id);
    let default = tag_tokens(&tags.default);

    Ok(quote! {
        ::docmodel::typespec::FieldSpec {
            name: #name.to_string(),
            kind: #kind,
            optional: #optional,
            tags: ::docmodel::typespec::FieldTags {
                bson: #bson,
                hint: #hint,
                nested_id: #nested_id,
                default: #default,
            },
        }
    })
}

fn parse_model_tags(field: &syn::Field) -> Result<ModelTags, Error> {
    let mut tags = ModelTags::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let value = || -> syn::Result<String> {
                let literal: LitStr = meta.value()?.parse()?;
                Ok(literal.value())
            };

            if meta.path.is_ident("bson") {
                tags.bson = Some(value()?);
            } else if meta.path.is_ident("hint") {
                tags.hint = Some(value()?);
            } else if meta.path.is_ident("nested_id") {
                tags.nested_id = Some(value()?);
            } else if meta.path.is_ident("default") {
                tags.default = Some(value()?);
            } else {
                return Err(meta.error("unknown model attribute"));
            }

            Ok(())
        })?;
    }

    Ok(tags)
}

fn tag_tokens(tag: &Option<String>) -> TokenStream2 {
    match tag {
        Some(value) => quote! { ::std::option::Option::Some(#value.to_string()) },
        None => quote! { ::std::option::Option::None },
    }
}

fn field_kind_tokens(ty: &Type) -> Result<(bool, TokenStream2), Error> {
    if let Some(inner) = generic_inner(ty, "Option") {
        return Ok((true, spec_kind_tokens(inner)?));
    }

    Ok((false, spec_kind_tokens(ty)?))
}

fn spec_kind_tokens(ty: &Type) -> Result<TokenStream2, Error> {
    if let Some(inner) = generic_inner(ty, "Vec") {
        // slice elements shed one level of Option, like the fields themselves
        let element = generic_inner(inner, "Option").unwrap_or(inner);
        let element_kind = spec_kind_tokens(element)?;

        return Ok(quote! {
            ::docmodel::typespec::SpecKind::Slice(::std::boxed::Box::new(#element_kind))
        });
    }

    if let Some(scalar) = scalar_kind_ident(ty) {
        return Ok(quote! {
            ::docmodel::typespec::SpecKind::Scalar(::docmodel::typespec::ScalarKind::#scalar)
        });
    }

    Ok(quote! {
        ::docmodel::typespec::SpecKind::Struct(
            <#ty as ::docmodel::typespec::Model>::type_spec()
        )
    })
}

fn scalar_kind_ident(ty: &Type) -> Option<proc_macro2::Ident> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;

    let kind = match segment.ident.to_string().as_str() {
        "String" => "String",
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => "Int",
        "f32" | "f64" => "Float",
        "bool" => "Bool",
        _ => return None,
    };

    Some(proc_macro2::Ident::new(kind, segment.ident.span()))
}

fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    arguments.args.iter().find_map(|argument| match argument {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}
