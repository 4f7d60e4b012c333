mod decode;
mod encode;

use std::collections::HashSet;

use darling::ast::Data;
use darling::util::Ignored;
use darling::{Error, Result};
use quote::format_ident;
use syn::parse_quote;

pub use decode::decode;
pub use encode::encode;

static ENCODE_TRAIT_NAME: &str = "BEncode";
static DECODE_TRAIT_NAME: &str = "BDecode";
static RECORD_TRAIT_NAME: &str = "BRecord";

#[derive(Debug, darling::FromField)]
#[darling(attributes(bencode))]
struct Field {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    #[darling(default)]
    key: Option<String>,
}

impl Field {
    /// Wire key of the field. Missing and empty tags both leave it untagged.
    fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Field that takes part in encoding and binding, in declaration order.
struct TaggedField<'a> {
    ident: &'a syn::Ident,
    key: &'a str,
}

fn tagged_fields(data: &Data<Ignored, Field>) -> Result<Vec<TaggedField<'_>>> {
    let fields = data
        .as_ref()
        .take_struct()
        .ok_or_else(|| Error::unsupported_shape("enum"))?;

    let mut errors = Error::accumulator();
    let mut seen = HashSet::new();

    let tagged = fields
        .into_iter()
        .filter_map(|field| Some((field, field.key()?)))
        .filter_map(|(field, key)| {
            let result = match &field.ident {
                Some(ident) if seen.insert(key) => Ok(TaggedField { ident, key }),
                Some(ident) => {
                    Err(Error::custom(format!("duplicate bencode key {key:?}")).with_span(ident))
                }
                None => Err(Error::unsupported_shape("unnamed field").with_span(&field.ty)),
            };

            errors.handle(result)
        })
        .collect::<Vec<_>>();

    errors.finish()?;

    Ok(tagged)
}

fn full_item_path(custom_mod_path: &Option<syn::Path>, item_name: &str) -> syn::Path {
    let mut mod_path = custom_mod_path
        .to_owned()
        .unwrap_or_else(|| parse_quote!(::bcodec_core::bencoded));

    mod_path.segments.push(format_ident!("{}", item_name).into());

    mod_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;

    #[derive(darling::FromDeriveInput)]
    #[darling(attributes(bencode), supports(struct_named))]
    struct Params {
        data: Data<Ignored, Field>,
    }

    fn keys(input: syn::DeriveInput) -> Result<Vec<String>> {
        let params = Params::from_derive_input(&input)?;
        let tagged = tagged_fields(&params.data)?;

        Ok(tagged.iter().map(|field| field.key.to_owned()).collect())
    }

    #[test]
    fn untagged_and_blank_fields_are_skipped() {
        let input = parse_quote! {
            struct Sample {
                #[bencode(key = "b")]
                first: i64,
                skipped: bool,
                #[bencode(key = "")]
                blank: i64,
                #[bencode(key = "a")]
                last: String,
            }
        };

        assert_eq!(keys(input).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let input = parse_quote! {
            struct Sample {
                #[bencode(key = "k")]
                one: i64,
                #[bencode(key = "k")]
                two: i64,
                #[bencode(key = "k")]
                three: i64,
            }
        };

        let err = keys(input).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn default_and_custom_paths() {
        let default = full_item_path(&None, ENCODE_TRAIT_NAME);
        assert_eq!(
            quote::quote!(#default).to_string(),
            quote::quote!(::bcodec_core::bencoded::BEncode).to_string()
        );

        let custom = full_item_path(&Some(parse_quote!(crate::bencoded)), RECORD_TRAIT_NAME);
        assert_eq!(
            quote::quote!(#custom).to_string(),
            quote::quote!(crate::bencoded::BRecord).to_string()
        );
    }
}
