use darling::ast::Data;
use darling::util::Ignored;
use darling::{FromDeriveInput, Result};

use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::parse_quote;

pub fn encode(container: syn::DeriveInput) -> Result<TokenStream> {
    EncodeImpl::for_struct(container).map(ToTokens::into_token_stream)
}

#[derive(darling::FromDeriveInput)]
#[darling(attributes(bencode), supports(struct_named))]
struct EncodeParams {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, super::Field>,
    mod_path: Option<syn::Path>,
}

impl EncodeParams {
    fn full_trait_path(&self) -> syn::Path {
        super::full_item_path(&self.mod_path, super::ENCODE_TRAIT_NAME)
    }

    fn full_fn_path(&self, fn_name: &str) -> syn::Path {
        super::full_item_path(&self.mod_path, fn_name)
    }
}

struct EncodeEntryCall {
    call: syn::Stmt,
}

impl EncodeEntryCall {
    fn from_field(field: &super::TaggedField, encode_entry: &syn::Path) -> Self {
        let super::TaggedField { ident, key } = field;

        let call = parse_quote! {
            #encode_entry(writer, #key.as_bytes(), &self.#ident)?;
        };

        Self { call }
    }
}

impl ToTokens for EncodeEntryCall {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.call.to_tokens(tokens)
    }
}

struct EncodeToDef {
    fn_def: syn::ImplItemMethod,
}

impl EncodeToDef {
    fn from_fields(params: &EncodeParams) -> Result<Self> {
        let fields = super::tagged_fields(&params.data)?;

        let encode_entry = params.full_fn_path("encode_entry");
        let inner_calls = fields
            .iter()
            .map(|field| EncodeEntryCall::from_field(field, &encode_entry));

        let begin = params.full_fn_path("begin_dictionary");
        let end = params.full_fn_path("end");
        let result = params.full_fn_path("Result");

        let fn_def = parse_quote! {
            fn encode_to(&self, writer: &mut impl ::std::io::Write) -> #result<()> {
                #begin(writer)?;
                #(#inner_calls)*
                #end(writer)
            }
        };

        Ok(Self { fn_def })
    }
}

impl ToTokens for EncodeToDef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.fn_def.to_tokens(tokens)
    }
}

struct EncodeImpl {
    impl_block: syn::ItemImpl,
}

impl EncodeImpl {
    fn for_struct(input: syn::DeriveInput) -> Result<Self> {
        let mut params: EncodeParams = FromDeriveInput::from_derive_input(&input)?;

        let encode_to_def = EncodeToDef::from_fields(&params)?;

        Self::adjust_generics(&mut params)?;
        let trait_path = params.full_trait_path();

        let EncodeParams {
            ident, generics, ..
        } = params;

        let (impl_gens, ty_gens, where_clause) = generics.split_for_impl();

        let impl_block = parse_quote! {
            #[automatically_derived]
            impl #impl_gens #trait_path for #ident #ty_gens #where_clause {
                #encode_to_def
            }
        };

        Ok(Self { impl_block })
    }

    fn adjust_generics(params: &mut EncodeParams) -> Result<()> {
        use crate::ast::bounds::Bind;

        let bound: syn::TraitBound = syn::parse2(params.full_trait_path().to_token_stream())?;
        params.generics.params.bind_all(Some(bound));

        Ok(())
    }
}

impl ToTokens for EncodeImpl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.impl_block.to_tokens(tokens)
    }
}
