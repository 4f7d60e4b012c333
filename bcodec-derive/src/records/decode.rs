use darling::{ast::Data, util::Ignored, FromDeriveInput, Result, ToTokens};
use proc_macro2::TokenStream;
use syn::{parse_quote, DeriveInput};

/// Derives both the record binder and the value decoder built on top of it.
pub fn decode(input: DeriveInput) -> Result<TokenStream> {
    let params: DecodeParams = FromDeriveInput::from_derive_input(&input)?;

    let record_impl = RecordImpl::for_struct(&params)?;
    let decode_impl = DecodeImpl::for_struct(&params)?;

    let mut tokens = record_impl.into_token_stream();
    decode_impl.to_tokens(&mut tokens);

    Ok(tokens)
}

#[derive(darling::FromDeriveInput)]
#[darling(attributes(bencode), supports(struct_named))]
struct DecodeParams {
    mod_path: Option<syn::Path>,
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, super::Field>,
}

impl DecodeParams {
    fn full_item_path(&self, item_name: &str) -> syn::Path {
        super::full_item_path(&self.mod_path, item_name)
    }

    /// Generics with every type parameter bound by the decode trait.
    fn bound_generics(&self) -> Result<syn::Generics> {
        use crate::ast::bounds::Bind;

        let mut generics = self.generics.clone();
        let bound: syn::TraitBound =
            syn::parse2(self.full_item_path(super::DECODE_TRAIT_NAME).to_token_stream())?;
        generics.params.bind_all(Some(bound));

        Ok(generics)
    }
}

struct BindFieldCall {
    call: syn::Stmt,
}

impl BindFieldCall {
    fn from_field(field: &super::TaggedField, bind_field: &syn::Path) -> Self {
        let super::TaggedField { ident, key } = field;

        let call = parse_quote! {
            #bind_field(dictionary, #key, &mut self.#ident)?;
        };

        Self { call }
    }
}

impl ToTokens for BindFieldCall {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.call.to_tokens(tokens)
    }
}

struct RecordImpl {
    impl_block: syn::ItemImpl,
}

impl RecordImpl {
    fn for_struct(params: &DecodeParams) -> Result<Self> {
        let fields = super::tagged_fields(&params.data)?;

        let bind_field = params.full_item_path("bind_field");
        let inner_calls = fields
            .iter()
            .map(|field| BindFieldCall::from_field(field, &bind_field));

        let trait_path = params.full_item_path(super::RECORD_TRAIT_NAME);
        let dictionary = params.full_item_path("Dictionary");
        let result = params.full_item_path("Result");

        let ident = &params.ident;
        let generics = params.bound_generics()?;
        let (impl_gens, ty_gens, where_clause) = generics.split_for_impl();

        let impl_block = parse_quote! {
            #[automatically_derived]
            impl #impl_gens #trait_path for #ident #ty_gens #where_clause {
                #[allow(unused_variables)]
                fn bind(&mut self, dictionary: &mut #dictionary) -> #result<()> {
                    #(#inner_calls)*

                    ::std::result::Result::Ok(())
                }
            }
        };

        Ok(Self { impl_block })
    }
}

impl ToTokens for RecordImpl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.impl_block.to_tokens(tokens)
    }
}

struct DecodeImpl {
    impl_block: syn::ItemImpl,
}

impl DecodeImpl {
    fn for_struct(params: &DecodeParams) -> Result<Self> {
        let trait_path = params.full_item_path(super::DECODE_TRAIT_NAME);
        let decode_record = params.full_item_path("decode_record");
        let value = params.full_item_path("Value");
        let result = params.full_item_path("Result");

        let ident = &params.ident;
        let mut generics = params.bound_generics()?;
        let (_, ty_gens, _) = params.generics.split_for_impl();
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#ident #ty_gens: ::std::default::Default));

        let (impl_gens, ty_gens, where_clause) = generics.split_for_impl();

        let impl_block = parse_quote! {
            #[automatically_derived]
            impl #impl_gens #trait_path for #ident #ty_gens #where_clause {
                fn decode_value(value: #value) -> #result<Self> {
                    #decode_record(value)
                }
            }
        };

        Ok(Self { impl_block })
    }
}

impl ToTokens for DecodeImpl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.impl_block.to_tokens(tokens)
    }
}
