mod ast;
mod records;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(BEncode, attributes(bencode))]
pub fn encode(input: TokenStream) -> TokenStream {
    expand_derive(input, records::encode)
}

#[proc_macro_derive(BDecode, attributes(bencode))]
pub fn decode(input: TokenStream) -> TokenStream {
    expand_derive(input, records::decode)
}

fn expand_derive<F: FnOnce(DeriveInput) -> darling::Result<proc_macro2::TokenStream>>(
    input: TokenStream,
    implementor: F,
) -> TokenStream {
    implementor(parse_macro_input!(input))
        .unwrap_or_else(darling::Error::write_errors)
        .into()
}
