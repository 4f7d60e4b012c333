use syn::{punctuated::Punctuated, GenericParam, Token, TraitBound, TypeParamBound};

pub trait Bind<B> {
    /// Appends `bounds` to every type parameter, leaving lifetimes and consts alone.
    fn bind_all(&mut self, bounds: impl IntoIterator<Item = B>);
}

impl Bind<TypeParamBound> for Punctuated<GenericParam, Token![,]> {
    fn bind_all(&mut self, bounds: impl IntoIterator<Item = TypeParamBound>) {
        let bounds = bounds.into_iter().collect::<Vec<_>>();

        self.iter_mut()
            .filter_map(|param| match param {
                GenericParam::Type(type_param) => Some(type_param),
                _ => None,
            })
            .for_each(|type_param| type_param.bounds.extend(bounds.iter().cloned()))
    }
}

impl Bind<TraitBound> for Punctuated<GenericParam, Token![,]> {
    fn bind_all(&mut self, bounds: impl IntoIterator<Item = TraitBound>) {
        self.bind_all(bounds.into_iter().map(TypeParamBound::Trait))
    }
}
