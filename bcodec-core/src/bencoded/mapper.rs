//! Binding of decoded values onto typed records.
//!
//! Records implement [`BRecord`] through `#[derive(BDecode)]`, which walks the
//! tagged fields in declaration order and calls [`bind_field`] for each one.
use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::decode::decode_all;
use super::{BInt, BString, Dictionary, Error, Result, Value};

/// A type that can be built from a decoded [`Value`].
pub trait BDecode: Sized {
    fn decode_value(value: Value) -> Result<Self>;
}

/// A record whose tagged fields can be populated from a dictionary.
pub trait BRecord {
    /// Moves every tagged key out of `dictionary` into the matching field.
    ///
    /// Fields whose key is absent keep their current value. Keys without a
    /// matching field are left in `dictionary`.
    fn bind(&mut self, dictionary: &mut Dictionary) -> Result<()>;
}

/// Decodes `bytes` and binds the first top-level dictionary onto a fresh record.
pub fn from_bytes<T: BRecord + Default>(bytes: &[u8]) -> Result<T> {
    let mut dictionary = first_dictionary(bytes)?;

    let mut record = T::default();
    bind_dictionary(&mut record, &mut dictionary)?;

    Ok(record)
}

/// Decodes `bytes` and binds the first top-level dictionary onto `record`.
///
/// Binding happens on a copy of `record`, which replaces it only once every
/// field bound. On error `record` is left untouched.
pub fn from_bytes_into<T: BRecord + Clone>(bytes: &[u8], record: &mut T) -> Result<()> {
    let mut dictionary = first_dictionary(bytes)?;

    let mut scratch = record.clone();
    bind_dictionary(&mut scratch, &mut dictionary)?;
    *record = scratch;

    Ok(())
}

fn first_dictionary(bytes: &[u8]) -> Result<Dictionary> {
    let mut values = decode_all(bytes)?.into_iter();

    let first = values
        .next()
        .ok_or(Error::EmptyOrWrongShapeInput("no data to bind"))?;
    let ignored = values.count();
    if ignored > 0 {
        debug!(ignored, "ignoring top-level values after the first");
    }

    first
        .into_dictionary()
        .ok_or(Error::EmptyOrWrongShapeInput("top-level element is not a dictionary"))
}

/// Binds `dictionary` onto `record` and reports the keys nothing consumed.
pub fn bind_dictionary<T: BRecord + ?Sized>(record: &mut T, dictionary: &mut Dictionary) -> Result<()> {
    record.bind(dictionary)?;

    for key in dictionary.keys() {
        trace!(key = %String::from_utf8_lossy(key), "ignoring unknown key");
    }

    Ok(())
}

/// Builds a record from a dictionary value.
pub fn decode_record<T: BRecord + Default>(value: Value) -> Result<T> {
    let mut dictionary = expect(value, "dictionary", Value::into_dictionary)?;

    let mut record = T::default();
    bind_dictionary(&mut record, &mut dictionary)?;

    Ok(record)
}

/// Binds the entry stored under `key`, if any, onto `field`.
pub fn bind_field<T: BDecode>(dictionary: &mut Dictionary, key: &str, field: &mut T) -> Result<()> {
    match dictionary.take(key) {
        Some(value) => {
            *field = T::decode_value(value).map_err(|err| err.in_field(key))?;
        }
        None => trace!(key, "tagged field absent, keeping current value"),
    }

    Ok(())
}

pub fn from_value<T: BDecode>(value: Value) -> Result<T> {
    T::decode_value(value)
}

fn expect<T>(value: Value, expected: &'static str, convert: fn(Value) -> Option<T>) -> Result<T> {
    let found = value.kind();
    convert(value).ok_or(Error::TypeMismatch { expected, found })
}

impl BDecode for Value {
    fn decode_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl BDecode for BInt {
    fn decode_value(value: Value) -> Result<Self> {
        expect(value, "integer", Value::parse)
    }
}

macro_rules! impl_decode_for_narrow_int {
    ($($int:ty),*) => {$(
        impl BDecode for $int {
            fn decode_value(value: Value) -> Result<Self> {
                let int = BInt::decode_value(value)?;
                <$int>::try_from(int).map_err(|_| Error::TypeMismatch {
                    expected: stringify!($int),
                    found: "out of range integer",
                })
            }
        }
    )*};
}

impl_decode_for_narrow_int!(i8, i16, i32, isize);

impl BDecode for BString {
    fn decode_value(value: Value) -> Result<Self> {
        expect(value, "byte string", Value::parse)
    }
}

impl BDecode for String {
    fn decode_value(value: Value) -> Result<Self> {
        let bytes = BString::decode_value(value)?;
        String::from_utf8(bytes.into_inner()).map_err(|_| Error::TypeMismatch {
            expected: "text",
            found: "non UTF-8 byte string",
        })
    }
}

impl<T: BDecode> BDecode for Vec<T> {
    fn decode_value(value: Value) -> Result<Self> {
        expect(value, "list", Value::parse::<Vec<Value>>)?
            .into_iter()
            .map(T::decode_value)
            .collect()
    }
}

impl BDecode for Dictionary {
    fn decode_value(value: Value) -> Result<Self> {
        expect(value, "dictionary", Value::into_dictionary)
    }
}

impl<V: BDecode> BDecode for BTreeMap<String, V> {
    fn decode_value(value: Value) -> Result<Self> {
        Dictionary::decode_value(value)?
            .into_iter()
            .map(|(key, value)| {
                let key = String::from_utf8(key.into_inner()).map_err(|_| Error::NonTextKey)?;
                let value = V::decode_value(value).map_err(|err| err.in_field(&key))?;

                Ok((key, value))
            })
            .collect()
    }
}

impl<T: BDecode> BDecode for Option<T> {
    fn decode_value(value: Value) -> Result<Self> {
        T::decode_value(value).map(Some)
    }
}

impl<T: BDecode> BDecode for Box<T> {
    fn decode_value(value: Value) -> Result<Self> {
        T::decode_value(value).map(Box::new)
    }
}
