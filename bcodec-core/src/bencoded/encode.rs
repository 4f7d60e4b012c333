use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::slice::from_ref;

use super::delimiters;
use super::{BString, Dictionary, Error, Result, Value};

/// A type with a bencode wire form.
///
/// Implementations write directly to the sink without building a [`Value`]
/// first. Records get theirs from `#[derive(BEncode)]`.
pub trait BEncode {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()>;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.encode_to(&mut bytes)?;

        Ok(bytes)
    }

    /// Raw key bytes when `self` may be used as a dictionary key.
    fn dictionary_key(&self) -> Option<&[u8]> {
        None
    }

    /// Whether a record should leave this field out of its dictionary.
    fn is_absent(&self) -> bool {
        false
    }
}

pub fn to_bytes<T: BEncode + ?Sized>(item: &T) -> Result<Vec<u8>> {
    item.encode()
}

pub fn to_writer<T: BEncode + ?Sized>(item: &T, writer: &mut impl Write) -> Result<()> {
    item.encode_to(writer)
}

pub fn begin_dictionary(writer: &mut impl Write) -> Result<()> {
    writer.write_all(from_ref(&delimiters::DICTIONARY_PREFIX))?;
    Ok(())
}

pub fn begin_list(writer: &mut impl Write) -> Result<()> {
    writer.write_all(from_ref(&delimiters::LIST_PREFIX))?;
    Ok(())
}

pub fn end(writer: &mut impl Write) -> Result<()> {
    writer.write_all(from_ref(&delimiters::END_SUFFIX))?;
    Ok(())
}

pub fn write_byte_string(writer: &mut impl Write, bytes: &[u8]) -> Result<()> {
    write!(writer, "{}", bytes.len())?;
    writer.write_all(from_ref(&delimiters::STRING_INFIX))?;
    writer.write_all(bytes)?;

    Ok(())
}

/// Writes one `key value` pair unless the value is absent.
pub fn encode_entry<V: BEncode + ?Sized>(
    writer: &mut impl Write,
    key: &[u8],
    value: &V,
) -> Result<()> {
    if value.is_absent() {
        return Ok(());
    }

    write_byte_string(writer, key)?;
    value.encode_to(writer)
}

/// Writes a mapping in the order `entries` yields it. Keys are not sorted.
pub fn encode_mapping<'a, K, V, I>(writer: &mut impl Write, entries: I) -> Result<()>
where
    K: BEncode + ?Sized + 'a,
    V: BEncode + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    begin_dictionary(writer)?;
    for (key, value) in entries {
        let key = key.dictionary_key().ok_or(Error::NonTextKey)?;
        encode_entry(writer, key, value)?;
    }

    end(writer)
}

macro_rules! impl_encode_for_int {
    ($($int:ty),*) => {$(
        impl BEncode for $int {
            fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
                writer.write_all(from_ref(&delimiters::INT_PREFIX))?;
                write!(writer, "{}", self)?;
                end(writer)
            }
        }
    )*};
}

impl_encode_for_int!(i8, i16, i32, i64, isize);

macro_rules! impl_unsupported {
    ($($ty:ty),*) => {$(
        impl BEncode for $ty {
            fn encode_to(&self, _: &mut impl Write) -> Result<()> {
                Err(Error::UnsupportedType(stringify!($ty)))
            }
        }
    )*};
}

impl_unsupported!(bool, f32, f64);

impl BEncode for str {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        write_byte_string(writer, self.as_bytes())
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl BEncode for String {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        self.as_str().encode_to(writer)
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl BEncode for BString {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        write_byte_string(writer, self)
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        Some(self.0.as_slice())
    }
}

impl<T: BEncode> BEncode for [T] {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        begin_list(writer)?;
        for item in self {
            item.encode_to(writer)?;
        }

        end(writer)
    }
}

impl<T: BEncode> BEncode for Vec<T> {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        self.as_slice().encode_to(writer)
    }
}

impl<K: BEncode, V: BEncode> BEncode for BTreeMap<K, V> {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        encode_mapping(writer, self)
    }
}

impl<K: BEncode, V: BEncode, S> BEncode for HashMap<K, V, S> {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        encode_mapping(writer, self)
    }
}

impl BEncode for Dictionary {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        encode_mapping(writer, self.iter())
    }
}

impl BEncode for Value {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        match self {
            Value::Integer(i) => i.encode_to(writer),
            Value::ByteString(s) => s.encode_to(writer),
            Value::List(l) => l.encode_to(writer),
            Value::Dictionary(d) => d.encode_to(writer),
        }
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        self.as_bytes()
    }
}

impl<T: BEncode> BEncode for Option<T> {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        match self {
            Some(value) => value.encode_to(writer),
            None => Err(Error::UnsupportedType("Option::None")),
        }
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        self.as_ref()?.dictionary_key()
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl<T: BEncode + ?Sized> BEncode for &T {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        (**self).encode_to(writer)
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        (**self).dictionary_key()
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: BEncode + ?Sized> BEncode for Box<T> {
    fn encode_to(&self, writer: &mut impl Write) -> Result<()> {
        (**self).encode_to(writer)
    }

    fn dictionary_key(&self) -> Option<&[u8]> {
        (**self).dictionary_key()
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}
