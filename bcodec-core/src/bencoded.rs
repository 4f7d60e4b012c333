//! Bencode codec.
//!
//! Bytes are parsed into a [`Value`] tree by [`decode`]/[`decode_all`], typed
//! values are written back by [`BEncode`], and [`from_bytes`] binds a parsed
//! dictionary onto a record declared with `#[derive(BDecode)]`:
//!
//! ```
//! use bcodec_core::bencoded::{self, BDecode, BEncode};
//!
//! #[derive(Debug, Default, PartialEq, BEncode, BDecode)]
//! struct Announce {
//!     #[bencode(key = "announce")]
//!     tracker: String,
//!     #[bencode(key = "interval")]
//!     interval: i64,
//!     // Untagged, never on the wire.
//!     retries: u32,
//! }
//!
//! let announce: Announce = bencoded::from_bytes(b"d8:announce3:url8:intervali60ee").unwrap();
//! assert_eq!(announce.tracker, "url");
//! assert_eq!(announce.encode().unwrap(), b"d8:announce3:url8:intervali60ee");
//! ```
mod decode;
mod encode;
mod error;
pub mod mapper;
mod value;

#[cfg(feature = "use-serde")]
mod serde;

use std::borrow::Borrow;
use std::io::{Read, Write};
use std::ops::Deref;

pub use bcodec_derive::{BDecode, BEncode};

pub use self::decode::{decode, decode_all, Decoder, DEFAULT_MAX_DEPTH};
pub use self::encode::{
    begin_dictionary, begin_list, encode_entry, encode_mapping, end, to_bytes, to_writer,
    write_byte_string, BEncode,
};
pub use self::error::{Error, Result};
pub use self::mapper::{
    bind_dictionary, bind_field, decode_record, from_bytes, from_bytes_into, from_value, BDecode,
    BRecord,
};
pub use self::value::{Dictionary, Value};

#[cfg(feature = "use-serde")]
use serde_derive::{Deserialize, Serialize};

mod delimiters {
    pub const INT_PREFIX: u8 = b'i';
    pub const LIST_PREFIX: u8 = b'l';
    pub const DICTIONARY_PREFIX: u8 = b'd';

    pub const STRING_INFIX: u8 = b':';

    pub const END_SUFFIX: u8 = b'e';
}

///Bencoded int type.
pub type BInt = i64;

///Bencoded string type.
#[cfg_attr(feature = "use-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "use-serde", serde(into = "serde_bytes::ByteBuf"))]
#[cfg_attr(feature = "use-serde", serde(from = "serde_bytes::ByteBuf"))]
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BString(pub Vec<u8>);

impl BString {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// UTF-8 view of the payload, if it is valid text.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl Deref for BString {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<[u8]> for BString {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for BString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for BString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for BString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for BString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for BString {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

pub trait Parser<T>: Sized {
    type Err;

    fn parse(&self, source: impl Read) -> std::result::Result<T, Self::Err>;
}

pub trait Saver<T>: Sized {
    type Err;

    fn save(&self, item: &T, target: impl Write) -> std::result::Result<(), Self::Err>;
}

/// Reads and writes records with the built-in codec (see [`Parser`], [`Saver`]).
///
/// ## Note
///
/// Parsing reads the whole source into memory before decoding, as the codec
/// has no notion of partial input.
pub struct Bencode;

impl<T: BRecord + Default> Parser<T> for Bencode {
    type Err = Error;

    fn parse(&self, mut source: impl Read) -> Result<T> {
        let mut bytes = vec![];
        source.read_to_end(&mut bytes)?;

        from_bytes(&bytes)
    }
}

impl<T: BEncode> Saver<T> for Bencode {
    type Err = Error;

    fn save(&self, item: &T, mut target: impl Write) -> Result<()> {
        let bytes = item.encode()?;
        target.write_all(&bytes)?;

        Ok(())
    }
}
