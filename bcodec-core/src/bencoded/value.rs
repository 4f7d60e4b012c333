use std::fmt;

use indexmap::IndexMap;

use super::{BInt, BString};

/// A decoded bencode element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(BInt),
    ByteString(BString),
    List(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    /// Static name of the variant, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::ByteString(_) => "byte string",
            Self::List(_) => "list",
            Self::Dictionary(_) => "dictionary",
        }
    }

    pub fn as_integer(&self) -> Option<BInt> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the payload as text when it is a byte string holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_dictionary(self) -> Option<Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Looks `key` up when `self` is a dictionary.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.as_dictionary()?.get(key)
    }

    pub fn parse<T>(self) -> Option<T>
    where
        Self: TryInto<T>,
    {
        self.try_into().ok()
    }
}

impl From<BInt> for Value {
    fn from(i: BInt) -> Self {
        Self::Integer(i)
    }
}

impl From<BString> for Value {
    fn from(s: BString) -> Self {
        Self::ByteString(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::ByteString(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::ByteString(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Self::List(l)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Self::Dictionary(d)
    }
}

impl TryFrom<Value> for BInt {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Integer(val) = value {
            Ok(val)
        } else {
            Err(value)
        }
    }
}

impl TryFrom<Value> for BString {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::ByteString(val) = value {
            Ok(val)
        } else {
            Err(value)
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let bstring = BString::try_from(value)?;

        String::from_utf8(bstring.into_inner())
            .map_err(|err| Value::ByteString(BString(err.into_bytes())))
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::List(val) = value {
            Ok(val)
        } else {
            Err(value)
        }
    }
}

impl TryFrom<Value> for Dictionary {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Dictionary(val) = value {
            Ok(val)
        } else {
            Err(value)
        }
    }
}

/// Dictionary that keeps its entries in insertion order.
///
/// Keys are unique. Inserting an existing key replaces its value in place, so
/// the entry keeps the position of its first occurrence. Lookups and inserts
/// are hashed, so building a dictionary is linear in its number of entries.
#[derive(Clone, Default)]
pub struct Dictionary {
    entries: IndexMap<BString, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, returning the value previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<BString>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.entries.get(key.as_ref())
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Removes an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<Value> {
        self.entries.shift_remove(key.as_ref())
    }

    /// Removes an entry in constant time. The last entry takes its position.
    pub fn take(&mut self, key: impl AsRef<[u8]>) -> Option<Value> {
        self.entries.swap_remove(key.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BString, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BString> {
        self.entries.keys()
    }
}

/// Two dictionaries are equal when they hold the same entries in the same order.
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Dictionary {}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl IntoIterator for Dictionary {
    type Item = (BString, Value);
    type IntoIter = indexmap::map::IntoIter<BString, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<BString>> FromIterator<(K, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        for (key, value) in iter {
            dictionary.insert(key, value);
        }

        dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn duplicate_key_overwrites_in_place() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("a", Value::Integer(1));
        dictionary.insert("b", Value::Integer(2));

        let previous = dictionary.insert("a", Value::Integer(3));

        assert_eq!(previous, Some(Value::Integer(1)));
        assert_eq!(dictionary.len(), 2);
        let keys: Vec<_> = dictionary.keys().map(|k| k.to_vec()).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(dictionary.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut dictionary: Dictionary = [
            ("x", Value::Integer(1)),
            ("y", Value::Integer(2)),
            ("z", Value::Integer(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(dictionary.remove("y"), Some(Value::Integer(2)));
        assert_eq!(dictionary.remove("y"), None);
        assert!(!dictionary.contains_key("y"));

        let keys: Vec<_> = dictionary.into_iter().map(|(k, _)| k.into_inner()).collect();
        assert_eq!(keys, vec![b"x".to_vec(), b"z".to_vec()]);
    }

    #[test]
    fn take_moves_last_entry_into_place() {
        let mut dictionary: Dictionary = [
            ("x", Value::Integer(1)),
            ("y", Value::Integer(2)),
            ("z", Value::Integer(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(dictionary.take("x"), Some(Value::Integer(1)));
        assert_eq!(dictionary.take("x"), None);

        let keys: Vec<_> = dictionary.keys().map(|k| k.to_vec()).collect();
        assert_eq!(keys, vec![b"z".to_vec(), b"y".to_vec()]);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let forward: Dictionary = [("a", Value::Integer(1)), ("b", Value::Integer(2))]
            .into_iter()
            .collect();
        let backward: Dictionary = [("b", Value::Integer(2)), ("a", Value::Integer(1))]
            .into_iter()
            .collect();

        assert_ne!(forward, backward);
        assert_eq!(forward, forward.clone());
    }

    #[rstest]
    #[case::integer(Value::Integer(7), "integer")]
    #[case::byte_string(Value::from("x"), "byte string")]
    #[case::list(Value::List(vec![]), "list")]
    #[case::dictionary(Value::Dictionary(Dictionary::new()), "dictionary")]
    fn kind_names(#[case] value: Value, #[case] kind: &str) {
        assert_eq!(value.kind(), kind);
    }

    #[test]
    fn accessors() {
        let value = Value::from("spam");
        assert_eq!(value.as_str(), Some("spam"));
        assert_eq!(value.as_integer(), None);

        let invalid_utf8 = Value::ByteString(BString(vec![0xff, 0xfe]));
        assert_eq!(invalid_utf8.as_str(), None);
        assert_eq!(invalid_utf8.as_bytes(), Some(&[0xff, 0xfe][..]));

        let dictionary = Value::Dictionary([("cow", Value::from("moo"))].into_iter().collect());
        assert_eq!(dictionary.get("cow").and_then(Value::as_str), Some("moo"));
        assert_eq!(dictionary.get("missing"), None);
    }

    #[test]
    fn try_from_returns_original_on_mismatch() {
        let value = Value::Integer(42);
        let err = String::try_from(value.clone()).unwrap_err();
        assert_eq!(err, value);

        assert_eq!(Value::Integer(42).parse::<BInt>(), Some(42));
        assert_eq!(Value::from("42").parse::<BInt>(), None);
    }
}
