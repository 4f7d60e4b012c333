use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{BString, Dictionary, Value};

impl From<serde_bytes::ByteBuf> for BString {
    fn from(bytes: serde_bytes::ByteBuf) -> Self {
        Self(bytes.into_vec())
    }
}

impl From<BString> for serde_bytes::ByteBuf {
    fn from(bytes: BString) -> Self {
        serde_bytes::ByteBuf::from(bytes.0)
    }
}

/// Byte strings holding UTF-8 serialize as strings, others as raw bytes.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::ByteString(s) => match s.as_str() {
                Some(text) => serializer.serialize_str(text),
                None => serializer.serialize_bytes(s),
            },
            Value::List(l) => serializer.collect_seq(l),
            Value::Dictionary(d) => d.serialize(serializer),
        }
    }
}

/// Keys are rendered lossily as text; entries keep dictionary order.
impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(&String::from_utf8_lossy(key), value)?;
        }

        map.end()
    }
}
