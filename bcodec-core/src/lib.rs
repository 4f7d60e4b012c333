pub mod bencoded;
pub mod metainfo;

pub mod prelude {
    pub use crate::bencoded::{
        BDecode, BEncode, BInt, BRecord, BString, Bencode, Dictionary, Parser, Saver, Value,
    };
    pub use crate::metainfo::{Info, TorrentMeta};
}
