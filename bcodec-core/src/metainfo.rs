//! Record shape of a single-file `.torrent` metadata file.
use thiserror::Error;

use crate::bencoded::{BDecode, BEncode, BInt, BString};

#[cfg(feature = "use-serde")]
use serde_derive::Serialize;

/// Length of one SHA-1 piece digest.
pub const PIECE_HASH_LEN: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum MetainfoError {
    #[error("pieces length {0} is not a multiple of 20 bytes")]
    PiecesLength(usize),
}

///Parsed `.torrent` metadata file
#[cfg_attr(feature = "use-serde", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq, BEncode, BDecode)]
#[bencode(mod_path = "crate::bencoded")]
pub struct TorrentMeta {
    ///Free-form textual comments of the author.
    #[bencode(key = "comment")]
    pub comment: String,
    ///Name and version of the program used to create the metadata file.
    #[bencode(key = "created by")]
    pub created_by: String,
    ///The creation time of the torrent, in UNIX epoch seconds.
    #[bencode(key = "creation date")]
    pub creation_date: BInt,
    ///Describes the file of the torrent.
    #[bencode(key = "info")]
    pub info: Info,
    ///Web seed URLs.
    ///
    ///See <http://bittorrent.org/beps/bep_0019.html> for more info.
    #[bencode(key = "url-list")]
    pub url_list: Vec<String>,
}

///Parsed `info` section of `.torrent` metadata file.
#[cfg_attr(feature = "use-serde", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq, BEncode, BDecode)]
#[bencode(mod_path = "crate::bencoded")]
pub struct Info {
    ///The filename.
    #[bencode(key = "name")]
    pub name: String,
    ///Length of the file in bytes.
    #[bencode(key = "length")]
    pub length: BInt,
    ///Number of bytes in each piece.
    #[bencode(key = "piece length")]
    pub piece_length: BInt,
    ///Byte string consisting of the concatenation of 20-byte SHA1 hash values, one per each piece.
    #[bencode(key = "pieces")]
    pub pieces: BString,
}

impl Info {
    /// Splits `pieces` into one lower-case hex digest per piece.
    pub fn piece_hashes(&self) -> Result<Vec<String>, MetainfoError> {
        if self.pieces.len() % PIECE_HASH_LEN != 0 {
            return Err(MetainfoError::PiecesLength(self.pieces.len()));
        }

        Ok(self
            .pieces
            .chunks(PIECE_HASH_LEN)
            .map(utils::to_hex)
            .collect())
    }

    /// Number of pieces described by `pieces`, rounding a partial digest down.
    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_HASH_LEN
    }
}

mod utils {
    use std::fmt::Write;

    pub fn to_hex(bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            //Writing into a String never fails
            let _ = write!(hex, "{byte:02x}");
        }

        hex
    }
}
