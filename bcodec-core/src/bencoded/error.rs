use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed byte string length at offset {offset}")]
    MalformedLength { offset: usize },

    #[error("malformed integer at offset {offset}")]
    MalformedInteger { offset: usize },

    #[error("missing '{delimiter}' at offset {offset}")]
    MissingDelimiter { delimiter: char, offset: usize },

    #[error("byte string of length {declared} at offset {offset} exceeds the {remaining} remaining bytes")]
    LengthOverflow {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("unknown token {token:#04x} at offset {offset}")]
    UnknownToken { token: u8, offset: usize },

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },

    #[error("trailing data at offset {offset}")]
    TrailingData { offset: usize },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    #[error("dictionary keys must be text")]
    NonTextKey,

    #[error("input must start with a dictionary: {0}")]
    EmptyOrWrongShapeInput(&'static str),

    #[error("field {key:?}: {source}")]
    Field {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps `self` with the dictionary key it was raised under.
    pub fn in_field(self, key: &str) -> Self {
        Self::Field {
            key: key.to_owned(),
            source: Box::new(self),
        }
    }

    /// The error underneath any [`Error::Field`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::Field { source, .. } => source.root(),
            other => other,
        }
    }

    /// Keys leading from the top-level dictionary to the failing field.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut err = self;
        while let Self::Field { key, source } = err {
            path.push(key.as_str());
            err = source.as_ref();
        }

        path
    }

    /// Byte offset of a parse error, if the failure happened while parsing.
    pub fn offset(&self) -> Option<usize> {
        match *self.root() {
            Self::MalformedLength { offset }
            | Self::MalformedInteger { offset }
            | Self::MissingDelimiter { offset, .. }
            | Self::LengthOverflow { offset, .. }
            | Self::UnknownToken { offset, .. }
            | Self::UnexpectedEof { offset }
            | Self::NestingTooDeep { offset, .. }
            | Self::TrailingData { offset } => Some(offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_wrappers() {
        let err = Error::TypeMismatch {
            expected: "integer",
            found: "list",
        }
        .in_field("length")
        .in_field("info");

        assert_eq!(err.path(), vec!["info", "length"]);
        assert!(matches!(err.root(), Error::TypeMismatch { expected: "integer", .. }));
        assert_eq!(err.offset(), None);
        assert_eq!(
            err.to_string(),
            r#"field "info": field "length": expected integer, found list"#
        );
    }

    #[test]
    fn offsets() {
        let err = Error::MissingDelimiter {
            delimiter: ':',
            offset: 1,
        };
        assert_eq!(err.offset(), Some(1));
        assert_eq!(err.to_string(), "missing ':' at offset 1");
    }
}
