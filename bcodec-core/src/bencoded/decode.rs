use super::delimiters;
use super::{BInt, BString, Dictionary, Error, Result, Value};

/// Nesting depth allowed by [`Decoder::new`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parses all top-level values in `bytes`.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Value>> {
    Decoder::new(bytes).parse()
}

/// Parses exactly one value, rejecting empty input and anything after it.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.next_value()?;

    if !decoder.is_exhausted() {
        return Err(Error::TrailingData {
            offset: decoder.offset,
        });
    }

    Ok(value)
}

/// Single-pass recursive descent parser over an in-memory buffer.
///
/// The decoder owns the cursor for one parse call; sub-parsers advance it and
/// return as soon as they hit the first error.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Collects values until the input is exhausted.
    pub fn parse(mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while !self.is_exhausted() {
            values.push(self.next_value()?);
        }

        Ok(values)
    }

    /// Dispatches on the lookahead byte.
    pub fn next_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(delimiters::INT_PREFIX) => self.parse_integer().map(Value::Integer),
            Some(delimiters::LIST_PREFIX) => self.parse_list().map(Value::List),
            Some(delimiters::DICTIONARY_PREFIX) => self.parse_dictionary().map(Value::Dictionary),
            Some(b'0'..=b'9') => self.parse_byte_string().map(Value::ByteString),
            Some(token) => Err(Error::UnknownToken {
                token,
                offset: self.offset,
            }),
            None => Err(Error::UnexpectedEof {
                offset: self.offset,
            }),
        }
    }

    fn parse_integer(&mut self) -> Result<BInt> {
        self.offset += 1;
        let start = self.offset;

        let digits = self.take_until(delimiters::END_SUFFIX)?;
        if !utils::is_canonical_integer(digits) {
            return Err(Error::MalformedInteger { offset: start });
        }

        utils::parse_ascii(digits).ok_or(Error::MalformedInteger { offset: start })
    }

    fn parse_byte_string(&mut self) -> Result<BString> {
        let start = self.offset;

        let digits = self.take_until(delimiters::STRING_INFIX)?;
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(Error::MalformedLength { offset: start });
        }
        let declared: usize =
            utils::parse_ascii(digits).ok_or(Error::MalformedLength { offset: start })?;

        let remaining = self.input.len() - self.offset;
        if declared > remaining {
            return Err(Error::LengthOverflow {
                offset: start,
                declared,
                remaining,
            });
        }

        let body = &self.input[self.offset..self.offset + declared];
        self.offset += declared;

        Ok(BString(body.to_vec()))
    }

    fn parse_list(&mut self) -> Result<Vec<Value>> {
        self.enter()?;
        self.offset += 1;

        let mut list = Vec::new();
        loop {
            match self.peek() {
                Some(delimiters::END_SUFFIX) => break,
                Some(_) => list.push(self.next_value()?),
                None => return Err(self.missing(delimiters::END_SUFFIX)),
            }
        }

        self.offset += 1;
        self.depth -= 1;
        Ok(list)
    }

    fn parse_dictionary(&mut self) -> Result<Dictionary> {
        self.enter()?;
        self.offset += 1;

        let mut dictionary = Dictionary::new();
        loop {
            match self.peek() {
                Some(delimiters::END_SUFFIX) => break,
                Some(_) => {
                    let key = self.parse_byte_string()?;
                    let value = self.next_value()?;

                    dictionary.insert(key, value);
                }
                None => return Err(self.missing(delimiters::END_SUFFIX)),
            }
        }

        self.offset += 1;
        self.depth -= 1;
        Ok(dictionary)
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
                offset: self.offset,
            });
        }

        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    /// Returns the bytes before `delimiter` and moves the cursor past it.
    ///
    /// Scanning stops at the first byte that cannot be part of a number, so a
    /// missing delimiter is reported where the number ends, not at the next
    /// occurrence of the delimiter further along.
    fn take_until(&mut self, delimiter: u8) -> Result<&'a [u8]> {
        let input = self.input;
        let start = self.offset;

        let len = input[start..]
            .iter()
            .take_while(|&&b| b.is_ascii_digit() || b == b'-')
            .count();
        let end = start + len;

        match input.get(end) {
            Some(&b) if b == delimiter => {
                self.offset = end + 1;
                Ok(&input[start..end])
            }
            _ => {
                self.offset = end;
                Err(self.missing(delimiter))
            }
        }
    }

    fn missing(&self, delimiter: u8) -> Error {
        Error::MissingDelimiter {
            delimiter: char::from(delimiter),
            offset: self.offset,
        }
    }
}

mod utils {
    pub fn parse_ascii<T: std::str::FromStr>(bytes: &[u8]) -> Option<T> {
        std::str::from_utf8(bytes).ok()?.parse().ok()
    }

    /// `-?[1-9][0-9]*` or `0`.
    pub fn is_canonical_integer(bytes: &[u8]) -> bool {
        let digits = bytes.strip_prefix(b"-").unwrap_or(bytes);

        match digits {
            [] => false,
            [b'0'] => digits.len() == bytes.len(),
            [b'0', ..] => false,
            _ => digits.iter().all(u8::is_ascii_digit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rstest::*;

    fn bytes(s: &str) -> Value {
        Value::ByteString(s.into())
    }

    #[rstest]
    #[case::positive(b"i42e", 42)]
    #[case::negative(b"i-3e", -3)]
    #[case::zero(b"i0e", 0)]
    #[case::max(b"i9223372036854775807e", i64::MAX)]
    #[case::min(b"i-9223372036854775808e", i64::MIN)]
    fn integer(#[case] input: &[u8], #[case] expected: BInt) {
        assert_eq!(decode(input).unwrap(), Value::Integer(expected));
    }

    #[rstest]
    #[case::negative_zero(b"i-0e")]
    #[case::leading_zero(b"i03e")]
    #[case::negative_leading_zero(b"i-03e")]
    #[case::empty(b"ie")]
    #[case::lone_minus(b"i-e")]
    #[case::double_minus(b"i--1e")]
    #[case::inner_minus(b"i1-2e")]
    #[case::overflow(b"i9223372036854775808e")]
    fn malformed_integer(#[case] input: &[u8]) {
        assert!(matches!(
            decode(input),
            Err(Error::MalformedInteger { offset: 1 })
        ));
    }

    #[test]
    fn byte_string() {
        assert_eq!(decode(b"4:spam").unwrap(), bytes("spam"));
        assert_eq!(decode(b"0:").unwrap(), bytes(""));
    }

    #[test]
    fn binary_byte_string() {
        let input = [&b"4:"[..], &hex!("00ff10e0")].concat();
        assert_eq!(
            decode(&input).unwrap(),
            Value::ByteString(BString(hex!("00ff10e0").to_vec()))
        );
    }

    #[test]
    fn list() {
        assert_eq!(
            decode(b"l4:spami42ee").unwrap(),
            Value::List(vec![bytes("spam"), Value::Integer(42)])
        );
        assert_eq!(decode(b"le").unwrap(), Value::List(vec![]));
    }

    #[test]
    fn dictionary() {
        let expected: Dictionary = [("cow", bytes("moo"))].into_iter().collect();
        assert_eq!(
            decode(b"d3:cow3:mooe").unwrap(),
            Value::Dictionary(expected)
        );
    }

    #[test]
    fn dictionary_keeps_wire_order() {
        let value = decode(b"d1:bi1e1:ai2ee").unwrap();
        let keys: Vec<_> = value
            .as_dictionary()
            .unwrap()
            .keys()
            .map(|k| k.to_vec())
            .collect();

        assert_eq!(keys, vec![b"b".to_vec(), b"a".to_vec()]);
    }

    #[test]
    fn duplicate_key_overwrites() {
        let value = decode(b"d3:cowi1e3:cowi2ee").unwrap();
        let dictionary = value.as_dictionary().unwrap();

        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get("cow"), Some(&Value::Integer(2)));
    }

    #[test]
    fn nested() {
        let value = decode(b"d4:infod4:name4:teste4:listl4:spamli1eeee").unwrap();

        assert_eq!(
            value.get("info").and_then(|info| info.get("name")),
            Some(&bytes("test"))
        );
        assert_eq!(
            value.get("list"),
            Some(&Value::List(vec![
                bytes("spam"),
                Value::List(vec![Value::Integer(1)])
            ]))
        );
    }

    #[test]
    fn multiple_top_level_values() {
        assert_eq!(
            decode_all(b"4:spami42e").unwrap(),
            vec![bytes("spam"), Value::Integer(42)]
        );
        assert_eq!(decode_all(b"").unwrap(), vec![]);
    }

    #[test]
    fn single_value_rejects_trailing_data() {
        assert!(matches!(
            decode(b"i42eextra"),
            Err(Error::TrailingData { offset: 4 })
        ));
        assert!(matches!(decode(b""), Err(Error::UnexpectedEof { offset: 0 })));
    }

    #[rstest]
    #[case::string_no_colon(b"4spam")]
    #[case::integer_no_terminator(b"i42")]
    #[case::list_no_terminator(b"l4:spam42e")]
    #[case::dictionary_no_terminator(b"d3:cow3:moo")]
    #[case::unterminated_list(b"l")]
    fn missing_delimiter(#[case] input: &[u8]) {
        assert!(matches!(
            decode(input),
            Err(Error::MissingDelimiter { .. })
        ));
    }

    #[test]
    fn missing_delimiter_offsets() {
        assert!(matches!(
            decode(b"4spam"),
            Err(Error::MissingDelimiter { delimiter: ':', offset: 1 })
        ));
        assert!(matches!(
            decode(b"i42"),
            Err(Error::MissingDelimiter { delimiter: 'e', offset: 3 })
        ));
        assert!(matches!(
            decode(b"d3:cow3:moo"),
            Err(Error::MissingDelimiter { delimiter: 'e', offset: 11 })
        ));
    }

    #[test]
    fn length_overflow() {
        assert!(matches!(
            decode(b"5:spam"),
            Err(Error::LengthOverflow {
                offset: 0,
                declared: 5,
                remaining: 4
            })
        ));
    }

    #[rstest]
    #[case::huge(b"99999999999999999999999:x")]
    #[case::signed(b"-1:x")]
    fn malformed_length(#[case] input: &[u8]) {
        let result = Decoder::new(input).parse_byte_string();
        assert!(matches!(result, Err(Error::MalformedLength { offset: 0 })));
    }

    #[test]
    fn dictionary_key_must_be_byte_string() {
        assert!(matches!(
            decode(b"di1ei2ee"),
            Err(Error::MissingDelimiter { delimiter: ':', offset: 1 })
        ));
    }

    #[rstest]
    #[case::letter(b"x", b'x', 0)]
    #[case::in_list(b"l4:spamxe", b'x', 7)]
    #[case::terminator(b"e", b'e', 0)]
    #[case::non_ascii(b"l\xffe", 0xff, 1)]
    fn unknown_token(#[case] input: &[u8], #[case] token: u8, #[case] offset: usize) {
        match decode(input) {
            Err(Error::UnknownToken {
                token: t,
                offset: o,
            }) => {
                assert_eq!(t, token);
                assert_eq!(o, offset);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn dictionary_value_missing() {
        assert!(matches!(
            decode(b"d3:cow"),
            Err(Error::UnexpectedEof { offset: 6 })
        ));
    }

    #[test]
    fn unknown_token_is_shown_as_hex() {
        let err = decode(b"\xff").unwrap_err();
        assert_eq!(err.to_string(), "unknown token 0xff at offset 0");
    }

    #[test]
    fn dictionary_with_many_keys() {
        const KEYS: usize = 100_000;

        let mut input = vec![b'd'];
        for i in 0..KEYS {
            input.extend(format!("8:{i:08}i{i}e").as_bytes());
        }
        input.push(b'e');

        let value = decode(&input).unwrap();
        let dictionary = value.as_dictionary().unwrap();

        assert_eq!(dictionary.len(), KEYS);
        assert_eq!(dictionary.get("00000000"), Some(&Value::Integer(0)));
        assert_eq!(dictionary.get("00099999"), Some(&Value::Integer(99_999)));
        assert_eq!(
            dictionary.keys().nth(12_345).map(|k| k.to_vec()),
            Some(b"00012345".to_vec())
        );
    }

    #[test]
    fn nesting_limit() {
        let mut input = vec![b'l'; 3];
        input.extend([b'e'; 3]);

        assert!(Decoder::new(&input).with_max_depth(3).parse().is_ok());
        assert!(matches!(
            Decoder::new(&input).with_max_depth(2).parse(),
            Err(Error::NestingTooDeep { limit: 2, offset: 2 })
        ));
    }

    #[test]
    fn default_nesting_limit() {
        let depth = DEFAULT_MAX_DEPTH + 1;
        let mut input = vec![b'l'; depth];
        input.extend(vec![b'e'; depth]);

        assert!(matches!(
            decode(&input),
            Err(Error::NestingTooDeep { .. })
        ));
        assert!(decode(&input[1..input.len() - 1]).is_ok());
    }
}
