//! Byte cursor and grammar sub-scanners.
//!
//! Every scanner is a forward walk over one shared cursor. On success the
//! cursor rests on the byte after the consumed token; on failure it rests on
//! the offending byte (or at the end of input).

use crate::error::ParseError;

pub(crate) const QUOTES: u8 = b'"';
pub(crate) const BACKSLASH: u8 = b'\\';
pub(crate) const BRACKET_L: u8 = b'[';
pub(crate) const BRACKET_R: u8 = b']';
pub(crate) const BRACES_L: u8 = b'{';
pub(crate) const BRACES_R: u8 = b'}';
pub(crate) const COMMA: u8 = b',';
pub(crate) const COLON: u8 = b':';

const NULL: &[u8] = b"null";
const TRUE: &[u8] = b"true";
const FALSE: &[u8] = b"false";

/// Flags tracked by [`Buffer::numeric`].
mod numeric {
    pub const SIGN: u8 = 1;
    pub const DOT: u8 = 2;
    pub const DIGIT: u8 = 4;
    pub const EXPONENT: u8 = 8;
}

#[inline]
pub(crate) fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\n' | b'\r' | b'\t')
}

#[derive(Debug)]
pub(crate) struct Buffer<'a> {
    data: &'a [u8],
    length: usize,
    pub(crate) index: usize,
}

impl<'a> Buffer<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            length: data.len(),
            index: 0,
        }
    }

    /// Skips whitespace and returns the next significant byte without
    /// consuming it.
    pub(crate) fn first(&mut self) -> Result<u8, ParseError> {
        while self.index < self.length {
            let c = self.data[self.index];
            if !is_whitespace(c) {
                return Ok(c);
            }
            self.index += 1;
        }
        Err(self.end())
    }

    /// Consumes the byte under the cursor.
    pub(crate) fn step(&mut self) -> Result<(), ParseError> {
        if self.index < self.length {
            self.index += 1;
            Ok(())
        } else {
            Err(self.end())
        }
    }

    /// Scans a quoted string. The cursor must be on the opening quote.
    ///
    /// A quote terminates the string unless an odd number of backslashes
    /// immediately precede it.
    pub(crate) fn string(&mut self) -> Result<(), ParseError> {
        debug_assert_eq!(self.data.get(self.index), Some(&QUOTES));
        self.step()?;
        let mut escaped = false;
        while self.index < self.length {
            match self.data[self.index] {
                QUOTES if !escaped => {
                    self.index += 1;
                    return Ok(());
                }
                BACKSLASH => escaped = !escaped,
                _ => escaped = false,
            }
            self.index += 1;
        }
        Err(self.end())
    }

    /// Scans a numeric token.
    ///
    /// The accepted grammar is wider than RFC 8259: a leading `+`, a bare
    /// leading `.`, and a fractional part after the exponent
    /// (`1.123e3.456`) are all taken as part of one token.
    pub(crate) fn numeric(&mut self) -> Result<(), ParseError> {
        use numeric::{DIGIT, DOT, EXPONENT, SIGN};

        let mut find = 0u8;
        while self.index < self.length {
            let c = self.data[self.index];
            match c {
                b'0'..=b'9' => find |= DIGIT,
                b'.' => {
                    if find & DOT != 0 {
                        return Err(self.symbol(c));
                    }
                    // a dot needs digits of its own; the sign slot closes
                    find = (find & EXPONENT) | DOT;
                }
                b'+' | b'-' => {
                    if find != 0 && find != EXPONENT {
                        return Err(self.symbol(c));
                    }
                    find |= SIGN;
                }
                b'e' | b'E' => {
                    if find & EXPONENT != 0 {
                        return Err(self.symbol(c));
                    }
                    find = EXPONENT;
                }
                _ if find & DIGIT != 0 => return Ok(()),
                _ => return Err(self.symbol(c)),
            }
            self.index += 1;
        }
        if find & DIGIT != 0 {
            Ok(())
        } else {
            Err(self.end())
        }
    }

    pub(crate) fn null(&mut self) -> Result<(), ParseError> {
        self.word(NULL)
    }

    pub(crate) fn true_(&mut self) -> Result<(), ParseError> {
        self.word(TRUE)
    }

    pub(crate) fn false_(&mut self) -> Result<(), ParseError> {
        self.word(FALSE)
    }

    /// Matches a lowercase ASCII word, accepting either case per byte.
    fn word(&mut self, word: &[u8]) -> Result<(), ParseError> {
        for &expected in word {
            let Some(&c) = self.data.get(self.index) else {
                return Err(self.end());
            };
            if c != expected && c != expected - 32 {
                return Err(self.symbol(c));
            }
            self.index += 1;
        }
        Ok(())
    }

    /// Scans forward to an unescaped `terminator`, consuming it, and returns
    /// the span before it. With `trim`, surrounding whitespace is excluded from
    /// the span.
    pub(crate) fn scan(&mut self, terminator: u8, trim: bool) -> Result<(usize, usize), ParseError> {
        let mut from = self.index;
        let mut to = self.index;
        let mut found = false;
        let mut escaped = false;
        while self.index < self.length {
            let c = self.data[self.index];
            if c == terminator && !escaped {
                self.index += 1;
                return Ok((from, to));
            }
            escaped = c == BACKSLASH && !escaped;
            if trim && is_whitespace(c) {
                if !found {
                    from += 1;
                    to += 1;
                }
            } else {
                found = true;
                to = self.index + 1;
            }
            self.index += 1;
        }
        Err(self.end())
    }

    #[inline]
    pub(crate) fn symbol(&self, c: u8) -> ParseError {
        ParseError::UnexpectedSymbol {
            symbol: c,
            position: self.index,
        }
    }

    #[inline]
    pub(crate) fn end(&self) -> ParseError {
        ParseError::UnexpectedEnd {
            position: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn scan_numeric(input: &str) -> Result<usize, ParseError> {
        let mut buf = Buffer::new(input.as_bytes());
        buf.numeric().map(|()| buf.index)
    }

    #[test]
    fn first_skips_whitespace_without_consuming() {
        let mut buf = Buffer::new(b" \r\n\t[");
        assert_eq!(buf.first(), Ok(b'['));
        assert_eq!(buf.index, 4);
        assert_eq!(buf.first(), Ok(b'['));
    }

    #[test]
    fn first_on_blank_input_is_end() {
        let mut buf = Buffer::new(b"  \n");
        assert_eq!(buf.first(), Err(ParseError::UnexpectedEnd { position: 3 }));
    }

    #[test]
    fn step_fails_past_the_end() {
        let mut buf = Buffer::new(b"x");
        assert_eq!(buf.step(), Ok(()));
        assert_eq!(buf.step(), Err(ParseError::UnexpectedEnd { position: 1 }));
    }

    #[rstest]
    #[case(r#""""#, 2)]
    #[case(r#""cat" tail"#, 5)]
    #[case(r#""good \"cat\"""#, 14)]
    #[case(r#""a\\" rest"#, 5)]
    #[case(r#""a\\\"b""#, 8)]
    fn string_stops_after_unescaped_quote(#[case] input: &str, #[case] end: usize) {
        let mut buf = Buffer::new(input.as_bytes());
        assert_eq!(buf.string(), Ok(()));
        assert_eq!(buf.index, end);
    }

    #[rstest]
    #[case("\"")]
    #[case("\"c")]
    #[case(r#""abc\""#)]
    fn unterminated_string_is_end(#[case] input: &str) {
        let mut buf = Buffer::new(input.as_bytes());
        assert!(matches!(buf.string(), Err(ParseError::UnexpectedEnd { .. })));
    }

    #[rstest]
    #[case("1", 1)]
    #[case("-1.5,", 4)]
    #[case("+.456]", 5)]
    #[case("1e+3}", 4)]
    #[case("1.123e3.456", 11)]
    #[case("-1.123E-3.456 ", 13)]
    #[case("1null", 1)]
    #[case("e1", 2)]
    fn numeric_accepts(#[case] input: &str, #[case] end: usize) {
        assert_eq!(scan_numeric(input), Ok(end));
    }

    #[rstest]
    #[case("1+1")]
    #[case("-1+")]
    #[case("e+1-")]
    #[case("1e3e4")]
    #[case("1.2.3")]
    #[case("x1")]
    fn numeric_rejects_symbol(#[case] input: &str) {
        assert!(matches!(
            scan_numeric(input),
            Err(ParseError::UnexpectedSymbol { .. })
        ));
    }

    #[rstest]
    #[case(".")]
    #[case("-")]
    #[case("+.")]
    #[case("e+")]
    #[case("1.")]
    fn numeric_without_digit_is_end(#[case] input: &str) {
        assert!(matches!(
            scan_numeric(input),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[rstest]
    #[case(b"null", true)]
    #[case(b"NULL", true)]
    #[case(b"nUlL", true)]
    #[case(b"NILL", false)]
    #[case(b"nul", false)]
    fn null_is_case_insensitive(#[case] input: &[u8], #[case] ok: bool) {
        let mut buf = Buffer::new(input);
        assert_eq!(buf.null().is_ok(), ok);
    }

    #[test]
    fn word_reports_position_of_mismatch() {
        let mut buf = Buffer::new(b"trUx");
        assert_eq!(
            buf.true_(),
            Err(ParseError::UnexpectedSymbol {
                symbol: b'x',
                position: 3
            })
        );
        let mut buf = Buffer::new(b"fals");
        assert_eq!(buf.false_(), Err(ParseError::UnexpectedEnd { position: 4 }));
    }

    #[test]
    fn scan_trims_whitespace() {
        let mut buf = Buffer::new(b"  key name \t: 1");
        assert_eq!(buf.scan(COLON, true), Ok((2, 10)));
        assert_eq!(buf.index, 13);
        let mut buf = Buffer::new(b"a\\:b:");
        assert_eq!(buf.scan(COLON, false), Ok((0, 4)));
    }
}
