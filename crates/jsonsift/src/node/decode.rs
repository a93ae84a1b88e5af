//! Lazy decoding of scalar text.

use bstr::{BStr, ByteSlice};

use crate::error::NodeError;

const REPLACEMENT: char = '\u{FFFD}';

pub(super) fn boolean(text: &BStr) -> bool {
    text.eq_ignore_ascii_case(b"true")
}

pub(super) fn numeric(text: &BStr) -> Result<f64, NodeError> {
    text.to_str()
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| NodeError::InvalidNumber(text.to_str_lossy().into_owned()))
}

/// Decodes a quoted string literal, resolving escapes.
pub(crate) fn string(text: &BStr) -> Result<String, NodeError> {
    let inner = text
        .strip_prefix(b"\"")
        .and_then(|rest| rest.strip_suffix(b"\""))
        .ok_or(NodeError::InvalidString("missing quotes"))?;

    if !inner.contains(&b'\\') {
        return inner
            .to_str()
            .map(str::to_owned)
            .map_err(|_| NodeError::InvalidString("invalid utf-8"));
    }

    let mut out = Vec::with_capacity(inner.len());
    let mut bytes = inner.iter().copied();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let decoded = match bytes.next() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{8}',
            Some(b'f') => '\u{c}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => unicode(&mut bytes)?,
            _ => return Err(NodeError::InvalidString("invalid escape sequence")),
        };
        let mut buf = [0u8; 4];
        out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
    }
    String::from_utf8(out).map_err(|_| NodeError::InvalidString("invalid utf-8"))
}

/// Decodes the code point after `\u`, pairing surrogates when a low
/// surrogate escape follows. An unpaired surrogate decodes to U+FFFD.
fn unicode<I>(bytes: &mut I) -> Result<char, NodeError>
where
    I: Iterator<Item = u8> + Clone,
{
    let high = hex4(bytes)?;
    if !(0xD800..0xDC00).contains(&high) {
        return Ok(char::from_u32(high).unwrap_or(REPLACEMENT));
    }
    let mut ahead = bytes.clone();
    if ahead.next() == Some(b'\\') && ahead.next() == Some(b'u') {
        let low = hex4(&mut ahead)?;
        if (0xDC00..0xE000).contains(&low) {
            *bytes = ahead;
            let c = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return Ok(char::from_u32(c).unwrap_or(REPLACEMENT));
        }
    }
    Ok(REPLACEMENT)
}

fn hex4<I: Iterator<Item = u8>>(bytes: &mut I) -> Result<u32, NodeError> {
    let mut n = 0;
    for _ in 0..4 {
        let digit = bytes
            .next()
            .and_then(|b| char::from(b).to_digit(16))
            .ok_or(NodeError::InvalidString("invalid unicode escape"))?;
        n = n * 16 + digit;
    }
    Ok(n)
}
