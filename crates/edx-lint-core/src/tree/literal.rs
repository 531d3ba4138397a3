//! Literal constant values and Python literal parsing.

/// Value of a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Text string.
    Str(String),
    /// Byte string, decoded lossily for display.
    Bytes(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// `True` or `False`.
    Bool(bool),
    /// `None`.
    None,
    /// `...`.
    Ellipsis,
}

impl Literal {
    /// Python truthiness of the value.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Str(s) | Self::Bytes(s) => !s.is_empty(),
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Bool(b) => *b,
            Self::None => false,
            Self::Ellipsis => true,
        }
    }

    /// Returns the string payload of a text string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// A single string literal split into prefix and body.
pub(crate) struct StringParts<'a> {
    pub prefix: &'a str,
    pub body: &'a str,
}

impl StringParts<'_> {
    pub fn is_format(&self) -> bool {
        self.prefix.contains(['f', 'F'])
    }

    pub fn is_bytes(&self) -> bool {
        self.prefix.contains(['b', 'B'])
    }

    pub fn is_raw(&self) -> bool {
        self.prefix.contains(['r', 'R'])
    }
}

/// Splits a string token like `rb'''x'''` into prefix and body.
pub(crate) fn split_string(token: &str) -> Option<StringParts<'_>> {
    let quote_at = token.find(['\'', '"'])?;
    let (prefix, quoted) = token.split_at(quote_at);
    let quote = if quoted.starts_with("'''") || quoted.starts_with("\"\"\"") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    let body = quoted.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(StringParts { prefix, body })
}

/// Parses the value of a non-format string token.
pub(crate) fn parse_string(token: &str) -> Option<(String, bool)> {
    let parts = split_string(token)?;
    let value = if parts.is_raw() {
        parts.body.to_string()
    } else {
        unescape(parts.body)
    };
    Some((value, parts.is_bytes()))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('x') => {
                let hex: String = (0..2).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            Some(kind @ ('u' | 'U')) => {
                let width = if kind == 'u' { 4 } else { 8 };
                let hex: String = (0..width).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parses an integer token (`10`, `0x1f`, `1_000`).
pub(crate) fn parse_int(token: &str) -> Option<i64> {
    let cleaned = token.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_strings() {
        assert_eq!(parse_string("'abc'"), Some(("abc".to_string(), false)));
        assert_eq!(parse_string("\"a\\nb\""), Some(("a\nb".to_string(), false)));
        assert_eq!(parse_string("r'a\\nb'"), Some(("a\\nb".to_string(), false)));
        assert_eq!(parse_string("b'xy'"), Some(("xy".to_string(), true)));
        assert_eq!(
            parse_string("'''multi\nline'''"),
            Some(("multi\nline".to_string(), false))
        );
    }

    #[test]
    fn test_format_prefix() {
        let parts = split_string("f'{x}'").unwrap();
        assert!(parts.is_format());
        assert_eq!(parts.body, "{x}");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("1j"), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Literal::Bool(false).is_truthy());
        assert!(!Literal::Int(0).is_truthy());
        assert!(Literal::Str("x".into()).is_truthy());
        assert!(!Literal::None.is_truthy());
    }
}
