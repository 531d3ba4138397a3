//! PEP 263 source encoding detection.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

#[allow(clippy::expect_used)]
static CODING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\x0c]*#.*?coding[:=][ \t]*([-\w.]+)").expect("coding regex is valid")
});

/// Returns the encoding declared by a coding cookie in the first two lines.
#[must_use]
pub fn declared_encoding(source: &[u8]) -> Option<String> {
    source
        .split(|&b| b == b'\n')
        .take(2)
        .find_map(|line| {
            CODING_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| String::from_utf8_lossy(m.as_bytes()).to_ascii_lowercase())
        })
}

/// Decodes raw source bytes to text using the declared encoding.
///
/// Labels are resolved as WHATWG encoding labels, also trying the label
/// with `-` and `_` removed so Python spellings like `latin-1` resolve.
/// Unknown labels fall back to UTF-8. Invalid sequences are replaced.
#[must_use]
pub fn decode_source(source: &[u8]) -> (String, String) {
    let source = source.strip_prefix(b"\xef\xbb\xbf").unwrap_or(source);
    let encoding = declared_encoding(source).unwrap_or_else(|| "utf-8".to_string());
    let codec = lookup(&encoding).unwrap_or_else(|| {
        debug!("Unknown source encoding {encoding:?}, decoding as UTF-8");
        UTF_8
    });
    let (text, _) = codec.decode_without_bom_handling(source);
    (text.into_owned(), encoding)
}

fn lookup(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(label.replace(['-', '_'], "").as_bytes()))
}
