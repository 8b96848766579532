//! Headers attached to a relayed artifact.
//!
//! The suggested filename is the last non-empty `/` segment of the accepted
//! URI, substituted literally when it is a plain header token. Anything
//! else (quotes, separators, whitespace, control or non-ASCII characters)
//! is emitted as an ASCII quoted fallback plus an RFC 5987 `filename*`, so
//! a crafted URI can never break out of the header value.

/// Content type of every relayed artifact; the upstream's is not forwarded.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Used when the URI has no non-empty segment at all.
const FALLBACK_FILENAME: &str = "download";

/// Headers for a successful relay of `uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayHeaders {
    pub content_type: &'static str,
    pub content_disposition: String,
}

impl RelayHeaders {
    pub fn for_uri(uri: &str) -> Self {
        Self {
            content_type: OCTET_STREAM,
            content_disposition: content_disposition(derive_filename(uri)),
        }
    }
}

/// Last non-empty `/`-separated segment of `uri`. Never used as a path.
pub fn derive_filename(uri: &str) -> &str {
    uri.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
}

/// `Content-Disposition` value for `filename`.
pub fn content_disposition(filename: &str) -> String {
    if is_plain_token(filename) {
        return format!("attachment; filename={filename}");
    }
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(filename),
        urlencoding::encode(filename)
    )
}

fn is_plain_token(name: &str) -> bool {
    name.bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b'\\' | b';' | b','))
}

fn ascii_fallback(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' ' => ' ',
            c if c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}
