//! Syntactic link validation
//!
//! With the `url-parse` feature a candidate must parse as a URL with an
//! `http`/`https` scheme and a dotted host. Without it, a regex shape check
//! (`scheme://non-dot-chars.anything`) stands in.

#[cfg(not(feature = "url-parse"))]
use once_cell::sync::Lazy;
#[cfg(not(feature = "url-parse"))]
use regex::Regex;

/// Check whether an absolute candidate is a well-formed link
pub fn is_valid_link(candidate: &str) -> bool {
    validate(candidate)
}

#[cfg(feature = "url-parse")]
fn validate(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url
                    .host_str()
                    .map(|host| !host.is_empty() && host.contains('.'))
                    .unwrap_or(false)
        }
        Err(e) => {
            tracing::trace!(candidate, error = %e, "Rejected link");
            false
        }
    }
}

#[cfg(not(feature = "url-parse"))]
static SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^./\s]+\..+").expect("shape pattern is valid"));

#[cfg(not(feature = "url-parse"))]
fn validate(candidate: &str) -> bool {
    SHAPE.is_match(candidate)
}
