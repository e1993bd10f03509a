//! LinkOpener Link Discovery
//!
//! Turns an arbitrary text blob into an ordered, de-duplicated set of absolute
//! `http(s)` URLs:
//!   1. explicit `http(s)://` URLs
//!   2. `www.`-prefixed hosts
//!   3. bare `host.tld/path` strings
//!
//! Candidates are cleaned of trailing punctuation, given a protocol when one can be
//! inferred, validated, and de-duplicated in first-seen order.

mod link;
mod normalizer;
mod validate;

pub use link::{LinkSet, NormalizedLink};
pub use normalizer::LinkNormalizer;
pub use validate::is_valid_link;
