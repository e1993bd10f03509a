//! Link normalizer
//!
//! Scans text with three pattern classes, in order:
//! 1. explicit `http(s)://` URLs
//! 2. `www.`-prefixed hosts
//! 3. bare `host.tld/path` strings
//!
//! A later class never re-reports text already claimed by an earlier one, so
//! `http://www.example.com` yields one link, not two.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::link::{LinkSet, NormalizedLink};
use crate::validate::is_valid_link;

/// Characters that end a URL: whitespace, ASCII quotes and angle brackets, and
/// the typographic quotes and CJK brackets that wrap links in prose
const URL_BODY: &str = r#"[^\s<>"'`“”‘’„«»‹›「」『』【】〈〉《》（）]"#;

static EXPLICIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bhttps?://{}+", URL_BODY)).expect("explicit URL pattern is valid")
});

static WWW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bwww\.{}+", URL_BODY)).expect("www pattern is valid")
});

static BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{{2,}}\b(?::\d{{1,5}})?(?:[/?#]{}*)?",
        URL_BODY
    ))
    .expect("bare host pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternClass {
    Explicit,
    Www,
    Bare,
}

#[derive(Debug)]
struct Candidate<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

#[derive(Debug, Default, Clone)]
pub struct LinkNormalizer;

impl LinkNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Extract every link from `text`, normalized and de-duplicated in first-seen order
    pub fn normalize(&self, text: &str) -> LinkSet {
        let candidates = self.candidates(text);
        let total = candidates.len();

        let set: LinkSet = candidates
            .into_iter()
            .filter_map(|c| self.normalize_candidate(c.text))
            .collect();

        tracing::debug!(candidates = total, links = set.len(), "Normalized links");

        set
    }

    /// Clean, complete and validate a single candidate string
    pub fn normalize_candidate(&self, candidate: &str) -> Option<NormalizedLink> {
        let cleaned = strip_trailing_punctuation(candidate.trim());
        if cleaned.is_empty() {
            return None;
        }

        let absolute = with_protocol(cleaned)?;
        if !is_valid_link(&absolute) {
            return None;
        }

        Some(NormalizedLink::new_unchecked(absolute))
    }

    /// Collect raw matches from all pattern classes, ordered by position in the text
    fn candidates<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        let mut found: Vec<Candidate<'a>> = Vec::new();

        for class in [PatternClass::Explicit, PatternClass::Www, PatternClass::Bare] {
            let pattern: &Regex = match class {
                PatternClass::Explicit => &EXPLICIT,
                PatternClass::Www => &WWW,
                PatternClass::Bare => &BARE,
            };

            for m in pattern.find_iter(text) {
                let (start, end) = (m.start(), m.end());

                if found.iter().any(|c| start < c.end && c.start < end) {
                    continue;
                }
                if class != PatternClass::Explicit && !starts_at_boundary(text, start) {
                    continue;
                }
                if class == PatternClass::Bare && text[end..].starts_with('@') {
                    continue;
                }

                found.push(Candidate {
                    start,
                    end,
                    text: m.as_str(),
                });
            }
        }

        found.sort_by_key(|c| c.start);
        found
    }
}

/// Host-like matches must not continue a word, path, or e-mail address
fn starts_at_boundary(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(prev) => !(prev.is_alphanumeric() || matches!(prev, '.' | '-' | '/' | '@' | '_')),
    }
}

/// Drop trailing sentence punctuation (ASCII and full-width) and unbalanced
/// closing brackets
fn strip_trailing_punctuation(candidate: &str) -> &str {
    let mut s = candidate;

    while let Some(last) = s.chars().next_back() {
        let strip = match last {
            '.' | ',' | ':' | ';' | '!' | '?' => true,
            '。' | '、' | '，' | '．' | '：' | '；' | '！' | '？' | '…' => true,
            ')' => unbalanced(s, '(', ')'),
            ']' => unbalanced(s, '[', ']'),
            '}' => unbalanced(s, '{', '}'),
            _ => false,
        };
        if !strip {
            break;
        }
        s = &s[..s.len() - last.len_utf8()];
    }

    s
}

fn unbalanced(s: &str, open: char, close: char) -> bool {
    s.matches(close).count() > s.matches(open).count()
}

/// Lower-case an explicit scheme or infer `https://`; `None` when too ambiguous
fn with_protocol(candidate: &str) -> Option<String> {
    for scheme in ["https://", "http://"] {
        if starts_with_ignore_case(candidate, scheme) {
            return Some(format!("{}{}", scheme, &candidate[scheme.len()..]));
        }
    }

    if starts_with_ignore_case(candidate, "www.") || looks_like_domain(candidate) {
        return Some(format!("https://{}", candidate));
    }

    None
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// `label.tld` shape: at least one dot and a final label of 2+ letters
fn looks_like_domain(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }

    let host = candidate
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(candidate);
    let host = host.split(':').next().unwrap_or(host);

    match host.rsplit_once('.') {
        Some((label, tld)) => {
            !label.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}
