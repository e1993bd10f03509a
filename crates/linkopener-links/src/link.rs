//! Link data structures

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A validated absolute URL beginning with `http://` or `https://`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedLink(String);

impl NormalizedLink {
    /// Wrap a string that already passed normalization
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered set of links, unique by exact string, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<NormalizedLink>", into = "Vec<NormalizedLink>")]
pub struct LinkSet {
    links: Vec<NormalizedLink>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link unless it is already present. Returns true if it was added.
    pub fn push(&mut self, link: NormalizedLink) -> bool {
        if self.seen.contains(link.as_str()) {
            return false;
        }
        self.seen.insert(link.as_str().to_string());
        self.links.push(link);
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedLink> {
        self.links.get(index)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedLink> {
        self.links.iter()
    }

    pub fn as_slice(&self) -> &[NormalizedLink] {
        &self.links
    }

    pub fn into_vec(self) -> Vec<NormalizedLink> {
        self.links
    }

    /// Render as `index. url` lines with a 1-based index, the export format
    pub fn to_export_text(&self) -> String {
        let mut out = String::new();
        for (i, link) in self.links.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, link));
        }
        out
    }
}

impl FromIterator<NormalizedLink> for LinkSet {
    fn from_iter<I: IntoIterator<Item = NormalizedLink>>(iter: I) -> Self {
        let mut set = LinkSet::new();
        for link in iter {
            set.push(link);
        }
        set
    }
}

impl From<Vec<NormalizedLink>> for LinkSet {
    fn from(links: Vec<NormalizedLink>) -> Self {
        links.into_iter().collect()
    }
}

impl From<LinkSet> for Vec<NormalizedLink> {
    fn from(set: LinkSet) -> Self {
        set.links
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a NormalizedLink;
    type IntoIter = std::slice::Iter<'a, NormalizedLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl IntoIterator for LinkSet {
    type Item = NormalizedLink;
    type IntoIter = std::vec::IntoIter<NormalizedLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}
