//! Rich Text Format
//!
//! A small tokenizer over the RTF group structure. Control words are dropped
//! except for the few that carry text (`\par`, `\tab`, `\'hh`, `\uN`), and the
//! non-visible destinations (font table, styles, pictures, ...) are skipped.
//! `HYPERLINK` field instructions are collected and appended as targets.

use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use encoding_rs::WINDOWS_1252;

use crate::encoding::decode_with_fallback;
use crate::registry::Extractor;
use crate::Result;

pub struct RtfExtractor;

impl Extractor for RtfExtractor {
    fn capability(&self) -> &'static str {
        "rtf"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = super::read_bytes(path)?;
        let (source, encoding) = decode_with_fallback(&bytes);
        tracing::debug!(encoding = encoding.as_str(), "Decoded rtf source");

        let (text, links) = Parser::new(&source).run();
        Ok(super::join_text_and_links(text, links))
    }
}

/// Destinations whose content is never visible
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "listtable",
    "listoverridetable",
    "revtbl",
    "rsidtbl",
    "filetbl",
    "generator",
    "themedata",
    "colorschememapping",
    "datastore",
    "latentstyles",
    "xmlnstbl",
    "bkmkstart",
    "bkmkend",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Text,
    Field,
    Skip,
}

#[derive(Debug, Clone, Copy)]
struct Group {
    sink: Sink,
    /// Fallback characters following a `\uN` escape
    uc: usize,
    /// This group opened the field instruction
    field_root: bool,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            sink: Sink::Text,
            uc: 1,
            field_root: false,
        }
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    stack: Vec<Group>,
    group: Group,
    text: String,
    field: String,
    links: Vec<String>,
    /// `\*` seen at the start of the current group
    ignorable: bool,
    /// Fallback characters still to drop after a `\uN`
    pending_skip: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            stack: Vec::new(),
            group: Group::default(),
            text: String::new(),
            field: String::new(),
            links: Vec::new(),
            ignorable: false,
            pending_skip: 0,
        }
    }

    fn run(mut self) -> (String, Vec<String>) {
        while let Some(c) = self.chars.next() {
            match c {
                '{' => {
                    self.stack.push(self.group);
                    self.group.field_root = false;
                    self.ignorable = false;
                    self.pending_skip = 0;
                }
                '}' => self.close_group(),
                '\\' => self.control(),
                '\r' | '\n' => {}
                other => self.emit_char(other),
            }
        }
        (self.text, self.links)
    }

    fn close_group(&mut self) {
        if self.group.field_root {
            let instruction = std::mem::take(&mut self.field);
            if let Some(target) = hyperlink_target(&instruction) {
                self.links.push(target);
            }
        }
        self.group = self.stack.pop().unwrap_or_default();
        self.pending_skip = 0;
    }

    fn emit_char(&mut self, c: char) {
        if self.pending_skip > 0 {
            self.pending_skip -= 1;
            return;
        }
        match self.group.sink {
            Sink::Text => self.text.push(c),
            Sink::Field => self.field.push(c),
            Sink::Skip => {}
        }
    }

    fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_char(c);
        }
    }

    fn control(&mut self) {
        let Some(&next) = self.chars.peek() else {
            return;
        };

        if !next.is_ascii_alphabetic() {
            self.chars.next();
            match next {
                '\'' => {
                    let hex: String = (0..2).filter_map(|_| self.chars.next()).collect();
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        let buf = [byte];
                        let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&buf);
                        self.emit_str(&decoded);
                    }
                }
                '*' => self.ignorable = true,
                '~' => self.emit_char(' '),
                '_' => self.emit_char('-'),
                '\r' | '\n' => self.emit_char('\n'),
                '\\' | '{' | '}' => self.emit_char(next),
                _ => {}
            }
            return;
        }

        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            word.push(c);
            self.chars.next();
        }

        let mut digits = String::new();
        if self.chars.peek() == Some(&'-') {
            digits.push('-');
            self.chars.next();
        }
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.chars.next();
        }
        let param: Option<i32> = digits.parse().ok();

        if self.chars.peek() == Some(&' ') {
            self.chars.next();
        }

        self.apply_word(&word, param);
    }

    fn apply_word(&mut self, word: &str, param: Option<i32>) {
        if word == "fldinst" {
            if self.group.sink != Sink::Skip {
                self.group.sink = Sink::Field;
                self.group.field_root = true;
                self.field.clear();
            }
            self.ignorable = false;
            return;
        }

        if self.ignorable || SKIPPED_DESTINATIONS.contains(&word) {
            self.group.sink = Sink::Skip;
            self.ignorable = false;
            return;
        }

        match word {
            "par" | "line" | "sect" | "page" => self.emit_char('\n'),
            "row" => self.emit_char('\n'),
            "tab" | "cell" => self.emit_char('\t'),
            "emdash" => self.emit_char('\u{2014}'),
            "endash" => self.emit_char('\u{2013}'),
            "lquote" => self.emit_char('\u{2018}'),
            "rquote" => self.emit_char('\u{2019}'),
            "ldblquote" => self.emit_char('\u{201C}'),
            "rdblquote" => self.emit_char('\u{201D}'),
            "bullet" => self.emit_char('\u{2022}'),
            "uc" => self.group.uc = param.unwrap_or(1).max(0) as usize,
            "u" => {
                if let Some(code) = param {
                    let code = if code < 0 { code + 65536 } else { code };
                    if let Some(c) = char::from_u32(code as u32) {
                        self.emit_char(c);
                    }
                    self.pending_skip = self.group.uc;
                }
            }
            _ => {}
        }
    }
}

/// Target of a `HYPERLINK "url"` field instruction
fn hyperlink_target(instruction: &str) -> Option<String> {
    let rest = instruction.trim_start();
    let rest = rest.strip_prefix("HYPERLINK")?.trim_start();

    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some(quoted[..end].to_string()).filter(|t| !t.is_empty());
    }

    rest.split_whitespace()
        .find(|token| !token.starts_with('\\'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fixtures::file_with;

    fn parse(source: &str) -> (String, Vec<String>) {
        Parser::new(source).run()
    }

    #[test]
    fn test_control_words_are_dropped() {
        let (text, links) = parse(
            r"{\rtf1\ansi\deff0{\fonttbl{\f0 Times New Roman;}}{\colortbl;\red0\green0\blue0;}\f0\fs24 Visit https://example.com/docs\par Second\tab line}",
        );
        assert_eq!(text, "Visit https://example.com/docs\nSecond\tline");
        assert!(links.is_empty());
    }

    #[test]
    fn test_hex_and_unicode_escapes() {
        let (text, _) = parse(r"{\rtf1 caf\'e9 \u8364?5 {\uc2\u8364 xx}}");
        assert_eq!(text, "café €5 €");
    }

    #[test]
    fn test_hyperlink_field_instruction() {
        let (text, links) = parse(
            r#"{\rtf1 Go {\field{\*\fldinst{HYPERLINK "https://field.example.com/x"}}{\fldrslt{\ul here}}} now}"#,
        );
        assert_eq!(text, "Go here now");
        assert_eq!(links, vec!["https://field.example.com/x"]);
    }

    #[test]
    fn test_ignorable_destination_skipped() {
        let (text, _) = parse(r"{\rtf1 {\*\generator Writer;}{\*\unknowndest hidden}shown}");
        assert_eq!(text, "shown");
    }

    #[test]
    fn test_escaped_braces() {
        let (text, _) = parse(r"{\rtf1 a \{b\} c\\d}");
        assert_eq!(text, r"a {b} c\d");
    }

    #[test]
    fn test_extract_appends_field_links() {
        let file = file_with(
            ".rtf",
            br#"{\rtf1 Plain text{\field{\*\fldinst HYPERLINK "http://rtf.example.org"}{\fldrslt link}}}"#,
        );
        let text = RtfExtractor.extract(file.path()).unwrap();
        assert_eq!(text, "Plain textlink\nhttp://rtf.example.org");
    }
}
