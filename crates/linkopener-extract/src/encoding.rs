//! Text decoding with a fallback chain: UTF-8, then Latin-1, then Windows-1252.

use encoding_rs::WINDOWS_1252;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }
}

/// Decode bytes with the first encoding of the chain that accepts them.
///
/// Latin-1 maps every byte, so it is only accepted when the input has no C1
/// control codes (0x80-0x9F); those almost always mean a Windows code page.
/// Windows-1252 is the last resort and substitutes anything it cannot map.
pub fn decode_with_fallback(bytes: &[u8]) -> (String, TextEncoding) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), TextEncoding::Utf8);
    }

    if !bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        let text = encoding_rs::mem::decode_latin1(bytes);
        return (text.into_owned(), TextEncoding::Latin1);
    }

    let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::debug!("Substituted undecodable bytes while decoding as windows-1252");
    }
    (text.into_owned(), TextEncoding::Windows1252)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let (text, encoding) = decode_with_fallback("café https://a.com".as_bytes());
        assert_eq!(text, "café https://a.com");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_bom_is_dropped() {
        let (text, _) = decode_with_fallback(b"\xEF\xBB\xBFhello");
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_latin1_fallback() {
        let (text, encoding) = decode_with_fallback(b"caf\xE9");
        assert_eq!(text, "café");
        assert_eq!(encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // 0x93/0x94 are curly quotes in windows-1252 and C1 controls in latin-1
        let (text, encoding) = decode_with_fallback(b"\x93http://a.com\x94");
        assert_eq!(text, "\u{201C}http://a.com\u{201D}");
        assert_eq!(encoding, TextEncoding::Windows1252);
    }
}
