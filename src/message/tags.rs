//! IRCv3 message tag parsing and escaping.

use std::borrow::Cow;
use std::fmt::{Result as FmtResult, Write};

use crate::message::Tag;

/// Escape a tag value for serialization.
///
/// Escapes special characters according to the IRCv3 message-tags spec.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Unescape a tag value from wire format.
///
/// Reverses the escaping applied by [`escape_tag_value`]. A lone trailing
/// backslash is dropped, and unknown escapes collapse to the escaped
/// character, per the IRCv3 spec.
pub(crate) fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

/// Intern common tag keys to avoid allocations.
///
/// The tags this engine inspects on every message (`time`, `batch`,
/// `label`) and the other frequent IRCv3 keys are returned borrowed.
#[inline]
fn intern_tag_key(key: &str) -> Cow<'static, str> {
    match key {
        "time" => Cow::Borrowed("time"),
        "batch" => Cow::Borrowed("batch"),
        "label" => Cow::Borrowed("label"),
        "msgid" => Cow::Borrowed("msgid"),
        "account" => Cow::Borrowed("account"),
        _ => Cow::Owned(key.to_owned()),
    }
}

/// Parse a raw tag block (without the leading `@`) into tags.
///
/// Keys without `=` carry no value; values are unescaped.
pub(crate) fn parse_tag_block(tags_str: &str) -> Vec<Tag> {
    tags_str
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| {
            let mut iter = tag.splitn(2, '=');
            let key = iter.next().unwrap_or("");
            let value = iter.next().map(unescape_tag_value);
            Tag(intern_tag_key(key), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// IRCv3 specifies these escape sequences:
    /// - `\:` → `;` (semicolon)
    /// - `\s` → ` ` (space)
    /// - `\\` → `\` (backslash)
    /// - `\r` → CR (carriage return)
    /// - `\n` → LF (line feed)
    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape_tag_value("a\\:b"), "a;b");
        assert_eq!(unescape_tag_value("hello\\sworld"), "hello world");
        assert_eq!(unescape_tag_value("path\\\\file"), "path\\file");
        assert_eq!(unescape_tag_value("line\\rend"), "line\rend");
        assert_eq!(unescape_tag_value("line\\nend"), "line\nend");
    }

    #[test]
    fn test_unescape_combined() {
        let input = "a\\:b\\sc\\\\d\\re\\nf";
        let expected = "a;b c\\d\re\nf";
        assert_eq!(unescape_tag_value(input), expected);
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        // Trailing backslash with no following char should be dropped per IRCv3
        assert_eq!(unescape_tag_value("test\\"), "test");
    }

    #[test]
    fn test_unescape_unknown_escape() {
        // Unknown escape sequences: \x becomes x (backslash dropped)
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
    }

    #[test]
    fn test_escape_roundtrip() {
        let test_values = vec![
            "simple",
            "with space",
            "with;semicolon",
            "with\\backslash",
            "with\nnewline",
            "with\rcarriage",
            "complex; \\ \n \r all",
        ];

        for original in test_values {
            let mut escaped = String::new();
            escape_tag_value(&mut escaped, original).unwrap();
            let unescaped = unescape_tag_value(&escaped);
            assert_eq!(
                unescaped, original,
                "Roundtrip failed: '{}' -> '{}' -> '{}'",
                original, escaped, unescaped
            );
        }
    }

    #[test]
    fn test_parse_tag_block() {
        let tags = parse_tag_block("time=2023-01-01T00:00:00Z;bot;key=a\\sb");
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].0.as_ref(), "time");
        assert_eq!(tags[0].1.as_deref(), Some("2023-01-01T00:00:00Z"));
        assert_eq!(tags[1].0.as_ref(), "bot");
        assert_eq!(tags[1].1, None);
        assert_eq!(tags[2].1.as_deref(), Some("a b"));
    }

    #[test]
    fn test_parse_tag_block_skips_empty_segments() {
        let tags = parse_tag_block("a=1;;b=2");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_intern_common_tags() {
        let tags = parse_tag_block("time=x;custom=y");
        assert!(matches!(tags[0].0, Cow::Borrowed(_)));
        assert!(matches!(tags[1].0, Cow::Owned(_)));
    }
}
