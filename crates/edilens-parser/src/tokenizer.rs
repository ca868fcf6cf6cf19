//! Segment tokenizer

use crate::ParseError;
use edilens_domain::Segment;
use edilens_registry::CodeRegistry;
use tracing::debug;

/// EDIFACT release character
pub const RELEASE_CHAR: char = '?';

const SEGMENT_TERMINATOR: char = '\'';

/// Characters that lose their delimiter meaning after a release character
const RELEASABLE: [char; 4] = ['+', ':', '\'', '?'];

/// How segments are separated in a raw message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterStyle {
    /// Segments end with an apostrophe
    Apostrophe,
    /// One segment per line
    LineBreak,
}

/// Detect how segments are separated
///
/// Apostrophe-terminated when an unescaped apostrophe exists and either the
/// text is a single line or at least one line ends with an unescaped
/// apostrophe. Line-delimited text whose free-text fields happen to contain
/// an apostrophe (`NAD+MR+...+O'Brien Energie`) therefore stays line-delimited.
pub fn delimiter_style(text: &str) -> DelimiterStyle {
    if split_unescaped(text, |c| c == SEGMENT_TERMINATOR).len() < 2 {
        return DelimiterStyle::LineBreak;
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() <= 1 || lines.iter().any(|line| ends_with_terminator(line)) {
        DelimiterStyle::Apostrophe
    } else {
        DelimiterStyle::LineBreak
    }
}

/// Resolve release characters: `?+` → `+`, `?:` → `:`, `?'` → `'`, `??` → `?`
///
/// A `?` in front of any other character is kept as-is.
pub fn strip_release_chars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == RELEASE_CHAR {
            if let Some(&next) = chars.peek() {
                if RELEASABLE.contains(&next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Tokenize with the built-in registry
pub fn tokenize(text: &str) -> Result<Vec<Segment>, ParseError> {
    tokenize_with(text, CodeRegistry::builtin())
}

/// Tokenize `text` into segments, attaching descriptions from `registry`
///
/// `+` and `:` are both treated as element separators, producing one flat
/// element list per segment. Escaped delimiters stay part of their element.
pub fn tokenize_with(text: &str, registry: &CodeRegistry) -> Result<Vec<Segment>, ParseError> {
    let style = delimiter_style(text);
    let raw_segments: Vec<&str> = match style {
        DelimiterStyle::Apostrophe => split_unescaped(text, |c| c == SEGMENT_TERMINATOR),
        DelimiterStyle::LineBreak => text.lines().collect(),
    };

    let mut segments = Vec::new();
    for raw in raw_segments {
        let original = raw.trim();
        if original.is_empty() {
            continue;
        }

        let mut tokens = split_unescaped(original, |c| c == '+' || c == ':')
            .into_iter()
            .map(strip_release_chars);

        let tag = tokens.next().unwrap_or_default().trim().to_uppercase();
        if tag.is_empty() {
            debug!("Skipping segment without tag: {}", original);
            continue;
        }

        let elements: Vec<String> = tokens.collect();
        let description = registry.segment_description(&tag).to_string();
        segments.push(Segment::new(tag, elements, original).with_description(description));
    }

    if segments.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    debug!("Tokenized {} segments ({:?} delimited)", segments.len(), style);
    Ok(segments)
}

/// Split at every unescaped delimiter; escapes are kept in the pieces
fn split_unescaped(text: &str, is_delimiter: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if c == RELEASE_CHAR {
            if let Some(&(_, next)) = chars.peek() {
                if RELEASABLE.contains(&next) {
                    chars.next();
                }
            }
            continue;
        }
        if is_delimiter(c) {
            pieces.push(&text[start..index]);
            start = index + c.len_utf8();
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn ends_with_terminator(line: &str) -> bool {
    let pieces = split_unescaped(line, |c| c == SEGMENT_TERMINATOR);
    pieces.len() > 1 && pieces.last().is_some_and(|last| last.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apostrophe_delimited() {
        let segments = tokenize("UNH+1+UTILMD:D:16B:UN:1.1'BGM+E02'UNT+3+1'").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].tag, "UNH");
        assert_eq!(segments[0].elements, vec!["1", "UTILMD", "D", "16B", "UN", "1.1"]);
        assert_eq!(segments[1].original, "BGM+E02");
    }

    #[test]
    fn test_line_delimited() {
        let text = "UNH+1+MSCONS:D:04B:UN:2.4c\r\nBGM+E01\n\nUNT+3+1\n";
        let segments = tokenize(text).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].tag, "BGM");
        assert_eq!(segments[2].elements, vec!["3", "1"]);
    }

    #[test]
    fn test_flat_elements_keep_empty_components() {
        let segments = tokenize("NAD+MS+9900000000001::293'").unwrap();
        assert_eq!(segments[0].elements, vec!["MS", "9900000000001", "", "293"]);
    }

    #[test]
    fn test_escaped_delimiters_are_literal() {
        let segments = tokenize("FTX+ACB+++Preis?: 12?+3 ?'netto?''UNT+2+1'").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].elements[3], "Preis: 12+3 'netto'");
        assert_eq!(segments[0].original, "FTX+ACB+++Preis?: 12?+3 ?'netto?'");
    }

    #[test]
    fn test_line_mode_with_apostrophe_in_free_text() {
        let text = "UNH+1+UTILMD:D:16B:UN:1.1\nNAD+MR+9900000000002::293+O'Brien Energie\nUNT+3+1";
        assert_eq!(delimiter_style(text), DelimiterStyle::LineBreak);

        let segments = tokenize(text).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].elements.last().unwrap(), "O'Brien Energie");
    }

    #[test]
    fn test_multiline_apostrophe_delimited() {
        let text = "UNH+1+UTILMD:D:16B:UN:1.1'\nBGM+E02'\nUNT+3+1'\n";
        assert_eq!(delimiter_style(text), DelimiterStyle::Apostrophe);
        assert_eq!(tokenize(text).unwrap().len(), 3);
    }

    #[test]
    fn test_una_service_string() {
        let text = "UNA:+.? 'UNB+UNOC:3+9900000000001:500'";
        let segments = tokenize(text).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].tag, "UNA");
        assert_eq!(segments[1].tag, "UNB");
    }

    #[test]
    fn test_descriptions_attached() {
        let segments = tokenize("dtm+137:20250904:102'XYZ+1'").unwrap();
        assert_eq!(segments[0].tag, "DTM");
        assert_eq!(segments[0].description, "Datum/Uhrzeit/Zeitspanne");
        assert_eq!(segments[1].description, "Unknown Segment");
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(tokenize(""), Err(ParseError::EmptyMessage));
        assert_eq!(tokenize("  \n\t\n"), Err(ParseError::EmptyMessage));
        assert_eq!(tokenize("'''"), Err(ParseError::EmptyMessage));
    }

    #[test]
    fn test_strip_release_chars() {
        assert_eq!(strip_release_chars("202509042200?+00"), "202509042200+00");
        assert_eq!(strip_release_chars("a??b"), "a?b");
        assert_eq!(strip_release_chars("was?"), "was?");
        assert_eq!(strip_release_chars("? x"), "? x");
    }

    proptest! {
        #[test]
        fn prop_tokenize_never_panics(text in "\\PC{0,200}") {
            let _ = tokenize(&text);
        }

        #[test]
        fn prop_tags_are_uppercase(text in "[a-zA-Z]{3}(\\+[a-z0-9:]{0,8}){0,4}('[a-zA-Z]{3}(\\+[a-z0-9]{0,6}){0,3}){0,5}'?") {
            for segment in tokenize(&text).unwrap() {
                prop_assert_eq!(segment.tag.clone(), segment.tag.to_uppercase());
                prop_assert!(!segment.tag.is_empty());
            }
        }
    }
}
