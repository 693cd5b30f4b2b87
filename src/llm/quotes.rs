//! Quoted-dialogue extraction from streaming reply text
//!
//! The assistant is prompted to wrap spoken dialogue in quotation marks. As
//! the reply streams in, the extractor is re-run over the whole accumulated
//! buffer; a quote is only returned once its closing delimiter has arrived,
//! so repeated scans of a growing string never contradict earlier results.

use regex::Regex;
use std::collections::HashSet;
use tracing::error;

/// Delimiter pairs recognized as spoken dialogue
const QUOTE_PAIRS: &[(char, char)] = &[
    ('"', '"'),
    ('“', '”'),
    ('「', '」'),
    ('『', '』'),
    ('《', '》'),
    ('〈', '〉'),
];

/// Extracts completed quotes from accumulated reply text
#[derive(Clone, Debug)]
pub struct QuoteExtractor {
    patterns: Vec<Regex>,
}

impl QuoteExtractor {
    /// Create an extractor with one pattern per delimiter style
    pub fn new() -> Self {
        let patterns = QUOTE_PAIRS
            .iter()
            .filter_map(|&(open, close)| {
                // Shortest span between a pair: the inner class excludes the
                // closing delimiter, so an unterminated quote matches nothing
                // and same-style quotes pair up left to right, not nested.
                let pattern = format!(
                    "{}([^{}]+){}",
                    regex::escape(&open.to_string()),
                    regex::escape(&close.to_string()),
                    regex::escape(&close.to_string()),
                );
                match Regex::new(&pattern) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        error!("Failed to compile quote pattern {}: {}", pattern, e);
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// Scan the full text and return every completed quote, trimmed,
    /// deduplicated, in first-seen order.
    ///
    /// Each delimiter style is scanned independently and the results merged
    /// in pattern order, so quotes of different styles are grouped by style
    /// rather than strict document position.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut quotes = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                let inner = caps[1].trim();
                if inner.is_empty() {
                    continue;
                }
                if seen.insert(inner.to_string()) {
                    quotes.push(inner.to_string());
                }
            }
        }

        quotes
    }
}

impl Default for QuoteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks which quotes have already been dispatched as a reply grows
///
/// One tracker instance covers one conversation turn: feed it each streamed
/// chunk and it returns only the quotes not yet handed to the playback
/// queue, in the order the extractor discovered them.
#[derive(Clone, Debug)]
pub struct QuoteTracker {
    extractor: QuoteExtractor,
    buffer: String,
    dispatched: HashSet<String>,
}

impl QuoteTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            extractor: QuoteExtractor::new(),
            buffer: String::new(),
            dispatched: HashSet::new(),
        }
    }

    /// Append a streamed chunk and return the newly completed quotes
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        self.extractor
            .extract(&self.buffer)
            .into_iter()
            .filter(|quote| self.dispatched.insert(quote.clone()))
            .collect()
    }

    /// Reset for the next conversation turn
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.dispatched.clear();
    }

    /// The accumulated reply text so far
    pub fn text(&self) -> &str {
        &self.buffer
    }
}

impl Default for QuoteTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<String> {
        QuoteExtractor::new().extract(text)
    }

    #[test]
    fn test_quotes_in_document_order() {
        let quotes = extract(r#"He said "hello there" and then "bye""#);
        assert_eq!(quotes, vec!["hello there", "bye"]);
    }

    #[test]
    fn test_inner_whitespace_trimmed() {
        let quotes = extract(r#"She whispered "  take care  " softly"#);
        assert_eq!(quotes, vec!["take care"]);
    }

    #[test]
    fn test_empty_quotes_skipped() {
        assert!(extract(r#"nothing here: "" and "   ""#).is_empty());
    }

    #[test]
    fn test_unfinished_quote_yields_nothing() {
        assert!(extract(r#"before "unfinished"#).is_empty());
    }

    #[test]
    fn test_curly_and_corner_styles() {
        let quotes = extract("“你好呀”微笑着说「再见」");
        assert_eq!(quotes, vec!["你好呀", "再见"]);
    }

    #[test]
    fn test_styles_merge_in_pattern_order() {
        // Straight quotes are scanned before curly ones, so the merge is
        // grouped by style rather than document position.
        let quotes = extract(r#"“first in text” then "second in text""#);
        assert_eq!(quotes, vec!["second in text", "first in text"]);
    }

    #[test]
    fn test_duplicates_collapsed() {
        let quotes = extract(r#""hi" and again "hi""#);
        assert_eq!(quotes, vec!["hi"]);
    }

    #[test]
    fn test_same_style_pairs_left_to_right() {
        // Pairing is not nested-aware: the four straight quotes pair up as
        // two spans, dropping the middle word.
        let quotes = extract(r#""a "b" c""#);
        assert_eq!(quotes, vec!["a", "c"]);
    }

    #[test]
    fn test_prefix_monotonicity() {
        let prefix = r#"He said "one" and "two""#;
        let grown = r#"He said "one" and "two" then "three""#;

        let before = extract(prefix);
        let after = extract(grown);

        assert_eq!(after[..before.len()], before[..]);
        assert_eq!(after.last().map(String::as_str), Some("three"));
    }

    #[test]
    fn test_tracker_dispatches_each_quote_once() {
        let mut tracker = QuoteTracker::new();

        assert!(tracker.push(r#"He said "hel"#).is_empty());
        assert_eq!(tracker.push(r#"lo" and waved"#), vec!["hello"]);
        // Re-scanning the grown buffer must not re-dispatch "hello"
        assert_eq!(tracker.push(r#" then "bye""#), vec!["bye"]);
        assert_eq!(tracker.text(), r#"He said "hello" and waved then "bye""#);
    }

    #[test]
    fn test_tracker_reset_starts_fresh_turn() {
        let mut tracker = QuoteTracker::new();
        assert_eq!(tracker.push(r#""hi""#), vec!["hi"]);

        tracker.reset();

        assert!(tracker.text().is_empty());
        assert_eq!(tracker.push(r#""hi""#), vec!["hi"]);
    }
}
