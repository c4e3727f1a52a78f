//! Tokenization and symbol interning
//!
//! Splits raw text into atomic comparison units (lines or words) and interns
//! each unique token to a `u32` symbol so the diff core can compare whole
//! tokens with a single integer equality check. Interning is purely a
//! performance technique; results are identical to diffing the token
//! sequences directly.
//!
//! Line tokens keep their trailing terminator, and word mode alternates runs
//! of non-whitespace and whitespace, so concatenating the tokens of either
//! side always reproduces that side's input byte for byte. A document
//! without a trailing terminator simply ends in a terminator-less token.

use crate::types::Granularity;
use std::collections::HashMap;

/// Both documents encoded as symbol sequences over a shared token table.
pub(crate) struct Interned<'a> {
    /// Old document as symbols
    pub old: Vec<u32>,
    /// New document as symbols
    pub new: Vec<u32>,
    /// Symbol index back to token text
    pub table: Vec<&'a str>,
}

/// Tokenize both documents at the given granularity and intern the tokens
/// into one shared symbol table.
pub(crate) fn intern<'a>(old: &'a str, new: &'a str, granularity: Granularity) -> Interned<'a> {
    let mut table = Vec::new();
    let mut index: HashMap<&'a str, u32> = HashMap::new();
    let old = encode(old, granularity, &mut table, &mut index);
    let new = encode(new, granularity, &mut table, &mut index);
    Interned { old, new, table }
}

fn encode<'a>(
    text: &'a str,
    granularity: Granularity,
    table: &mut Vec<&'a str>,
    index: &mut HashMap<&'a str, u32>,
) -> Vec<u32> {
    let tokens = match granularity {
        Granularity::Line => line_tokens(text),
        Granularity::Word => word_tokens(text),
    };
    tokens
        .into_iter()
        .map(|token| {
            *index.entry(token).or_insert_with(|| {
                table.push(token);
                (table.len() - 1) as u32
            })
        })
        .collect()
}

/// One token per line, terminator included. An empty document has no tokens.
fn line_tokens(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Alternating runs of non-whitespace and whitespace characters.
fn word_tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_whitespace = None;
    for (i, c) in text.char_indices() {
        let w = c.is_whitespace();
        match in_whitespace {
            Some(prev) if prev == w => {}
            Some(_) => {
                out.push(&text[start..i]);
                start = i;
                in_whitespace = Some(w);
            }
            None => in_whitespace = Some(w),
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_tokens_keep_terminators() {
        assert_eq!(line_tokens("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(line_tokens("a\nb"), vec!["a\n", "b"]);
        assert!(line_tokens("").is_empty());
    }

    #[test]
    fn test_word_tokens_lossless() {
        let text = "foo  bar\nbaz";
        let tokens = word_tokens(text);
        assert_eq!(tokens, vec!["foo", "  ", "bar", "\n", "baz"]);
        assert_eq!(tokens.concat(), text);
    }

    #[test]
    fn test_word_tokens_leading_whitespace() {
        assert_eq!(word_tokens("  x"), vec!["  ", "x"]);
        assert_eq!(word_tokens(" "), vec![" "]);
        assert!(word_tokens("").is_empty());
    }

    #[test]
    fn test_intern_shares_symbols_across_sides() {
        let interned = intern("a\nb\n", "a\nc\n", Granularity::Line);
        assert_eq!(interned.old.len(), 2);
        assert_eq!(interned.new.len(), 2);
        // "a\n" appears on both sides and must map to the same symbol
        assert_eq!(interned.old[0], interned.new[0]);
        assert_ne!(interned.old[1], interned.new[1]);
        assert_eq!(interned.table.len(), 3);
    }

    #[test]
    fn test_intern_empty_side() {
        let interned = intern("", "x\ny\n", Granularity::Line);
        assert!(interned.old.is_empty());
        assert_eq!(interned.new.len(), 2);
    }

    #[test]
    fn test_symbols_decode_back_to_tokens() {
        let interned = intern("one two", "one three", Granularity::Word);
        let decoded: String = interned
            .old
            .iter()
            .map(|&s| interned.table[s as usize])
            .collect();
        assert_eq!(decoded, "one two");
    }
}
