//! Raw-SQL placeholder parsing.
//!
//! Walks a user-supplied SQL template and splits it into verbatim
//! fragments, escaped `??` tokens and `?`/`?::type` placeholders, skipping
//! over dialect-defined escape-sequence regions so a `?` inside a string
//! literal or quoted identifier is never mistaken for a placeholder.

use regex::Regex;

use crate::escaper::Escaper;

/// A single token produced while scanning a raw SQL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken<'t> {
    /// Verbatim SQL text, including whole escape-sequence spans and bare
    /// `::type` casts
    Fragment(&'t str),
    /// A `??` token, emitted as the escaper's unescaped placeholder char
    EscapedPlaceholder,
    /// A real placeholder consuming the next positional argument
    Placeholder { cast: Option<&'t str> },
}

/// Regex-driven tokenizer compiled once per writer from the escaper's
/// escape-sequence list.
pub struct PlaceholderParser {
    pattern: Regex,
}

impl PlaceholderParser {
    /// Builds the tokenizer for a dialect escaper.
    ///
    /// Alternation order matters: escape-sequence spans first, then `??`,
    /// then `?` with its optional `::type` suffix, then bare `::type`
    /// casts. The pattern uses no backreferences.
    pub fn from_escaper(escaper: &dyn Escaper) -> Self {
        let spans = escaper
            .escape_sequences()
            .iter()
            .map(|(open, close)| span_pattern(open, close))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            "(?P<esc>{spans})|(?P<dd>\\?\\?)|(?P<ph>\\?)(?:::(?P<cast>[A-Za-z_][A-Za-z0-9_]*))?|::[A-Za-z_][A-Za-z0-9_]*"
        );
        Self {
            // The pattern is assembled from static delimiter pairs; it
            // always compiles.
            pattern: Regex::new(&pattern).expect("invalid placeholder pattern"),
        }
    }

    /// Splits the template into tokens, preserving every byte of verbatim
    /// text in order.
    pub fn tokenize<'t>(&self, template: &'t str) -> Vec<RawToken<'t>> {
        let mut tokens = Vec::new();
        let mut last = 0;

        for captures in self.pattern.captures_iter(template) {
            let matched = captures.get(0).expect("match always has a group 0");
            if matched.start() > last {
                tokens.push(RawToken::Fragment(&template[last..matched.start()]));
            }
            if captures.name("dd").is_some() {
                tokens.push(RawToken::EscapedPlaceholder);
            } else if captures.name("ph").is_some() {
                tokens.push(RawToken::Placeholder {
                    cast: captures.name("cast").map(|cast| cast.as_str()),
                });
            } else {
                // Escape-sequence span or bare ::type cast.
                tokens.push(RawToken::Fragment(matched.as_str()));
            }
            last = matched.end();
        }

        if last < template.len() {
            tokens.push(RawToken::Fragment(&template[last..]));
        }
        tokens
    }
}

/// Builds the regex alternative matching one delimiter pair.
///
/// Symmetric single-character delimiters handle quote doubling, so
/// `'it''s?'` stays one span; asymmetric or multi-character pairs use a
/// non-greedy skip.
fn span_pattern(open: &str, close: &str) -> String {
    if open == close && open.chars().count() == 1 {
        let quote = regex::escape(open);
        format!("{quote}(?:[^{quote}]|{quote}{quote})*{quote}")
    } else {
        format!("{}(?s:.)*?{}", regex::escape(open), regex::escape(close))
    }
}
