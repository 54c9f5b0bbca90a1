//! Replacement strings for `fn:replace`
//!
//! `$N` inserts capture group `N` (`$0` is the whole match) and `\$`, `\\`
//! insert a literal dollar and backslash. The first digit after `$` is always
//! part of the reference; further digits are taken only while the number
//! still names an existing group, so with two groups `$12` is group 1
//! followed by a literal `2`.

use std::ops::Range;

use thiserror::Error;

/// A part of a replacement string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementPart {
    /// Literal text
    Literal(String),
    /// Capture group reference; `0` is the entire match
    Group(usize),
}

/// A parsed replacement string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    parts: Vec<ReplacementPart>,
}

impl Replacement {
    /// Parse a replacement string for a pattern with `group_count` groups
    pub fn parse(input: &str, group_count: usize) -> Result<Self, ReplacementError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = input.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped @ ('\\' | '$'))) => literal.push(escaped),
                    Some((_, other)) => {
                        return Err(ReplacementError::InvalidEscape {
                            escaped: other,
                            position,
                        });
                    }
                    None => return Err(ReplacementError::TrailingBackslash),
                },
                '$' => {
                    let mut number = match chars.peek().and_then(|&(_, d)| d.to_digit(10)) {
                        Some(digit) => digit as usize,
                        None => return Err(ReplacementError::MissingGroupNumber { position }),
                    };
                    chars.next();
                    while let Some(digit) = chars.peek().and_then(|&(_, d)| d.to_digit(10)) {
                        let extended = number * 10 + digit as usize;
                        if extended > group_count {
                            break;
                        }
                        number = extended;
                        chars.next();
                    }
                    if !literal.is_empty() {
                        parts.push(ReplacementPart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(ReplacementPart::Group(number));
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            parts.push(ReplacementPart::Literal(literal));
        }

        Ok(Replacement { parts })
    }

    /// Render the replacement for one match.
    ///
    /// `groups[0]` is the span of the whole match and `groups[n]` the span of
    /// group `n`, `None` when the group did not participate. Missing and
    /// non-participating groups insert nothing.
    pub fn apply(&self, input: &str, groups: &[Option<Range<usize>>]) -> String {
        let mut result = String::new();
        for part in &self.parts {
            match part {
                ReplacementPart::Literal(text) => result.push_str(text),
                ReplacementPart::Group(n) => {
                    if let Some(Some(span)) = groups.get(*n) {
                        result.push_str(&input[span.clone()]);
                    }
                }
            }
        }
        result
    }

    /// Get the parts of the replacement
    pub fn parts(&self) -> &[ReplacementPart] {
        &self.parts
    }
}

/// Errors in a replacement string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplacementError {
    /// `\` followed by something other than `\` or `$`
    #[error("invalid escape '\\{escaped}' at position {position}")]
    InvalidEscape {
        /// The character after the backslash
        escaped: char,
        /// Byte offset of the backslash
        position: usize,
    },

    /// `\` as the last character
    #[error("replacement string ends with a backslash")]
    TrailingBackslash,

    /// `$` not followed by a digit
    #[error("'$' at position {position} must be followed by a group number")]
    MissingGroupNumber {
        /// Byte offset of the dollar sign
        position: usize,
    },
}
