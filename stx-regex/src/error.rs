//! Error types for regex translation and matching
//!
//! Translation failures are reported as [`RegexSyntaxError`], which pairs a
//! [`SyntaxErrorKind`] with the offset in the source pattern. Everything the
//! crate can fail with is gathered under [`RegexError`].

use thiserror::Error;

use crate::replace::ReplacementError;

/// The main error type for the crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegexError {
    /// The pattern is not a valid schema/XPath regular expression
    #[error("syntax error: {0}")]
    Syntax(#[from] RegexSyntaxError),

    /// The flags argument contains an unknown flag character
    #[error("invalid character '{flag}' in regex flags at position {position}")]
    Flags {
        /// The offending character
        flag: char,
        /// Index of the character in the flags string
        position: usize,
    },

    /// The replacement string of a replace operation is malformed
    #[error("replacement error: {0}")]
    Replacement(#[from] ReplacementError),

    /// The translated pattern was rejected by the matching engine
    #[error("compilation error: {0}")]
    Compile(String),

    /// The matching engine failed while searching
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Specific kinds of syntax errors raised while translating
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// The pattern ended where more input was required
    #[error("unexpected end of regular expression, expected '{0}'")]
    UnexpectedEnd(char),

    /// The pattern ended where a character was required
    #[error("unexpected end of regular expression")]
    EndOfPattern,

    /// A mandatory character was not found
    #[error("expected '{expected}', found '{found}'")]
    Expected {
        /// The character the grammar requires here
        expected: char,
        /// The character actually present
        found: char,
    },

    /// Input remains after the top-level expression
    #[error("expected end of string")]
    TrailingInput,

    /// A quantity contains something other than decimal digits
    #[error("expected digit in quantifier")]
    ExpectedDigit,

    /// `{n,m}` with `m < n`
    #[error("invalid quantifier range: upper bound is less than lower bound")]
    InvalidQuantityRange,

    /// `\p{}` with nothing between the braces
    #[error("empty property name")]
    EmptyPropertyName,

    /// Unknown one- or two-letter general category
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// `\p{IsXxx}` naming a block that is not in the block table
    #[error("unknown block name '{0}'")]
    UnknownBlock(String),

    /// Property name that is neither a category nor `Is` + block
    #[error("invalid property name '{0}'")]
    InvalidPropertyName(String),

    /// Lone high or low surrogate
    #[error("invalid surrogate pair")]
    InvalidSurrogatePair,

    /// Range endpoint that is a multi-character escape
    #[error("range endpoints must be single characters")]
    MultiCharRange,

    /// Range whose start is above its end
    #[error("invalid character range '{start}-{end}'")]
    InvalidRange {
        /// First endpoint
        start: char,
        /// Second endpoint
        end: char,
    },

    /// Digit escape outside XPath mode or inside a character class
    #[error("back-reference not allowed here")]
    BackReferenceNotAllowed,

    /// Backslash at the very end of the pattern
    #[error("incomplete escape sequence at end of pattern")]
    IncompleteEscape,

    /// Escape sequence that the grammar does not define
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    /// `[` or `]` used unescaped inside a character class
    #[error("character '{0}' must be escaped in a character class")]
    MustBeEscaped(char),

    /// Groups or class subtractions nested past the recursion limit
    #[error("nesting exceeds the limit of {0} levels")]
    NestingTooDeep(usize),
}

/// A translation error with its source location
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}", at_position(.position))]
pub struct RegexSyntaxError {
    /// What went wrong
    pub kind: SyntaxErrorKind,
    /// Offset of the failing character in the source, if known
    pub position: Option<usize>,
}

fn at_position(position: &Option<usize>) -> String {
    match position {
        Some(pos) => format!(" at position {}", pos),
        None => String::new(),
    }
}

impl RegexSyntaxError {
    /// Create an error located at `position`
    pub fn new(kind: SyntaxErrorKind, position: usize) -> Self {
        RegexSyntaxError {
            kind,
            position: Some(position),
        }
    }
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, RegexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = RegexSyntaxError::new(SyntaxErrorKind::InvalidEscape('q'), 3);
        assert_eq!(err.to_string(), "invalid escape sequence '\\q' at position 3");
    }

    #[test]
    fn test_unlocated_error_display() {
        let err = RegexSyntaxError {
            kind: SyntaxErrorKind::TrailingInput,
            position: None,
        };
        assert_eq!(err.to_string(), "expected end of string");
    }

    #[test]
    fn test_expected_display() {
        let kind = SyntaxErrorKind::Expected {
            expected: '}',
            found: 'x',
        };
        assert_eq!(kind.to_string(), "expected '}', found 'x'");
    }

    #[test]
    fn test_regex_error_from_syntax_error() {
        let err: RegexError = RegexSyntaxError::new(SyntaxErrorKind::ExpectedDigit, 2).into();
        assert_eq!(
            err.to_string(),
            "syntax error: expected digit in quantifier at position 2"
        );
    }

    #[test]
    fn test_flags_error_display() {
        let err = RegexError::Flags {
            flag: 'q',
            position: 1,
        };
        assert_eq!(
            err.to_string(),
            "invalid character 'q' in regex flags at position 1"
        );
    }
}
