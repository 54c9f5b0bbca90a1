//! Lexical cursor over a regex source
//!
//! The cursor holds the whole pattern as a buffer of code units and an index
//! into it. For `&str` input each unit is a Unicode scalar value; for UTF-16
//! input each unit is a 16-bit code unit and surrogate pairs are combined on
//! demand by [`Cursor::absorb_surrogate_pair`].

use crate::error::{RegexSyntaxError, SyntaxErrorKind};

/// Current unit once the input is exhausted; above every code point
const EOS: u32 = u32::MAX;

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

/// XML whitespace: space, tab, carriage return, line feed
pub fn is_xml_whitespace(unit: u32) -> bool {
    matches!(unit, 0x20 | 0x09 | 0x0D | 0x0A)
}

/// Character-by-character scanner with one-step pushback
#[derive(Debug, Clone)]
pub struct Cursor {
    units: Vec<u32>,
    /// Index of the unit after the current one
    pos: usize,
    current: u32,
    eos: bool,
    ignore_whitespace: bool,
    in_char_class: bool,
}

impl Cursor {
    /// Create a cursor over scalar values taken from a string
    pub fn new(source: &str, ignore_whitespace: bool) -> Self {
        Self::from_units(source.chars().map(u32::from).collect(), ignore_whitespace)
    }

    /// Create a cursor over UTF-16 code units
    pub fn from_utf16(source: &[u16], ignore_whitespace: bool) -> Self {
        Self::from_units(source.iter().copied().map(u32::from).collect(), ignore_whitespace)
    }

    fn from_units(units: Vec<u32>, ignore_whitespace: bool) -> Self {
        Cursor {
            units,
            pos: 0,
            current: EOS,
            eos: false,
            ignore_whitespace,
            in_char_class: false,
        }
    }

    /// Move to the next character, skipping whitespace when that mode is on
    /// and the cursor is outside a character class
    pub fn advance(&mut self) {
        loop {
            if self.pos < self.units.len() {
                self.current = self.units[self.pos];
                self.pos += 1;
            } else {
                self.pos = self.units.len() + 1;
                self.current = EOS;
                self.eos = true;
                return;
            }
            if !self.skips_whitespace() || !is_xml_whitespace(self.current) {
                return;
            }
        }
    }

    /// Step back one logical character.
    ///
    /// Whitespace is skipped backwards under the same rules as [`advance`].
    /// Must not be called while positioned on the first character.
    ///
    /// [`advance`]: Cursor::advance
    pub fn recede(&mut self) {
        loop {
            debug_assert!(self.pos >= 2, "recede past the start of the pattern");
            self.pos -= 1;
            self.current = self.units[self.pos - 1];
            self.eos = false;
            if !self.skips_whitespace() || !is_xml_whitespace(self.current) {
                return;
            }
        }
    }

    fn skips_whitespace(&self) -> bool {
        self.ignore_whitespace && !self.in_char_class
    }

    /// The current unit as a `char`, or `None` at end of input or on a
    /// surrogate code unit
    pub fn current_char(&self) -> Option<char> {
        if self.eos {
            None
        } else {
            char::from_u32(self.current)
        }
    }

    /// The raw unit following the current one, without whitespace skipping
    pub fn lookahead(&self) -> Option<char> {
        self.units.get(self.pos).copied().and_then(char::from_u32)
    }

    /// Whether the input is exhausted
    pub fn is_eos(&self) -> bool {
        self.eos
    }

    /// Offset of the current character in the source
    pub fn offset(&self) -> usize {
        self.pos.saturating_sub(1)
    }

    /// Mark whether the cursor is inside a `[...]` expression
    pub fn set_in_char_class(&mut self, in_char_class: bool) {
        self.in_char_class = in_char_class;
    }

    /// Whether the cursor is inside a `[...]` expression
    pub fn in_char_class(&self) -> bool {
        self.in_char_class
    }

    /// Fail unless the current character is `expected`. Does not advance.
    pub fn expect(&self, expected: char) -> Result<(), RegexSyntaxError> {
        if self.current_char() == Some(expected) {
            return Ok(());
        }
        if self.eos {
            return Err(self.error(SyntaxErrorKind::UnexpectedEnd(expected)));
        }
        let found = char::from_u32(self.current).unwrap_or(char::REPLACEMENT_CHARACTER);
        Err(self.error(SyntaxErrorKind::Expected { expected, found }))
    }

    /// Return the current character as a scalar value, combining a UTF-16
    /// surrogate pair when positioned on a high surrogate.
    ///
    /// On a pair the cursor is left on the low surrogate, so the caller's
    /// following `advance` moves past the whole character.
    pub fn absorb_surrogate_pair(&mut self) -> Result<char, RegexSyntaxError> {
        if self.eos {
            return Err(self.error(SyntaxErrorKind::EndOfPattern));
        }
        let high = self.current;
        if LOW_SURROGATES.contains(&high) {
            return Err(self.error(SyntaxErrorKind::InvalidSurrogatePair));
        }
        if !HIGH_SURROGATES.contains(&high) {
            return char::from_u32(high)
                .ok_or_else(|| self.error(SyntaxErrorKind::InvalidSurrogatePair));
        }
        let low = match self.units.get(self.pos) {
            Some(&low) if LOW_SURROGATES.contains(&low) => low,
            _ => return Err(self.error(SyntaxErrorKind::InvalidSurrogatePair)),
        };
        self.pos += 1;
        self.current = low;
        let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(scalar).ok_or_else(|| self.error(SyntaxErrorKind::InvalidSurrogatePair))
    }

    /// Build an error located at the current character
    pub fn error(&self, kind: SyntaxErrorKind) -> RegexSyntaxError {
        RegexSyntaxError::new(kind, self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primed(source: &str, ignore_whitespace: bool) -> Cursor {
        let mut cursor = Cursor::new(source, ignore_whitespace);
        cursor.advance();
        cursor
    }

    #[test]
    fn test_advance_reads_in_order() {
        let mut cursor = primed("ab", false);
        assert_eq!(cursor.current_char(), Some('a'));
        cursor.advance();
        assert_eq!(cursor.current_char(), Some('b'));
        cursor.advance();
        assert!(cursor.is_eos());
        assert_eq!(cursor.current_char(), None);
    }

    #[test]
    fn test_empty_input_is_eos_after_priming() {
        let cursor = primed("", false);
        assert!(cursor.is_eos());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_whitespace_skipped_outside_class() {
        let mut cursor = primed(" a \t\r\n b ", true);
        assert_eq!(cursor.current_char(), Some('a'));
        cursor.advance();
        assert_eq!(cursor.current_char(), Some('b'));
        cursor.advance();
        assert!(cursor.is_eos());
    }

    #[test]
    fn test_whitespace_kept_inside_class() {
        let mut cursor = primed("[ a", true);
        cursor.set_in_char_class(true);
        cursor.advance();
        assert_eq!(cursor.current_char(), Some(' '));
    }

    #[test]
    fn test_recede_steps_back_one_character() {
        let mut cursor = primed("123", false);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.current_char(), Some('3'));
        cursor.recede();
        assert_eq!(cursor.current_char(), Some('2'));
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_recede_from_eos() {
        let mut cursor = primed("xy", false);
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_eos());
        cursor.recede();
        assert!(!cursor.is_eos());
        assert_eq!(cursor.current_char(), Some('y'));
    }

    #[test]
    fn test_recede_skips_whitespace_backwards() {
        let mut cursor = primed("1 2  x", true);
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.current_char(), Some('x'));
        cursor.recede();
        assert_eq!(cursor.current_char(), Some('2'));
    }

    #[test]
    fn test_expect() {
        let cursor = primed("}", false);
        assert!(cursor.expect('}').is_ok());
        let err = cursor.expect(']').unwrap_err();
        assert_eq!(
            err.kind,
            SyntaxErrorKind::Expected {
                expected: ']',
                found: '}'
            }
        );
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn test_expect_at_end() {
        let cursor = primed("", false);
        let err = cursor.expect(')').unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedEnd(')'));
    }

    #[test]
    fn test_lookahead_is_raw() {
        let cursor = primed("- ]", true);
        assert_eq!(cursor.current_char(), Some('-'));
        assert_eq!(cursor.lookahead(), Some(' '));
    }

    #[test]
    fn test_absorb_at_end() {
        let mut cursor = primed("", false);
        let err = cursor.absorb_surrogate_pair().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::EndOfPattern);
        assert_eq!(err.to_string(), "unexpected end of regular expression at position 0");
    }

    #[test]
    fn test_absorb_plain_character() {
        let mut cursor = primed("é", false);
        assert_eq!(cursor.absorb_surrogate_pair().unwrap(), 'é');
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_absorb_surrogate_pair() {
        let units: Vec<u16> = "\u{1D11E}x".encode_utf16().collect();
        let mut cursor = Cursor::from_utf16(&units, false);
        cursor.advance();
        assert_eq!(cursor.absorb_surrogate_pair().unwrap(), '\u{1D11E}');
        cursor.advance();
        assert_eq!(cursor.current_char(), Some('x'));
    }

    #[test]
    fn test_absorb_lone_high_surrogate() {
        let mut cursor = Cursor::from_utf16(&[0xD834, 0x0061], false);
        cursor.advance();
        let err = cursor.absorb_surrogate_pair().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidSurrogatePair);
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn test_absorb_lone_low_surrogate() {
        let mut cursor = Cursor::from_utf16(&[0x0061, 0xDD1E], false);
        cursor.advance();
        cursor.advance();
        let err = cursor.absorb_surrogate_pair().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidSurrogatePair);
        assert_eq!(err.position, Some(1));
    }
}
