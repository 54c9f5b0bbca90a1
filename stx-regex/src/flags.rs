//! Translation options and the XPath flags string

use std::fmt;

use crate::error::{RegexError, Result};

/// Switches that control how a pattern is translated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Accept the XPath 2.0 extensions: anchors, back-references, reluctant
    /// quantifiers and the `\$` escape
    pub xpath: bool,
    /// Drop XML whitespace outside character classes
    pub ignore_whitespace: bool,
    /// Expand every literal character and range to its case variants
    pub case_blind: bool,
}

impl TranslateOptions {
    /// Schema mode with every switch off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set XPath mode
    pub fn xpath(mut self, yes: bool) -> Self {
        self.xpath = yes;
        self
    }

    /// Set whitespace stripping
    pub fn ignore_whitespace(mut self, yes: bool) -> Self {
        self.ignore_whitespace = yes;
        self
    }

    /// Set case-blind expansion
    pub fn case_blind(mut self, yes: bool) -> Self {
        self.case_blind = yes;
        self
    }
}

/// Parsed form of the `$flags` argument of `fn:matches` and friends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    /// `s`: `.` also matches newlines
    pub dot_all: bool,
    /// `m`: `^` and `$` match at line boundaries
    pub multi_line: bool,
    /// `i`: case-insensitive matching
    pub case_insensitive: bool,
    /// `x`: whitespace in the pattern is ignored
    pub ignore_whitespace: bool,
}

impl RegexFlags {
    /// Parse a flags string. Flags may appear in any order and repeat.
    pub fn parse(flags: &str) -> Result<Self> {
        let mut parsed = RegexFlags::default();
        for (position, flag) in flags.chars().enumerate() {
            match flag {
                's' => parsed.dot_all = true,
                'm' => parsed.multi_line = true,
                'i' => parsed.case_insensitive = true,
                'x' => parsed.ignore_whitespace = true,
                _ => return Err(RegexError::Flags { flag, position }),
            }
        }
        Ok(parsed)
    }

    /// The translation options these flags imply
    pub fn translate_options(&self, xpath: bool) -> TranslateOptions {
        TranslateOptions::new()
            .xpath(xpath)
            .ignore_whitespace(self.ignore_whitespace)
            .case_blind(self.case_insensitive)
    }
}

/// Writes the flags back in canonical `smix` order
impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = [
            (self.dot_all, 's'),
            (self.multi_line, 'm'),
            (self.case_insensitive, 'i'),
            (self.ignore_whitespace, 'x'),
        ];
        for (set, letter) in letters {
            if set {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}
