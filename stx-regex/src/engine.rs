//! Compiled regular expressions
//!
//! A [`Regex`] is a schema/XPath pattern translated once and compiled by
//! `fancy-regex`, which adds the back-references the `regex` crate lacks.
//! The XPath string functions `matches`, `replace` and `tokenize` map onto
//! [`Regex::is_match`], [`Regex::replace_all`] and [`Regex::tokenize`].

use std::ops::Range;

use log::debug;

use crate::error::{RegexError, Result};
use crate::flags::RegexFlags;
use crate::replace::Replacement;
use crate::translator::translate;

/// A match result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The start position of the match
    pub start: usize,
    /// The end position of the match (exclusive)
    pub end: usize,
    /// Span of every group; index 0 is the whole match, `None` marks a group
    /// that did not participate
    pub groups: Vec<Option<Range<usize>>>,
}

impl Match {
    fn from_captures(captures: &fancy_regex::Captures<'_>) -> Self {
        let groups: Vec<_> = (0..captures.len())
            .map(|i| captures.get(i).map(|m| m.range()))
            .collect();
        let whole = groups.first().cloned().flatten().unwrap_or(0..0);
        Match {
            start: whole.start,
            end: whole.end,
            groups,
        }
    }

    /// Get the matched text
    pub fn as_str<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }

    /// Get the span of capture group `n` (1-based)
    pub fn group(&self, n: usize) -> Option<Range<usize>> {
        self.groups.get(n).cloned().flatten()
    }

    /// Get the text of capture group `n`
    pub fn group_str<'a>(&self, input: &'a str, n: usize) -> Option<&'a str> {
        self.group(n).map(|span| &input[span])
    }
}

/// A compiled schema or XPath regular expression
#[derive(Debug, Clone)]
pub struct Regex {
    source: String,
    flags: RegexFlags,
    backend: fancy_regex::Regex,
}

impl Regex {
    /// Compile an XPath pattern with no flags
    pub fn new(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern).build()
    }

    /// Compile an XPath pattern with a flags string such as `"ix"`
    pub fn with_flags(pattern: &str, flags: &str) -> Result<Self> {
        RegexBuilder::new(pattern).flags(flags)?.build()
    }

    /// The translated pattern handed to the engine
    pub fn as_str(&self) -> &str {
        self.backend.as_str()
    }

    /// The pattern as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The flags the pattern was compiled with
    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    /// Number of capture groups, counting the whole match as group 0
    pub fn captures_len(&self) -> usize {
        self.backend.captures_len()
    }

    fn group_count(&self) -> usize {
        self.captures_len().saturating_sub(1)
    }

    /// Check if the pattern matches anywhere in the input
    pub fn is_match(&self, input: &str) -> Result<bool> {
        self.backend.is_match(input).map_err(runtime_error)
    }

    /// Find the first match in the input
    pub fn find(&self, input: &str) -> Result<Option<Match>> {
        let captures = self.backend.captures(input).map_err(runtime_error)?;
        Ok(captures.as_ref().map(Match::from_captures))
    }

    /// Find all non-overlapping matches
    pub fn find_all(&self, input: &str) -> Result<Vec<Match>> {
        let mut matches = Vec::new();
        for captures in self.backend.captures_iter(input) {
            let captures = captures.map_err(runtime_error)?;
            matches.push(Match::from_captures(&captures));
        }
        Ok(matches)
    }

    /// Replace every match using an XPath replacement string (`$1`, `\$`)
    pub fn replace_all(&self, input: &str, replacement: &str) -> Result<String> {
        self.reject_empty_match()?;
        let replacement = Replacement::parse(replacement, self.group_count())?;

        let mut result = String::with_capacity(input.len());
        let mut last = 0;
        for m in self.find_all(input)? {
            result.push_str(&input[last..m.start]);
            result.push_str(&replacement.apply(input, &m.groups));
            last = m.end;
        }
        result.push_str(&input[last..]);
        Ok(result)
    }

    /// Split the input at every match. An empty input has no tokens.
    pub fn tokenize(&self, input: &str) -> Result<Vec<String>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        self.reject_empty_match()?;

        let mut tokens = Vec::new();
        let mut last = 0;
        for m in self.find_all(input)? {
            tokens.push(input[last..m.start].to_string());
            last = m.end;
        }
        tokens.push(input[last..].to_string());
        Ok(tokens)
    }

    fn reject_empty_match(&self) -> Result<()> {
        if self.is_match("")? {
            return Err(RegexError::Runtime(format!(
                "pattern '{}' matches a zero-length string",
                self.source
            )));
        }
        Ok(())
    }
}

/// Builder for [`Regex`]
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    xpath: bool,
    flags: RegexFlags,
}

impl RegexBuilder {
    /// Start building an XPath pattern with no flags
    pub fn new(pattern: &str) -> Self {
        RegexBuilder {
            pattern: pattern.to_string(),
            xpath: true,
            flags: RegexFlags::default(),
        }
    }

    /// Accept the XPath extensions (the default) or only schema syntax
    pub fn xpath(&mut self, yes: bool) -> &mut Self {
        self.xpath = yes;
        self
    }

    /// Parse and apply a flags string
    pub fn flags(&mut self, flags: &str) -> Result<&mut Self> {
        self.flags = RegexFlags::parse(flags)?;
        Ok(self)
    }

    /// Translate and compile the pattern
    pub fn build(&self) -> Result<Regex> {
        let options = self.flags.translate_options(self.xpath);
        let translated = translate(&self.pattern, options)?;

        let mut builder = fancy_regex::RegexBuilder::new(&translated);
        builder.multi_line(self.flags.multi_line);
        builder.dot_matches_new_line(self.flags.dot_all);
        let backend = builder
            .build()
            .map_err(|e| RegexError::Compile(e.to_string()))?;
        debug!("compiled {:?} as {:?}", self.pattern, translated);

        Ok(Regex {
            source: self.pattern.clone(),
            flags: self.flags,
            backend,
        })
    }
}

fn runtime_error(error: fancy_regex::Error) -> RegexError {
    RegexError::Runtime(error.to_string())
}
