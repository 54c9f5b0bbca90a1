//! Translator from schema/XPath regular expressions to Rust regex syntax
//!
//! A recursive descent parser that writes the translated pattern while it
//! reads the source. Only character classes are first built as a
//! [`CharClass`] tree, then rendered in one go.
//!
//! Grammar:
//!   regexp     := branch ( '|' branch )*
//!   branch     := ( atom quantifier? )*
//!   atom       := '(' regexp ')' | '\' escape | '[' class_expr ']' | '.' | char
//!   quantifier := ( '*' | '?' | '+' | '{' quantity '}' ) '?'?
//!   quantity   := digits ( ',' digits? )?
//!   class_expr := '^'? member ( '-' member | member )* ( '-' '[' class_expr ']' )?
//!
//! The trailing `?` of a quantifier, the anchors `^`/`$`, digit escapes and
//! `\$` are only recognized in XPath mode.

use log::{debug, trace};
use num_bigint::BigUint;

use crate::blocks::block_class;
use crate::captures::CaptureSet;
use crate::class::{CharClass, push_escaped};
use crate::cursor::Cursor;
use crate::error::{RegexSyntaxError, SyntaxErrorKind};
use crate::flags::TranslateOptions;
use crate::unicode::{
    ROMAN_VARIANTS, case_variants, category_class, escape_class, range_case_variants,
    schema_dot, sub_category_class,
};

/// Deepest nesting of groups and class subtractions accepted
pub const NESTING_LIMIT: usize = 250;

type SyntaxResult<T> = std::result::Result<T, RegexSyntaxError>;

/// State of one translation
#[derive(Debug)]
pub struct Translator {
    cursor: Cursor,
    options: TranslateOptions,
    captures: CaptureSet,
    depth: usize,
    out: String,
}

impl Translator {
    /// Create a translator for a pattern given as a string
    pub fn new(source: &str, options: TranslateOptions) -> Self {
        Self::with_cursor(Cursor::new(source, options.ignore_whitespace), options)
    }

    /// Create a translator for a pattern given as UTF-16 code units
    pub fn from_utf16(source: &[u16], options: TranslateOptions) -> Self {
        Self::with_cursor(Cursor::from_utf16(source, options.ignore_whitespace), options)
    }

    fn with_cursor(cursor: Cursor, options: TranslateOptions) -> Self {
        Translator {
            cursor,
            options,
            captures: CaptureSet::new(),
            depth: 0,
            out: String::new(),
        }
    }

    /// Translate the whole pattern. Fails if anything follows the top-level
    /// expression.
    pub fn run(&mut self) -> SyntaxResult<()> {
        self.cursor.advance();
        self.translate_regexp()?;
        if !self.cursor.is_eos() {
            return Err(self.cursor.error(SyntaxErrorKind::TrailingInput));
        }
        Ok(())
    }

    /// The translated text produced so far
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Number of capturing groups seen so far
    pub fn group_count(&self) -> u32 {
        self.captures.group_count()
    }

    /// Consume the translator, returning the translated text
    pub fn into_output(self) -> String {
        self.out
    }

    fn current_is(&self, c: char) -> bool {
        self.cursor.current_char() == Some(c)
    }

    /// Append the current character unchanged and move past it
    fn copy_current(&mut self) {
        if let Some(c) = self.cursor.current_char() {
            self.out.push(c);
        }
        self.cursor.advance();
    }

    fn enter_nesting(&mut self) -> SyntaxResult<()> {
        if self.depth >= NESTING_LIMIT {
            return Err(self
                .cursor
                .error(SyntaxErrorKind::NestingTooDeep(NESTING_LIMIT)));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave_nesting(&mut self) {
        self.depth -= 1;
    }

    fn translate_regexp(&mut self) -> SyntaxResult<()> {
        self.translate_branch()?;
        while self.current_is('|') {
            self.copy_current();
            self.translate_branch()?;
        }
        Ok(())
    }

    fn translate_branch(&mut self) -> SyntaxResult<()> {
        while self.translate_atom()? {
            self.translate_quantifier()?;
        }
        Ok(())
    }

    /// Translate one atom. Returns `false` without consuming anything when
    /// the current character cannot start an atom.
    fn translate_atom(&mut self) -> SyntaxResult<bool> {
        if self.cursor.is_eos() {
            return Ok(false);
        }
        match self.cursor.current_char() {
            Some('?' | '*' | '+' | ')' | '{' | '}' | '|' | ']') => return Ok(false),
            Some('(') => self.translate_group()?,
            Some('\\') => {
                self.cursor.advance();
                let class = self.parse_escape()?;
                class.render(&mut self.out);
            }
            Some('[') => self.translate_class()?,
            Some('.' | '^' | '$') if self.options.xpath => self.copy_current(),
            Some('.') => {
                schema_dot().render(&mut self.out);
                self.cursor.advance();
            }
            _ => self.translate_literal()?,
        }
        Ok(true)
    }

    fn translate_group(&mut self) -> SyntaxResult<()> {
        self.enter_nesting()?;
        self.copy_current();
        let index = self.captures.open();
        self.translate_regexp()?;
        self.cursor.expect(')')?;
        self.captures.close(index);
        self.copy_current();
        self.leave_nesting();
        Ok(())
    }

    fn translate_class(&mut self) -> SyntaxResult<()> {
        self.cursor.set_in_char_class(true);
        self.cursor.advance();
        let class = self.parse_class_expr()?;
        self.cursor.set_in_char_class(false);
        self.cursor.advance();
        class.render(&mut self.out);
        Ok(())
    }

    fn translate_literal(&mut self) -> SyntaxResult<()> {
        let c = self.cursor.absorb_surrogate_pair()?;
        self.cursor.advance();
        if self.options.case_blind {
            let variants = case_variants(c);
            if !variants.is_empty() {
                let mut members = vec![CharClass::Char(c)];
                members.extend(variants.into_iter().map(CharClass::Char));
                CharClass::union(members).render(&mut self.out);
                return Ok(());
            }
        }
        push_escaped(&mut self.out, c);
        Ok(())
    }

    fn translate_quantifier(&mut self) -> SyntaxResult<()> {
        match self.cursor.current_char() {
            Some('*' | '?' | '+') => self.copy_current(),
            Some('{') => {
                self.copy_current();
                self.translate_quantity()?;
                self.cursor.expect('}')?;
                self.copy_current();
            }
            _ => return Ok(()),
        }
        if self.options.xpath && self.current_is('?') {
            self.copy_current();
        }
        Ok(())
    }

    /// A lower count too large for `u32` is emitted as `u32::MAX`; an upper
    /// count that large leaves the repetition open. The bounds are still
    /// compared exactly.
    fn translate_quantity(&mut self) -> SyntaxResult<()> {
        let lower = self.parse_quantity_digits()?;
        let lower_value = lower.parse::<u32>().ok();
        self.push_count(lower_value);
        if !self.current_is(',') {
            return Ok(());
        }
        self.copy_current();
        if self.current_is('}') {
            return Ok(());
        }
        let upper = self.parse_quantity_digits()?;
        let upper_value = upper.parse::<u32>().ok();
        if let Some(count) = upper_value {
            self.push_count(Some(count));
        }

        let descending = match (lower_value, upper_value) {
            (Some(lower), Some(upper)) => upper < lower,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (None, None) => match (lower.parse::<BigUint>(), upper.parse::<BigUint>()) {
                (Ok(lower), Ok(upper)) => upper < lower,
                _ => false,
            },
        };
        if descending {
            return Err(self.cursor.error(SyntaxErrorKind::InvalidQuantityRange));
        }
        Ok(())
    }

    /// Digits up to the next `,` or `}`
    fn parse_quantity_digits(&mut self) -> SyntaxResult<String> {
        let mut digits = String::new();
        loop {
            match self.cursor.current_char() {
                Some(c) if c.is_ascii_digit() => digits.push(c),
                _ => return Err(self.cursor.error(SyntaxErrorKind::ExpectedDigit)),
            }
            self.cursor.advance();
            if self.current_is(',') || self.current_is('}') {
                return Ok(digits);
            }
        }
    }

    fn push_count(&mut self, value: Option<u32>) {
        let count = value.unwrap_or(u32::MAX);
        self.out.push_str(&count.to_string());
    }

    /// Parse the escape whose first character (after `\`) is current
    fn parse_escape(&mut self) -> SyntaxResult<CharClass> {
        if self.cursor.is_eos() {
            return Err(self.cursor.error(SyntaxErrorKind::IncompleteEscape));
        }
        let c = self.cursor.absorb_surrogate_pair()?;
        let class = match c {
            'n' => CharClass::Char('\n'),
            'r' => CharClass::Char('\r'),
            't' => CharClass::Char('\t'),
            '\\' | '|' | '.' | '-' | '^' | '?' | '*' | '+' | '(' | ')' | '{' | '}' | '['
            | ']' => CharClass::Char(c),
            '$' if self.options.xpath => CharClass::Char('$'),
            'p' => return self.parse_property(),
            'P' => return Ok(self.parse_property()?.complement()),
            '1'..='9' if self.options.xpath && !self.cursor.in_char_class() => {
                return Ok(self.parse_back_reference());
            }
            '1'..='9' => {
                return Err(self.cursor.error(SyntaxErrorKind::BackReferenceNotAllowed));
            }
            _ => match escape_class(c) {
                Some(class) => class,
                None => return Err(self.cursor.error(SyntaxErrorKind::InvalidEscape(c))),
            },
        };
        self.cursor.advance();
        Ok(class)
    }

    /// Resolve `\N` against the groups closed so far.
    ///
    /// Two digits are taken when they name a closed group; otherwise the
    /// cursor steps back and the second digit is left for the caller. An
    /// unknown group matches the empty string.
    fn parse_back_reference(&mut self) -> CharClass {
        let first = self.current_digit().unwrap_or(0);
        self.cursor.advance();
        if let Some(second) = self.current_digit() {
            let number = first * 10 + second;
            self.cursor.advance();
            if self.captures.is_closed(number) {
                trace!("\\{} is a back-reference to group {}", number, number);
                return CharClass::BackReference(Some(number));
            }
            self.cursor.recede();
        }
        if self.captures.is_closed(first) {
            trace!("\\{} is a back-reference to group {}", first, first);
            CharClass::BackReference(Some(first))
        } else {
            trace!("no closed group {}, \\{} matches the empty string", first, first);
            CharClass::BackReference(None)
        }
    }

    fn current_digit(&self) -> Option<u32> {
        self.cursor.current_char().and_then(|c| c.to_digit(10))
    }

    /// Parse `{name}` after `\p` or `\P`, current on the `p`
    fn parse_property(&mut self) -> SyntaxResult<CharClass> {
        self.cursor.advance();
        self.cursor.expect('{')?;
        let name_offset = self.cursor.offset() + 1;
        let mut name = String::new();
        loop {
            self.cursor.advance();
            match self.cursor.current_char() {
                Some('}') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '-' => name.push(c),
                _ => self.cursor.expect('}')?,
            }
        }
        self.cursor.advance();

        let error = |kind| RegexSyntaxError::new(kind, name_offset);
        let mut letters = name.chars();
        match (letters.next(), name.len()) {
            (None, _) => Err(error(SyntaxErrorKind::EmptyPropertyName)),
            (Some(code), 1) => {
                category_class(code).ok_or_else(|| error(SyntaxErrorKind::UnknownCategory(name)))
            }
            (Some(_), 2) => sub_category_class(&name)
                .ok_or_else(|| error(SyntaxErrorKind::UnknownCategory(name.clone()))),
            _ => match name.strip_prefix("Is") {
                Some(block) => block_class(block)
                    .ok_or_else(|| error(SyntaxErrorKind::UnknownBlock(block.to_string()))),
                None => Err(error(SyntaxErrorKind::InvalidPropertyName(name.clone()))),
            },
        }
    }

    /// Parse the inside of `[...]`, stopping on the closing `]`
    fn parse_class_expr(&mut self) -> SyntaxResult<CharClass> {
        let negated = self.current_is('^');
        if negated {
            self.cursor.advance();
        }
        let mut members = Vec::new();
        let mut subtrahend = None;
        let mut first = true;
        loop {
            if !first && self.current_is('-') && self.cursor.lookahead() == Some('[') {
                self.cursor.advance();
                self.cursor.advance();
                self.enter_nesting()?;
                let inner = self.parse_class_expr()?;
                self.leave_nesting();
                self.cursor.advance();
                self.cursor.expect(']')?;
                subtrahend = Some(inner);
                break;
            }
            if !first && self.current_is(']') {
                break;
            }
            let lower = self.parse_class_member(first)?;
            first = false;
            if self.current_is('-') && !matches!(self.cursor.lookahead(), Some('[' | ']')) {
                self.cursor.advance();
                let upper = self.parse_class_member(false)?;
                let (Some(start), Some(end)) = (lower.single_char(), upper.single_char()) else {
                    return Err(self.cursor.error(SyntaxErrorKind::MultiCharRange));
                };
                if start > end {
                    return Err(self
                        .cursor
                        .error(SyntaxErrorKind::InvalidRange { start, end }));
                }
                members.push(CharClass::range(start, end));
                if self.options.case_blind {
                    push_range_variants(&mut members, start, end);
                }
            } else {
                let single = lower.single_char();
                members.push(lower);
                if let (true, Some(c)) = (self.options.case_blind, single) {
                    members.extend(case_variants(c).into_iter().map(CharClass::Char));
                }
            }
        }

        let mut class = if members.len() == 1 {
            members.swap_remove(0)
        } else {
            CharClass::union(members)
        };
        if negated {
            class = class.complement();
        }
        if let Some(subtrahend) = subtrahend {
            class = class.subtract(subtrahend);
        }
        Ok(class)
    }

    /// A single character or escape inside a class. A `-` is only a member
    /// at the start of the class or right before its `]`.
    fn parse_class_member(&mut self, first: bool) -> SyntaxResult<CharClass> {
        if self.cursor.is_eos() {
            return Err(self.cursor.error(SyntaxErrorKind::UnexpectedEnd(']')));
        }
        match self.cursor.current_char() {
            Some('\\') => {
                self.cursor.advance();
                return self.parse_escape();
            }
            Some(c @ ('[' | ']')) => {
                return Err(self.cursor.error(SyntaxErrorKind::MustBeEscaped(c)));
            }
            Some('-') if !first && self.cursor.lookahead() != Some(']') => {
                return Err(self.cursor.error(SyntaxErrorKind::MustBeEscaped('-')));
            }
            _ => {}
        }
        let c = self.cursor.absorb_surrogate_pair()?;
        self.cursor.advance();
        Ok(CharClass::Char(c))
    }
}

/// Add the case variants of a range; `a-z` and `A-Z` take a shortcut
fn push_range_variants(members: &mut Vec<CharClass>, start: char, end: char) {
    let other = match (start, end) {
        ('a', 'z') => Some(CharClass::Range('A', 'Z')),
        ('A', 'Z') => Some(CharClass::Range('a', 'z')),
        _ => None,
    };
    if let Some(other) = other {
        members.push(other);
        members.extend(ROMAN_VARIANTS.iter().copied().map(CharClass::Char));
        return;
    }
    members.extend(
        range_case_variants(start, end)
            .into_iter()
            .map(|(lower, upper)| CharClass::range(lower, upper)),
    );
}

/// Translate a pattern to Rust regex syntax
///
/// # Example
/// ```
/// use stx_regex::{TranslateOptions, translate};
///
/// let result = translate("[a-c]+", TranslateOptions::default()).unwrap();
/// assert_eq!(result, "[a-c]+");
/// ```
pub fn translate(source: &str, options: TranslateOptions) -> SyntaxResult<String> {
    let mut translator = Translator::new(source, options);
    translator.run()?;
    debug!(
        "translated {:?} with {:?} to {:?}",
        source,
        options,
        translator.output()
    );
    Ok(translator.into_output())
}

/// Translate a pattern given as UTF-16 code units
pub fn translate_utf16(source: &[u16], options: TranslateOptions) -> SyntaxResult<String> {
    let mut translator = Translator::from_utf16(source, options);
    translator.run()?;
    debug!(
        "translated {} UTF-16 units with {:?} to {:?}",
        source.len(),
        options,
        translator.output()
    );
    Ok(translator.into_output())
}

/// Translate with details for debugging
pub fn translate_debug(source: &str, options: TranslateOptions) -> SyntaxResult<TranslateResult> {
    let mut translator = Translator::new(source, options);
    translator.run()?;
    Ok(TranslateResult {
        input: source.to_string(),
        options,
        group_count: translator.group_count(),
        output: translator.into_output(),
    })
}

/// Result of a translation with debug information
#[derive(Debug, Clone)]
pub struct TranslateResult {
    /// The original pattern
    pub input: String,
    /// The options the pattern was translated with
    pub options: TranslateOptions,
    /// Number of capturing groups in the pattern
    pub group_count: u32,
    /// The translated pattern
    pub output: String,
}

impl TranslateResult {
    /// Print a formatted report of the translation
    pub fn report(&self) {
        println!("Translation Report");
        println!("==================");
        println!("Input:   {}", self.input);
        println!(
            "Mode:    {}",
            if self.options.xpath { "xpath" } else { "schema" }
        );
        println!("Options: {:?}", self.options);
        println!("Groups:  {}", self.group_count);
        println!("Output:  {}", self.output);
    }
}
