//! Character-class algebra
//!
//! A [`CharClass`] is an immutable expression tree describing a set of code
//! points. Every node can render itself in Rust regex syntax either as the set
//! it denotes ([`CharClass::render`]) or as that set's complement
//! ([`CharClass::render_complement`]), so negation never needs a separate
//! tree rewrite.
//!
//! Rendering rules:
//! - single characters render bare, escaped when they are regex meta
//!   characters; ranges render as `[lo-hi]`
//! - categories render as `\p{..}` and their complement as `\P{..}`
//! - a union renders as one bracket holding every member
//! - a subtraction `A - B` renders as `[A&&B']`, its complement as `[A'B]`
//! - the complement of a union puts the simple members (characters, ranges,
//!   categories) in one `[^...]` and intersects it with the complements of
//!   the compound members

use std::fmt;

const EVERYTHING: &str = r"[\x00-\x{10FFFF}]";
const NOTHING: &str = r"[^\x00-\x{10FFFF}]";
/// Zero-length match that still accepts a quantifier after it
const EMPTY_MATCH: &str = r"(?:[^\x00-\x{10FFFF}]{0})";

/// A set of code points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharClass {
    /// Exactly one character
    Char(char),
    /// Every character from the first to the second, inclusive
    Range(char, char),
    /// A general category understood natively by the target engine
    Property(String),
    /// Union of the members, rendered in order
    Union(Vec<CharClass>),
    /// Members of the first set that are not in the second
    Subtraction(Box<CharClass>, Box<CharClass>),
    /// Every scalar value not in the inner set
    Complement(Box<CharClass>),
    /// Back-reference to a closed group; `None` matches the empty string
    BackReference(Option<u32>),
    /// Matches nothing
    Empty,
}

impl CharClass {
    /// Create a range, collapsing a one-character range to [`CharClass::Char`]
    pub fn range(lower: char, upper: char) -> Self {
        debug_assert!(lower <= upper);
        if lower == upper {
            CharClass::Char(lower)
        } else {
            CharClass::Range(lower, upper)
        }
    }

    /// Create a category property
    pub fn property(name: impl Into<String>) -> Self {
        CharClass::Property(name.into())
    }

    /// Create a union
    pub fn union(members: Vec<CharClass>) -> Self {
        CharClass::Union(members)
    }

    /// Create the set difference `self - other`
    pub fn subtract(self, other: CharClass) -> Self {
        CharClass::Subtraction(Box::new(self), Box::new(other))
    }

    /// Create the complement of `self`
    pub fn complement(self) -> Self {
        CharClass::Complement(Box::new(self))
    }

    /// The character this class consists of, if it is a single character
    pub fn single_char(&self) -> Option<char> {
        match self {
            CharClass::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Whether the node can be written as a bare item inside one bracket
    fn is_simple(&self) -> bool {
        matches!(
            self,
            CharClass::Char(_) | CharClass::Range(..) | CharClass::Property(_)
        )
    }

    /// Append the set this class denotes
    pub fn render(&self, out: &mut String) {
        match self {
            CharClass::Char(c) => push_escaped(out, *c),
            CharClass::Range(..) => {
                out.push('[');
                self.render_in_class(out);
                out.push(']');
            }
            CharClass::Property(name) => {
                out.push_str("\\p{");
                out.push_str(name);
                out.push('}');
            }
            CharClass::Union(members) if members.is_empty() => out.push_str(NOTHING),
            CharClass::Union(members) => {
                out.push('[');
                for member in members {
                    member.render(out);
                }
                out.push(']');
            }
            CharClass::Subtraction(minuend, subtrahend) => {
                out.push('[');
                minuend.render(out);
                out.push_str("&&");
                subtrahend.render_complement(out);
                out.push(']');
            }
            CharClass::Complement(inner) => inner.render_complement(out),
            CharClass::BackReference(group) => push_back_reference(out, *group),
            CharClass::Empty => out.push_str(NOTHING),
        }
    }

    /// Append the complement of the set this class denotes
    pub fn render_complement(&self, out: &mut String) {
        match self {
            CharClass::Char(_) | CharClass::Range(..) => {
                out.push_str("[^");
                self.render_in_class(out);
                out.push(']');
            }
            CharClass::Property(name) => {
                out.push_str("\\P{");
                out.push_str(name);
                out.push('}');
            }
            CharClass::Union(members) => render_union_complement(members, out),
            CharClass::Subtraction(minuend, subtrahend) => {
                out.push('[');
                minuend.render_complement(out);
                subtrahend.render(out);
                out.push(']');
            }
            CharClass::Complement(inner) => inner.render(out),
            // A back-reference has no complement; it renders the same way.
            CharClass::BackReference(group) => push_back_reference(out, *group),
            CharClass::Empty => out.push_str(EVERYTHING),
        }
    }

    /// Append a simple member without its surrounding brackets
    fn render_in_class(&self, out: &mut String) {
        match self {
            CharClass::Char(c) => push_escaped(out, *c),
            CharClass::Range(lower, upper) => {
                push_escaped(out, *lower);
                out.push('-');
                push_escaped(out, *upper);
            }
            CharClass::Property(_) => self.render(out),
            _ => unreachable!("render_in_class on a compound class"),
        }
    }

    /// Render the set as a regex string
    pub fn to_regex_string(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    /// Render the complement as a regex string
    pub fn to_complement_string(&self) -> String {
        let mut out = String::new();
        self.render_complement(&mut out);
        out
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_regex_string())
    }
}

fn render_union_complement(members: &[CharClass], out: &mut String) {
    let mut operands = Vec::new();

    let mut simple = String::new();
    for member in members.iter().filter(|m| m.is_simple()) {
        member.render_in_class(&mut simple);
    }
    if !simple.is_empty() {
        operands.push(format!("[^{}]", simple));
    }
    // The complement of an empty member is everything, which leaves an
    // intersection unchanged.
    for member in members
        .iter()
        .filter(|m| !m.is_simple() && **m != CharClass::Empty)
    {
        operands.push(member.to_complement_string());
    }

    match operands.len() {
        0 => out.push_str(EVERYTHING),
        1 => out.push_str(&operands[0]),
        _ => {
            out.push('[');
            out.push_str(&operands.join("&&"));
            out.push(']');
        }
    }
}

fn push_back_reference(out: &mut String, group: Option<u32>) {
    match group {
        Some(n) => out.push_str(&format!("(?:\\{})", n)),
        None => out.push_str(EMPTY_MATCH),
    }
}

/// Whether `c` has a special meaning somewhere in Rust regex syntax
pub fn is_meta_character(c: char) -> bool {
    matches!(
        c,
        '\\' | '.'
            | '+'
            | '*'
            | '?'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '#'
            | '&'
            | '-'
            | '~'
    )
}

/// Append `c` so that it matches itself both inside and outside a bracket
pub fn push_escaped(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if is_meta_character(c) => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() || (c.is_whitespace() && c != ' ') => {
            out.push_str(&format!("\\x{{{:X}}}", u32::from(c)));
        }
        c => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(cs: &[char]) -> CharClass {
        CharClass::union(cs.iter().copied().map(CharClass::Char).collect())
    }

    #[test]
    fn test_single_char() {
        assert_eq!(CharClass::Char('a').to_regex_string(), "a");
        assert_eq!(CharClass::Char('a').to_complement_string(), "[^a]");
    }

    #[test]
    fn test_meta_char_escaped() {
        assert_eq!(CharClass::Char('.').to_regex_string(), "\\.");
        assert_eq!(CharClass::Char('&').to_regex_string(), "\\&");
        assert_eq!(CharClass::Char('-').to_complement_string(), "[^\\-]");
    }

    #[test]
    fn test_control_chars() {
        assert_eq!(CharClass::Char('\n').to_regex_string(), "\\n");
        assert_eq!(CharClass::Char('\u{0}').to_regex_string(), "\\x{0}");
        assert_eq!(CharClass::Char('\u{2028}').to_regex_string(), "\\x{2028}");
        assert_eq!(CharClass::Char(' ').to_regex_string(), " ");
    }

    #[test]
    fn test_range() {
        let range = CharClass::range('a', 'z');
        assert_eq!(range.to_regex_string(), "[a-z]");
        assert_eq!(range.to_complement_string(), "[^a-z]");
        assert_eq!(CharClass::range('q', 'q'), CharClass::Char('q'));
    }

    #[test]
    fn test_property() {
        let nd = CharClass::property("Nd");
        assert_eq!(nd.to_regex_string(), "\\p{Nd}");
        assert_eq!(nd.to_complement_string(), "\\P{Nd}");
    }

    #[test]
    fn test_union() {
        let union = CharClass::union(vec![
            CharClass::Char('a'),
            CharClass::range('0', '9'),
            CharClass::property("Lu"),
        ]);
        assert_eq!(union.to_regex_string(), "[a[0-9]\\p{Lu}]");
        assert_eq!(union.to_complement_string(), "[^a0-9\\p{Lu}]");
    }

    #[test]
    fn test_union_complement_with_compound_member() {
        let union = CharClass::union(vec![
            CharClass::Char('a'),
            chars(&['x', 'y']),
            CharClass::range('0', '9').complement(),
        ]);
        assert_eq!(union.to_complement_string(), "[[^a]&&[^xy]&&[0-9]]");
    }

    #[test]
    fn test_union_complement_only_compound() {
        let union = CharClass::union(vec![chars(&['x', 'y'])]);
        assert_eq!(union.to_complement_string(), "[^xy]");
    }

    #[test]
    fn test_empty_union() {
        let union = CharClass::union(Vec::new());
        assert_eq!(union.to_regex_string(), NOTHING);
        assert_eq!(union.to_complement_string(), EVERYTHING);
    }

    #[test]
    fn test_subtraction() {
        let class = CharClass::range('a', 'z').subtract(chars(&['a', 'e']));
        assert_eq!(class.to_regex_string(), "[[a-z]&&[^ae]]");
        assert_eq!(class.to_complement_string(), "[[^a-z][ae]]");
    }

    #[test]
    fn test_complement_swaps_rendering() {
        let class = CharClass::property("L").complement();
        assert_eq!(class.to_regex_string(), "\\P{L}");
        assert_eq!(class.to_complement_string(), "\\p{L}");
    }

    #[test]
    fn test_back_reference() {
        assert_eq!(CharClass::BackReference(Some(3)).to_regex_string(), "(?:\\3)");
        assert_eq!(CharClass::BackReference(None).to_regex_string(), EMPTY_MATCH);
        assert_eq!(CharClass::BackReference(None).to_complement_string(), EMPTY_MATCH);
    }

    #[test]
    fn test_empty() {
        assert_eq!(CharClass::Empty.to_regex_string(), NOTHING);
        assert_eq!(CharClass::Empty.to_complement_string(), EVERYTHING);
        let union = CharClass::union(vec![CharClass::Empty, CharClass::Char('a')]);
        assert_eq!(union.to_complement_string(), "[^a]");
    }

    #[test]
    fn test_single_char_accessor() {
        assert_eq!(CharClass::Char('x').single_char(), Some('x'));
        assert_eq!(CharClass::range('a', 'b').single_char(), None);
        assert_eq!(CharClass::property("L").single_char(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CharClass::range('a', 'c').to_string(), "[a-c]");
    }
}
