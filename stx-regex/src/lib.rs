//! STX Regex Library
//!
//! Translates XML Schema regular expressions, optionally with the XPath 2.0
//! extensions, into Rust regex syntax, and compiles them for matching.

pub mod blocks;
pub mod captures;
pub mod class;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod flags;
pub mod replace;
pub mod translator;
pub mod unicode;

pub use captures::CaptureSet;
pub use class::CharClass;
pub use cursor::Cursor;
pub use engine::{Match, Regex, RegexBuilder};
pub use error::{RegexError, RegexSyntaxError, Result, SyntaxErrorKind};
pub use flags::{RegexFlags, TranslateOptions};
pub use replace::{Replacement, ReplacementError, ReplacementPart};
pub use translator::{
    NESTING_LIMIT, TranslateResult, Translator, translate, translate_debug, translate_utf16,
};

/// Translate a pattern as `fn:matches` would, from its flags string
///
/// This is the entry point used when a stylesheet supplies the pattern and
/// flags as strings.
pub fn translate_xpath(pattern: &str, flags: &str) -> Result<String> {
    let options = RegexFlags::parse(flags)?.translate_options(true);
    Ok(translate(pattern, options)?)
}
