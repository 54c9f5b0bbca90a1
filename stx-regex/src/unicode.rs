//! Unicode category tables and the precomputed escape classes
//!
//! Schema regular expressions assume Unicode 3.1 while the target engine
//! carries current Unicode tables. Category classes are therefore the
//! engine's native `\p{..}` property adjusted by a small table of characters
//! whose category changed since 3.1. Each adjusted class is computed on first
//! use and kept for the life of the process.

use std::sync::{LazyLock, OnceLock};

use log::debug;
use regex_syntax::hir::{ClassUnicode, ClassUnicodeRange};

use crate::class::CharClass;

/// One-letter general categories accepted by `\p{X}`
pub const CATEGORIES: [char; 7] = ['L', 'M', 'N', 'P', 'Z', 'S', 'C'];

/// Two-letter general categories accepted by `\p{Xx}`
pub const SUB_CATEGORIES: [&str; 29] = [
    "Lu", "Ll", "Lt", "Lm", "Lo", "Mn", "Mc", "Me", "Nd", "Nl", "No", "Pc", "Pd", "Ps", "Pe",
    "Pi", "Pf", "Po", "Zs", "Zl", "Zp", "Sm", "Sc", "Sk", "So", "Cc", "Cf", "Co", "Cn",
];

/// Non-ASCII characters whose case variants fall in `a-z`/`A-Z`
pub const ROMAN_VARIANTS: [char; 2] = ['\u{017F}', '\u{212A}'];

/// Blocks that held no assigned characters in Unicode 3.1
const UNASSIGNED_IN_3_1: &[(char, char)] = &[
    ('\u{0860}', '\u{08FF}'),
    ('\u{18B0}', '\u{1DFF}'),
    ('\u{2C00}', '\u{2E7F}'),
    ('\u{A4D0}', '\u{ABFF}'),
    ('\u{10000}', '\u{102FF}'),
    ('\u{1F000}', '\u{1FBFF}'),
];

/// Initial quote punctuation as assigned in Unicode 3.1
const PI_CHARS: &[char] = &[
    '\u{00AB}', '\u{2018}', '\u{201B}', '\u{201C}', '\u{201F}', '\u{2039}',
];

/// Final quote punctuation as assigned in Unicode 3.1
const PF_CHARS: &[char] = &['\u{00BB}', '\u{2019}', '\u{201D}', '\u{203A}'];

/// Characters to add to or remove from a native category
struct CategoryPatch {
    name: &'static str,
    include: &'static [(char, char)],
    exclude: &'static [(char, char)],
}

const SOFT_HYPHEN: (char, char) = ('\u{00AD}', '\u{00AD}');
const ZERO_WIDTH_SPACE: (char, char) = ('\u{200B}', '\u{200B}');
const ROMAN_REVERSED_HUNDRED: (char, char) = ('\u{2183}', '\u{2183}');
const ETHIOPIC_DIGITS: (char, char) = ('\u{1369}', '\u{1371}');
const ORDINAL_INDICATORS: &[(char, char)] = &[('\u{00AA}', '\u{00AA}'), ('\u{00BA}', '\u{00BA}')];

const PATCHES: &[CategoryPatch] = &[
    CategoryPatch {
        name: "L",
        include: &[],
        exclude: &[ROMAN_REVERSED_HUNDRED],
    },
    CategoryPatch {
        name: "Lu",
        include: &[],
        exclude: &[ROMAN_REVERSED_HUNDRED],
    },
    CategoryPatch {
        name: "Ll",
        include: ORDINAL_INDICATORS,
        exclude: &[],
    },
    CategoryPatch {
        name: "Lo",
        include: &[],
        exclude: ORDINAL_INDICATORS,
    },
    CategoryPatch {
        name: "N",
        include: &[ROMAN_REVERSED_HUNDRED],
        exclude: &[],
    },
    CategoryPatch {
        name: "Nl",
        include: &[ROMAN_REVERSED_HUNDRED],
        exclude: &[],
    },
    CategoryPatch {
        name: "Nd",
        include: &[ETHIOPIC_DIGITS],
        exclude: &[],
    },
    CategoryPatch {
        name: "No",
        include: &[],
        exclude: &[ETHIOPIC_DIGITS],
    },
    CategoryPatch {
        name: "P",
        include: &[SOFT_HYPHEN],
        exclude: &[],
    },
    CategoryPatch {
        name: "Pd",
        include: &[SOFT_HYPHEN],
        exclude: &[],
    },
    CategoryPatch {
        name: "Z",
        include: &[ZERO_WIDTH_SPACE],
        exclude: &[],
    },
    CategoryPatch {
        name: "Zs",
        include: &[ZERO_WIDTH_SPACE],
        exclude: &[],
    },
    CategoryPatch {
        name: "C",
        include: UNASSIGNED_IN_3_1,
        exclude: &[SOFT_HYPHEN, ZERO_WIDTH_SPACE],
    },
    CategoryPatch {
        name: "Cf",
        include: &[],
        exclude: &[SOFT_HYPHEN, ZERO_WIDTH_SPACE],
    },
    CategoryPatch {
        name: "Cn",
        include: UNASSIGNED_IN_3_1,
        exclude: &[],
    },
];

static CATEGORY_CACHE: [OnceLock<CharClass>; CATEGORIES.len()] =
    [const { OnceLock::new() }; CATEGORIES.len()];

static SUB_CATEGORY_CACHE: [OnceLock<CharClass>; SUB_CATEGORIES.len()] =
    [const { OnceLock::new() }; SUB_CATEGORIES.len()];

/// Class for a one-letter category, or `None` if `code` is not one
pub fn category_class(code: char) -> Option<CharClass> {
    let index = CATEGORIES.iter().position(|&c| c == code)?;
    let class = CATEGORY_CACHE[index].get_or_init(|| {
        debug!("computing class for category {}", code);
        compute_category_class(&code.to_string())
    });
    Some(class.clone())
}

/// Class for a two-letter category, or `None` if `name` is not one
pub fn sub_category_class(name: &str) -> Option<CharClass> {
    let index = SUB_CATEGORIES.iter().position(|&c| c == name)?;
    let class = SUB_CATEGORY_CACHE[index].get_or_init(|| {
        debug!("computing class for category {}", name);
        compute_category_class(name)
    });
    Some(class.clone())
}

fn compute_category_class(name: &str) -> CharClass {
    let base = match name {
        "Pi" => return chars_class(PI_CHARS),
        "Pf" => return chars_class(PF_CHARS),
        _ => CharClass::property(name),
    };
    let Some(patch) = PATCHES.iter().find(|p| p.name == name) else {
        return base;
    };

    let mut class = if patch.include.is_empty() {
        base
    } else {
        let mut members = vec![base];
        members.extend(ranges_to_members(patch.include));
        CharClass::union(members)
    };
    if !patch.exclude.is_empty() {
        class = class.subtract(CharClass::union(ranges_to_members(patch.exclude)));
    }
    class
}

fn ranges_to_members(ranges: &[(char, char)]) -> Vec<CharClass> {
    ranges
        .iter()
        .map(|&(lower, upper)| CharClass::range(lower, upper))
        .collect()
}

fn chars_class(chars: &[char]) -> CharClass {
    CharClass::union(chars.iter().copied().map(CharClass::Char).collect())
}

/// XML 1.0 NameStartChar
const NAME_START_RANGES: &[(char, char)] = &[
    (':', ':'),
    ('A', 'Z'),
    ('_', '_'),
    ('a', 'z'),
    ('\u{C0}', '\u{D6}'),
    ('\u{D8}', '\u{F6}'),
    ('\u{F8}', '\u{2FF}'),
    ('\u{370}', '\u{37D}'),
    ('\u{37F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

/// Characters that NameChar adds to NameStartChar
const NAME_EXTRA_RANGES: &[(char, char)] = &[
    ('-', '-'),
    ('.', '.'),
    ('0', '9'),
    ('\u{B7}', '\u{B7}'),
    ('\u{300}', '\u{36F}'),
    ('\u{203F}', '\u{2040}'),
];

static ESC_S: LazyLock<CharClass> = LazyLock::new(|| chars_class(&[' ', '\t', '\n', '\r']));

static ESC_D: LazyLock<CharClass> = LazyLock::new(|| CharClass::property("Nd"));

static ESC_I: LazyLock<CharClass> =
    LazyLock::new(|| CharClass::union(ranges_to_members(NAME_START_RANGES)));

static ESC_C: LazyLock<CharClass> = LazyLock::new(|| {
    let mut members = ranges_to_members(NAME_START_RANGES);
    members.extend(ranges_to_members(NAME_EXTRA_RANGES));
    CharClass::union(members)
});

static ESC_W_UPPER: LazyLock<CharClass> = LazyLock::new(|| {
    CharClass::union(
        ['P', 'Z', 'C']
            .into_iter()
            .filter_map(category_class)
            .collect(),
    )
});

/// The class a multi-character escape (`\s`, `\D`, ...) stands for
pub fn escape_class(letter: char) -> Option<CharClass> {
    let class = match letter {
        's' => ESC_S.clone(),
        'S' => ESC_S.clone().complement(),
        'd' => ESC_D.clone(),
        'D' => ESC_D.clone().complement(),
        'i' => ESC_I.clone(),
        'I' => ESC_I.clone().complement(),
        'c' => ESC_C.clone(),
        'C' => ESC_C.clone().complement(),
        'w' => ESC_W_UPPER.clone().complement(),
        'W' => ESC_W_UPPER.clone(),
        _ => return None,
    };
    Some(class)
}

/// The schema `.`: anything except newline and carriage return
pub fn schema_dot() -> CharClass {
    chars_class(&['\n', '\r']).complement()
}

/// Other characters in the simple case-folding orbit of `c`
pub fn case_variants(c: char) -> Vec<char> {
    range_case_variants(c, c)
        .into_iter()
        .flat_map(|(lower, upper)| lower..=upper)
        .collect()
}

/// Ranges holding the case variants of every character in `lower..=upper`
/// that are not already in that range
pub fn range_case_variants(lower: char, upper: char) -> Vec<(char, char)> {
    let original = ClassUnicode::new([ClassUnicodeRange::new(lower, upper)]);
    let mut folded = original.clone();
    if folded.try_case_fold_simple().is_err() {
        return Vec::new();
    }
    folded.difference(&original);
    folded
        .iter()
        .map(|range| (range.start(), range.end()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_categories() {
        assert!(category_class('X').is_none());
        assert!(sub_category_class("Cs").is_none());
        assert!(sub_category_class("Lx").is_none());
    }

    #[test]
    fn test_unpatched_category_is_bare_property() {
        assert_eq!(category_class('M'), Some(CharClass::property("M")));
        assert_eq!(sub_category_class("Lt"), Some(CharClass::property("Lt")));
    }

    #[test]
    fn test_included_ranges() {
        assert_eq!(
            sub_category_class("Nd").unwrap().to_regex_string(),
            "[\\p{Nd}[\u{1369}-\u{1371}]]"
        );
    }

    #[test]
    fn test_excluded_ranges() {
        assert_eq!(
            sub_category_class("Lu").unwrap().to_regex_string(),
            "[\\p{Lu}&&[^\u{2183}]]"
        );
    }

    #[test]
    fn test_quote_categories_are_explicit() {
        let pi = sub_category_class("Pi").unwrap();
        assert_eq!(pi, chars_class(PI_CHARS));
        let pf = sub_category_class("Pf").unwrap();
        assert_eq!(pf, chars_class(PF_CHARS));
    }

    #[test]
    fn test_cache_returns_same_class() {
        let first = category_class('C').unwrap();
        let second = category_class('C').unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cache_under_concurrent_first_use() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| sub_category_class("Cf").unwrap()))
            .collect();
        let classes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(classes.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_escape_classes() {
        assert_eq!(escape_class('d'), Some(CharClass::property("Nd")));
        assert_eq!(escape_class('s').unwrap().to_regex_string(), "[ \\t\\n\\r]");
        assert_eq!(escape_class('S').unwrap().to_regex_string(), "[^ \\t\\n\\r]");
        assert!(escape_class('q').is_none());
    }

    #[test]
    fn test_word_escape_is_complement_of_upper() {
        let w = escape_class('w').unwrap();
        let upper = escape_class('W').unwrap();
        assert_eq!(w, upper.complement());
    }

    #[test]
    fn test_schema_dot() {
        assert_eq!(schema_dot().to_regex_string(), "[^\\n\\r]");
    }

    #[test]
    fn test_case_variants() {
        assert_eq!(case_variants('a'), vec!['A']);
        let mut k = case_variants('k');
        k.sort();
        assert_eq!(k, vec!['K', '\u{212A}']);
        assert!(case_variants('1').is_empty());
    }

    #[test]
    fn test_range_case_variants() {
        assert_eq!(range_case_variants('a', 'c'), vec![('A', 'C')]);
        assert_eq!(range_case_variants('a', 'a'), vec![('A', 'A')]);
        assert!(range_case_variants('0', '9').is_empty());
        let greek = range_case_variants('\u{3B1}', '\u{3B2}');
        assert!(greek.contains(&('\u{391}', '\u{392}')));
    }

    #[test]
    fn test_roman_variants_match_case_table() {
        let mut found: Vec<char> = ('a'..='z')
            .flat_map(case_variants)
            .filter(|c| !c.is_ascii())
            .collect();
        found.sort();
        found.dedup();
        assert_eq!(found, ROMAN_VARIANTS.to_vec());
    }
}
