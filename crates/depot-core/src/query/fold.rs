//! Diacritic folding for Turkish search input.
//!
//! Folding is applied after lower-casing, so only lower-case letters are in
//! the table. `İ` lower-cases to `i` followed by U+0307, which is dropped.

/// Lower-case accented letters, paired index-wise with [`FOLD_TO`].
pub const FOLD_FROM: &str = "çğıöşü";
/// Unaccented replacements for [`FOLD_FROM`].
pub const FOLD_TO: &str = "cgiosu";

/// Left behind by lower-casing `İ`; removed before comparison.
pub const COMBINING_DOT_ABOVE: char = '\u{307}';

pub fn fold_diacritics(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != COMBINING_DOT_ABOVE)
        .map(fold_char)
        .collect()
}

fn fold_char(c: char) -> char {
    FOLD_FROM
        .chars()
        .zip(FOLD_TO.chars())
        .find_map(|(from, to)| (from == c).then_some(to))
        .unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_turkish_letters() {
        assert_eq!(fold_diacritics("çanta"), "canta");
        assert_eq!(fold_diacritics("ığdır şöğüt"), "igdir sogut");
        assert_eq!(fold_diacritics("laptop"), "laptop");
    }

    #[test]
    fn test_fold_dotted_capital_i() {
        assert_eq!(fold_diacritics(&"İSTANBUL".to_lowercase()), "istanbul");
    }

    #[test]
    fn test_table_is_aligned() {
        assert_eq!(FOLD_FROM.chars().count(), FOLD_TO.chars().count());
    }
}
