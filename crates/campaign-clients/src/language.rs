//! Output-language selection from the case-study source text.

use std::sync::LazyLock;

use regex::Regex;

static HEBREW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Hebrew}").expect("valid regex"));
static ARABIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Arabic}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Hebrew,
    Arabic,
}

impl Language {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hebrew => "Hebrew",
            Language::Arabic => "Arabic",
        }
    }

    #[must_use]
    pub fn is_right_to_left(self) -> bool {
        matches!(self, Language::Hebrew | Language::Arabic)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the generation language for `text`.
///
/// Any Hebrew character selects Hebrew, otherwise any Arabic character selects
/// Arabic. Text without right-to-left script falls back to English.
#[must_use]
pub fn detect_language(text: &str) -> Language {
    if HEBREW_RE.is_match(text) {
        Language::Hebrew
    } else if ARABIC_RE.is_match(text) {
        Language::Arabic
    } else {
        Language::English
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_latin_text_is_english() {
        assert_eq!(detect_language("Quarterly results beat forecast"), Language::English);
    }

    #[test]
    fn empty_text_is_english() {
        assert_eq!(detect_language(""), Language::English);
    }

    #[test]
    fn single_hebrew_character_selects_hebrew() {
        assert_eq!(detect_language("Launch day ש"), Language::Hebrew);
    }

    #[test]
    fn arabic_text_selects_arabic() {
        assert_eq!(detect_language("مرحبا بالعالم"), Language::Arabic);
    }

    #[test]
    fn accented_latin_is_not_right_to_left() {
        let lang = detect_language("Café société à Zürich");
        assert_eq!(lang, Language::English);
        assert!(!lang.is_right_to_left());
    }

    #[test]
    fn hebrew_is_right_to_left() {
        assert!(Language::Hebrew.is_right_to_left());
        assert!(Language::Arabic.is_right_to_left());
    }
}
