//! Character classes for the ESFM tag scanner

use crate::usfm::config::EsfmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Space,
    Underscore,
    Equals,
    OpenBrace,
    CloseBrace,
    Dash,
    Punctuation,
    /// `\` and `*`, which belong to USFM markers
    Marker,
    Other,
}

impl CharClass {
    pub fn of(c: char, config: &EsfmConfig) -> Self {
        match c {
            '_' => CharClass::Underscore,
            '=' => CharClass::Equals,
            '{' => CharClass::OpenBrace,
            '}' => CharClass::CloseBrace,
            '\\' | '*' => CharClass::Marker,
            c if c.is_whitespace() => CharClass::Space,
            c if config.is_dash(c) => CharClass::Dash,
            c if config.is_word_punctuation(c) => CharClass::Punctuation,
            _ => CharClass::Other,
        }
    }

    /// Characters that end a pending `=` tag: everything but tag text.
    pub fn ends_tag(self) -> bool {
        self != CharClass::Other
    }

    /// Characters that end a word (and close an underline group).
    pub fn breaks_word(self) -> bool {
        matches!(
            self,
            CharClass::Space | CharClass::Dash | CharClass::Punctuation | CharClass::Marker
        )
    }
}

/// What the scanner is in the middle of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    Text,
    /// Inside a tag; holds the tag text so far, starting with `=`
    Tag(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let config = EsfmConfig::default();
        assert_eq!(CharClass::of(' ', &config), CharClass::Space);
        assert_eq!(CharClass::of('\t', &config), CharClass::Space);
        assert_eq!(CharClass::of('_', &config), CharClass::Underscore);
        assert_eq!(CharClass::of('=', &config), CharClass::Equals);
        assert_eq!(CharClass::of('{', &config), CharClass::OpenBrace);
        assert_eq!(CharClass::of('}', &config), CharClass::CloseBrace);
        assert_eq!(CharClass::of('–', &config), CharClass::Dash);
        assert_eq!(CharClass::of(':', &config), CharClass::Punctuation);
        assert_eq!(CharClass::of('\\', &config), CharClass::Marker);
        assert_eq!(CharClass::of('*', &config), CharClass::Marker);
        assert_eq!(CharClass::of('א', &config), CharClass::Other);
        assert_eq!(CharClass::of('7', &config), CharClass::Other);
    }

    #[test]
    fn test_tag_terminators() {
        for class in [
            CharClass::Space,
            CharClass::Underscore,
            CharClass::Equals,
            CharClass::OpenBrace,
            CharClass::CloseBrace,
            CharClass::Dash,
            CharClass::Punctuation,
            CharClass::Marker,
        ] {
            assert!(class.ends_tag(), "{class:?}");
        }
        assert!(!CharClass::Other.ends_tag());
        assert!(CharClass::Marker.breaks_word());
    }
}
