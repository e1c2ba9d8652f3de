//! Dominant-script detection for lyric lines.
//!
//! Classification is purely character-range based. Kana presence wins over
//! Han characters (kanji mixed with kana is Japanese), and Hangul wins over
//! Han characters. Only a line whose CJK content is Han alone is Chinese.

use serde::{Deserialize, Serialize};

/// Script class of a lyric line, mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Japanese,
    Korean,
    Chinese,
    Other,
}

impl Script {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::Chinese => "chinese",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hiragana or Katakana (including the prolonged sound mark).
#[must_use]
pub const fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

/// Hangul syllables and compatibility jamo.
#[must_use]
pub const fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{3130}'..='\u{318F}')
}

/// CJK Unified Ideographs and Extension A.
#[must_use]
pub const fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

#[derive(Default)]
struct Signals {
    kana: bool,
    hangul: bool,
    han: bool,
}

fn signals(text: &str) -> Signals {
    let mut signals = Signals::default();
    for c in text.chars() {
        signals.kana |= is_kana(c);
        signals.hangul |= is_hangul(c);
        signals.han |= is_han(c);
    }
    signals
}

/// Classify the dominant script of a line.
#[must_use]
pub fn classify(text: &str) -> Script {
    let s = signals(text);
    if s.kana {
        Script::Japanese
    } else if s.hangul {
        Script::Korean
    } else if s.han {
        Script::Chinese
    } else {
        Script::Other
    }
}

/// Whether the line carries a Japanese signal (any kana).
#[must_use]
pub fn is_japanese(text: &str) -> bool {
    text.chars().any(is_kana)
}

/// Whether the line carries any Hangul.
#[must_use]
pub fn is_korean(text: &str) -> bool {
    text.chars().any(is_hangul)
}

/// Whether the line is Han-only CJK: Han present, no kana and no Hangul.
#[must_use]
pub fn is_chinese(text: &str) -> bool {
    let s = signals(text);
    s.han && !s.kana && !s.hangul
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kana_with_kanji_is_japanese() {
        assert_eq!(classify("こんにちは世界"), Script::Japanese);
        assert!(is_japanese("こんにちは世界"));
        assert!(!is_chinese("こんにちは世界"));
    }

    #[test]
    fn test_katakana_only_is_japanese() {
        assert_eq!(classify("カタカナ"), Script::Japanese);
    }

    #[test]
    fn test_hangul_is_korean() {
        assert_eq!(classify("안녕하세요"), Script::Korean);
        assert!(is_korean("안녕하세요"));
    }

    #[test]
    fn test_hangul_with_han_is_korean() {
        assert_eq!(classify("大韓民國 만세"), Script::Korean);
        assert!(!is_chinese("大韓民國 만세"));
    }

    #[test]
    fn test_han_only_is_chinese() {
        assert_eq!(classify("你好世界"), Script::Chinese);
        assert!(is_chinese("你好世界"));
        assert!(!is_japanese("你好世界"));
    }

    #[test]
    fn test_latin_is_other() {
        assert_eq!(classify("Hello world"), Script::Other);
        assert_eq!(classify(""), Script::Other);
        assert!(!is_chinese(""));
    }

    #[test]
    fn test_mixed_latin_and_kana() {
        assert_eq!(classify("I love you ありがとう"), Script::Japanese);
    }
}
