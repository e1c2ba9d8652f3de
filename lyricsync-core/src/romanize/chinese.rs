//! Han characters to toneless pinyin.

use crate::script::is_han;

const ASCII_PUNCTUATION: &str = ",.!?;:";
const CJK_PUNCTUATION: &str = "，。！？；：、（）《》〈〉【】『』「」";

/// Romanize a Chinese line. Returns `None` if no Han character could be
/// transliterated.
pub fn romanize(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len() * 2);
    let mut transliterated = false;

    for c in text.chars() {
        if !is_han(c) {
            if ASCII_PUNCTUATION.contains(c) || CJK_PUNCTUATION.contains(c) {
                // No gap between a syllable and the punctuation after it
                let kept = out.trim_end().len();
                out.truncate(kept);
            }
            out.push(c);
            continue;
        }

        match deunicode::deunicode_char(c).map(str::trim).filter(|s| !s.is_empty()) {
            Some(syllable) => {
                out.push_str(&syllable.to_lowercase());
                out.push(' ');
                transliterated = true;
            }
            None => out.push(c),
        }
    }

    transliterated.then(|| out.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_han_to_pinyin() {
        assert_eq!(romanize("你好世界").as_deref(), Some("ni hao shi jie"));
    }

    #[test]
    fn test_no_space_before_punctuation() {
        assert_eq!(romanize("你好，世界").as_deref(), Some("ni hao，shi jie"));
        assert_eq!(romanize("你好!").as_deref(), Some("ni hao!"));
    }

    #[test]
    fn test_no_han_is_none() {
        assert_eq!(romanize("hello"), None);
    }
}
