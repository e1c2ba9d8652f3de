//! Cyrillic to Latin.
//!
//! A general table covers every Cyrillic alphabet; each language layers its
//! own letter overrides and spelling rules on top of it. Detection picks the
//! first enabled language whose alphabet contains every Cyrillic letter of
//! the text, in [`CyrillicLanguage::ALL`] order.

use serde::Serialize;
use std::fmt;

/// Separators that start a new word besides whitespace
const WORD_BREAKS: &str = ".,!?;";

const VOWELS: &str = "аеєиіїоуюяыэ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyrillicLanguage {
    Russian,
    Ukrainian,
    Serbian,
    Bulgarian,
    Belarusian,
    Kyrgyz,
    Macedonian,
}

impl CyrillicLanguage {
    /// Detection priority
    pub const ALL: [Self; 7] = [
        Self::Russian,
        Self::Ukrainian,
        Self::Serbian,
        Self::Bulgarian,
        Self::Belarusian,
        Self::Kyrgyz,
        Self::Macedonian,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Russian => "russian",
            Self::Ukrainian => "ukrainian",
            Self::Serbian => "serbian",
            Self::Bulgarian => "bulgarian",
            Self::Belarusian => "belarusian",
            Self::Kyrgyz => "kyrgyz",
            Self::Macedonian => "macedonian",
        }
    }

    /// Lowercase alphabet
    const fn alphabet(self) -> &'static str {
        match self {
            Self::Russian => "абвгдеёжзийклмнопрстуфхцчшщъыьэюя",
            Self::Ukrainian => "абвгґдеєжзиіїйклмнопрстуфхцчшщьюя",
            Self::Serbian => "абвгдђежзијклљмнњопрстћуфхцчџш",
            Self::Bulgarian => "абвгдежзийклмнопрстуфхцчшщъьюя",
            Self::Belarusian => "абвгдеёжзійклмнопрстуўфхцчшьюяыэ",
            Self::Kyrgyz => "абвгдеёжзийклмнңоөпрстуүфхцчшщъыьэюя",
            Self::Macedonian => "абвгдѓежзѕијклљмнњопрстќуфхцчџш",
        }
    }

    /// Whether every Cyrillic letter of `text` belongs to this alphabet.
    /// Text without Cyrillic letters matches no language.
    #[must_use]
    pub fn matches(self, text: &str) -> bool {
        let alphabet = self.alphabet();
        let mut any = false;
        for c in text.chars().filter(|c| is_cyrillic(*c)) {
            if !alphabet.contains(lowercase(c)) {
                return false;
            }
            any = true;
        }
        any
    }

    /// First language accepted by `enabled` that matches `text`.
    pub fn detect(text: &str, enabled: impl Fn(Self) -> bool) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|language| enabled(*language) && language.matches(text))
    }

    const fn overrides(self) -> &'static [(char, &'static str)] {
        match self {
            Self::Russian => &[],
            Self::Ukrainian => UKRAINIAN,
            Self::Serbian => SERBIAN,
            Self::Bulgarian => BULGARIAN,
            Self::Belarusian => BELARUSIAN,
            Self::Kyrgyz => KYRGYZ,
            Self::Macedonian => MACEDONIAN,
        }
    }

    fn upper(self, c: char) -> Option<&'static str> {
        lookup(self.overrides(), c).or_else(|| lookup(GENERAL, c))
    }

    fn transliterate(self, c: char) -> Option<String> {
        if let Some(latin) = self.upper(c) {
            return Some(latin.to_string());
        }
        let capital = c.to_uppercase().next()?;
        self.upper(capital).map(str::to_lowercase)
    }

    /// Word-initial `е` is written `ye`
    const fn iotates_initial_ye(self) -> bool {
        matches!(self, Self::Russian | Self::Belarusian)
    }
}

impl fmt::Display for CyrillicLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

fn lowercase(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_word_break(c: char) -> bool {
    c.is_whitespace() || WORD_BREAKS.contains(c)
}

fn lookup(table: &[(char, &'static str)], c: char) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == c).map(|(_, latin)| *latin)
}

/// Uppercase letters only; lowercase goes through the capital form
#[rustfmt::skip]
const GENERAL: &[(char, &str)] = &[
    ('А', "A"), ('Б', "B"), ('В', "V"), ('Г', "G"), ('Ґ', "G"), ('Д', "D"),
    ('Ѓ', "Ǵ"), ('Ђ', "Đ"), ('Е', "E"), ('Ё', "Yo"), ('Є', "Ye"), ('Ж', "Zh"),
    ('З', "Z"), ('Ѕ', "Dz"), ('И', "I"), ('І', "I"), ('Ї', "Yi"), ('Й', "Y"),
    ('Ј', "Y"), ('К', "K"), ('Л', "L"), ('Љ', "Ly"), ('М', "M"), ('Н', "N"),
    ('Њ', "Ny"), ('О', "O"), ('П', "P"), ('Р', "R"), ('С', "S"), ('Т', "T"),
    ('Ћ', "Ć"), ('У', "U"), ('Ў', "Ŭ"), ('Ф', "F"), ('Х', "Kh"), ('Ц', "Ts"),
    ('Ч', "Ch"), ('Џ', "Dž"), ('Ш', "Sh"), ('Щ', "Shch"), ('Ъ', "ʺ"), ('Ы', "Y"),
    ('Ь', "ʹ"), ('Э', "E"), ('Ю', "Yu"), ('Я', "Ya"),
    ('Ѡ', "O"), ('Ѣ', "Ya"), ('Ѥ', "Ye"), ('Ѧ', "Ya"), ('Ѩ', "Ya"),
    ('Ѫ', "U"), ('Ѭ', "Yu"), ('Ѯ', "Ks"), ('Ѱ', "Ps"), ('Ѳ', "F"),
    ('Ѵ', "I"), ('Ѷ', "I"), ('Ғ', "Gh"), ('Ҕ', "G"), ('Җ', "Zh"),
    ('Ҙ', "Dz"), ('Қ', "Q"), ('Ҝ', "K"), ('Ҟ', "K"), ('Ҡ', "K"),
    ('Ң', "Ng"), ('Ҥ', "Ng"), ('Ҧ', "P"), ('Ҩ', "O"), ('Ҫ', "S"),
    ('Ҭ', "T"), ('Ү', "U"), ('Ұ', "U"), ('Ҳ', "Kh"), ('Ҵ', "Ts"),
    ('Ҷ', "Ch"), ('Ҹ', "Ch"), ('Һ', "H"), ('Ҽ', "Ch"), ('Ҿ', "Ch"),
    ('Ќ', "Ḱ"), ('Ө', "Ö"),
];

const UKRAINIAN: &[(char, &str)] = &[('Г', "H"), ('Ґ', "G")];

#[rustfmt::skip]
const SERBIAN: &[(char, &str)] = &[
    ('Ж', "Ž"), ('Љ', "Lj"), ('Њ', "Nj"), ('Ц', "C"), ('Ч', "Č"), ('Ш', "Š"), ('Х', "H"),
];

const BULGARIAN: &[(char, &str)] = &[('Щ', "Sht"), ('Ъ', "A"), ('Ь', "Y")];

const BELARUSIAN: &[(char, &str)] = &[('Г', "H"), ('Ў', "W")];

const KYRGYZ: &[(char, &str)] = &[('Ү', "Ü")];

#[rustfmt::skip]
const MACEDONIAN: &[(char, &str)] = &[
    ('Ѓ', "Gj"), ('Ј', "J"), ('Љ', "Lj"), ('Њ', "Nj"), ('Ќ', "Kj"),
    ('Ч', "Č"), ('Ц', "C"), ('Х', "H"),
];

/// Russian genitive `-ого`/`-его` is pronounced with `v`
fn russian_trigraph(chars: &[char]) -> Option<&'static str> {
    match chars {
        ['о', 'г', 'о', ..] => Some("ovo"),
        ['О', 'г', 'о', ..] => Some("Ovo"),
        ['е', 'г', 'о', ..] => Some("evo"),
        ['Е', 'г', 'о', ..] => Some("Evo"),
        _ => None,
    }
}

/// Ukrainian `ю`/`я` after a consonant are written `iu`/`ia`
fn ukrainian_soft_vowel(c: char, previous: Option<char>) -> Option<&'static str> {
    let after_consonant =
        previous.is_some_and(|p| p.is_alphabetic() && !VOWELS.contains(lowercase(p)));
    if !after_consonant {
        return None;
    }
    match c {
        'Ю' => Some("Iu"),
        'ю' => Some("iu"),
        'Я' => Some("Ia"),
        'я' => Some("ia"),
        _ => None,
    }
}

/// Romanize a line as `language`. Returns `None` when there is nothing worth
/// transliterating, including a lone `е` inside otherwise Latin text.
pub fn romanize(language: CyrillicLanguage, text: &str) -> Option<String> {
    let cyrillic: Vec<char> = text.chars().filter(|c| is_cyrillic(*c)).collect();
    match cyrillic.as_slice() {
        [] | ['е' | 'Е'] => return None,
        _ => {}
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let previous = i.checked_sub(1).map(|p| chars[p]);
        let word_start = previous.is_none_or(is_word_break);

        if language == CyrillicLanguage::Russian {
            if let Some(latin) = russian_trigraph(&chars[i..]) {
                out.push_str(latin);
                i += 3;
                continue;
            }
        }

        let special = match c {
            'е' if word_start && language.iotates_initial_ye() => Some("ye"),
            'Е' if word_start && language.iotates_initial_ye() => Some("Ye"),
            _ if language == CyrillicLanguage::Ukrainian => ukrainian_soft_vowel(c, previous),
            _ => None,
        };

        match special {
            Some(latin) => out.push_str(latin),
            None => match language.transliterate(c) {
                Some(latin) => out.push_str(&latin),
                None => out.push(c),
            },
        }
        i += 1;
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_any(text: &str) -> Option<CyrillicLanguage> {
        CyrillicLanguage::detect(text, |_| true)
    }

    #[test]
    fn test_detection_priority() {
        assert_eq!(detect_any("Привет мир"), Some(CyrillicLanguage::Russian));
        assert_eq!(detect_any("Їжак гора"), Some(CyrillicLanguage::Ukrainian));
        assert_eq!(detect_any("Љубав шума"), Some(CyrillicLanguage::Serbian));
        assert_eq!(detect_any("Ўсё добра"), Some(CyrillicLanguage::Belarusian));
        assert_eq!(detect_any("Күн жаркын"), Some(CyrillicLanguage::Kyrgyz));
        assert_eq!(detect_any("Ѓердан ѕвезда"), Some(CyrillicLanguage::Macedonian));
        assert_eq!(detect_any("Hello"), None);
    }

    #[test]
    fn test_detection_skips_disabled_languages() {
        // Every letter is also Bulgarian
        let bulgarian = CyrillicLanguage::detect("щастие", |l| l != CyrillicLanguage::Russian);
        assert_eq!(bulgarian, Some(CyrillicLanguage::Bulgarian));
        assert_eq!(CyrillicLanguage::detect("щастие", |_| false), None);
    }

    #[test]
    fn test_russian() {
        let ru = CyrillicLanguage::Russian;
        assert_eq!(romanize(ru, "Привет мир").as_deref(), Some("Privet mir"));
        assert_eq!(romanize(ru, "щука").as_deref(), Some("shchuka"));
        assert_eq!(romanize(ru, "ехать").as_deref(), Some("yekhatʹ"));
        assert_eq!(romanize(ru, "его нового").as_deref(), Some("evo novovo"));
    }

    #[test]
    fn test_ukrainian() {
        let uk = CyrillicLanguage::Ukrainian;
        assert_eq!(romanize(uk, "Їжак гора").as_deref(), Some("Yizhak hora"));
        assert_eq!(romanize(uk, "Європа ера").as_deref(), Some("Yevropa era"));
        assert_eq!(romanize(uk, "пісня моя").as_deref(), Some("pisnia moya"));
    }

    #[test]
    fn test_serbian_and_macedonian() {
        assert_eq!(
            romanize(CyrillicLanguage::Serbian, "Љубав шума").as_deref(),
            Some("Ljubav šuma")
        );
        assert_eq!(
            romanize(CyrillicLanguage::Macedonian, "ѓердан ќе").as_deref(),
            Some("gjerdan kje")
        );
    }

    #[test]
    fn test_bulgarian_belarusian_kyrgyz() {
        assert_eq!(
            romanize(CyrillicLanguage::Bulgarian, "щастие").as_deref(),
            Some("shtastie")
        );
        assert_eq!(
            romanize(CyrillicLanguage::Bulgarian, "сън").as_deref(),
            Some("san")
        );
        assert_eq!(
            romanize(CyrillicLanguage::Belarusian, "горад ўсё").as_deref(),
            Some("horad wsyo")
        );
        assert_eq!(
            romanize(CyrillicLanguage::Kyrgyz, "күн").as_deref(),
            Some("kün")
        );
    }

    #[test]
    fn test_lone_ye_is_skipped() {
        assert_eq!(romanize(CyrillicLanguage::Russian, "Hello е world"), None);
        assert_eq!(romanize(CyrillicLanguage::Russian, "Hello"), None);
    }
}
