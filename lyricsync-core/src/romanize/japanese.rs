//! Japanese to romaji.
//!
//! Lines are segmented with the IPADIC dictionary so kanji are read through
//! their dictionary reading. Each token becomes one space-separated word.

use lindera::dictionary::load_dictionary;
use lindera::mode::Mode;
use lindera::segmenter::Segmenter;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::warn;

const LOG_TARGET: &str = "lyricsync::romanize::japanese";

/// IPADIC detail column holding the katakana reading
const READING_FIELD: usize = 7;

static SEGMENTER: OnceLock<Option<Segmenter>> = OnceLock::new();

/// Two-kana combinations (yoon) checked before single kana
#[rustfmt::skip]
const DIGRAPHS: &[(&str, &str)] = &[
    ("キャ", "kya"), ("キュ", "kyu"), ("キョ", "kyo"),
    ("シャ", "sha"), ("シュ", "shu"), ("ショ", "sho"),
    ("チャ", "cha"), ("チュ", "chu"), ("チョ", "cho"),
    ("ニャ", "nya"), ("ニュ", "nyu"), ("ニョ", "nyo"),
    ("ヒャ", "hya"), ("ヒュ", "hyu"), ("ヒョ", "hyo"),
    ("ミャ", "mya"), ("ミュ", "myu"), ("ミョ", "myo"),
    ("リャ", "rya"), ("リュ", "ryu"), ("リョ", "ryo"),
    ("ギャ", "gya"), ("ギュ", "gyu"), ("ギョ", "gyo"),
    ("ジャ", "ja"), ("ジュ", "ju"), ("ジョ", "jo"),
    ("ヂャ", "ja"), ("ヂュ", "ju"), ("ヂョ", "jo"),
    ("ビャ", "bya"), ("ビュ", "byu"), ("ビョ", "byo"),
    ("ピャ", "pya"), ("ピュ", "pyu"), ("ピョ", "pyo"),
    ("ファ", "fa"), ("フィ", "fi"), ("フェ", "fe"), ("フォ", "fo"),
    ("ティ", "ti"), ("ディ", "di"), ("ウィ", "wi"), ("ウェ", "we"),
];

#[rustfmt::skip]
const SINGLE: &[(char, &str)] = &[
    ('ア', "a"), ('イ', "i"), ('ウ', "u"), ('エ', "e"), ('オ', "o"),
    ('カ', "ka"), ('キ', "ki"), ('ク', "ku"), ('ケ', "ke"), ('コ', "ko"),
    ('サ', "sa"), ('シ', "shi"), ('ス', "su"), ('セ', "se"), ('ソ', "so"),
    ('タ', "ta"), ('チ', "chi"), ('ツ', "tsu"), ('テ', "te"), ('ト', "to"),
    ('ナ', "na"), ('ニ', "ni"), ('ヌ', "nu"), ('ネ', "ne"), ('ノ', "no"),
    ('ハ', "ha"), ('ヒ', "hi"), ('フ', "fu"), ('ヘ', "he"), ('ホ', "ho"),
    ('マ', "ma"), ('ミ', "mi"), ('ム', "mu"), ('メ', "me"), ('モ', "mo"),
    ('ヤ', "ya"), ('ユ', "yu"), ('ヨ', "yo"),
    ('ラ', "ra"), ('リ', "ri"), ('ル', "ru"), ('レ', "re"), ('ロ', "ro"),
    ('ワ', "wa"), ('ヲ', "o"), ('ン', "n"),
    ('ガ', "ga"), ('ギ', "gi"), ('グ', "gu"), ('ゲ', "ge"), ('ゴ', "go"),
    ('ザ', "za"), ('ジ', "ji"), ('ズ', "zu"), ('ゼ', "ze"), ('ゾ', "zo"),
    ('ダ', "da"), ('ヂ', "ji"), ('ヅ', "zu"), ('デ', "de"), ('ド', "do"),
    ('バ', "ba"), ('ビ', "bi"), ('ブ', "bu"), ('ベ', "be"), ('ボ', "bo"),
    ('パ', "pa"), ('ピ', "pi"), ('プ', "pu"), ('ペ', "pe"), ('ポ', "po"),
    ('ヴ', "vu"),
    ('ァ', "a"), ('ィ', "i"), ('ゥ', "u"), ('ェ', "e"), ('ォ', "o"),
    ('ャ', "ya"), ('ュ', "yu"), ('ョ', "yo"),
    ('ー', ""), ('・', ""),
];

fn single(c: char) -> Option<&'static str> {
    SINGLE.iter().find(|(k, _)| *k == c).map(|(_, romaji)| *romaji)
}

fn segmenter() -> Option<&'static Segmenter> {
    SEGMENTER
        .get_or_init(|| match load_dictionary("embedded://ipadic") {
            Ok(dictionary) => Some(Segmenter::new(Mode::Normal, dictionary, None)),
            Err(e) => {
                warn!(target: LOG_TARGET, "Failed to load IPADIC dictionary: {}", e);
                None
            }
        })
        .as_ref()
}

/// Hiragana shares the Katakana layout, shifted by 0x60.
fn to_katakana(c: char) -> char {
    if ('\u{3041}'..='\u{3096}').contains(&c) {
        char::from_u32(u32::from(c) + 0x60).unwrap_or(c)
    } else {
        c
    }
}

/// Katakana reading of every non-blank token; unknown words keep their
/// surface form.
fn token_readings(text: &str) -> Option<Vec<Vec<char>>> {
    let segmenter = segmenter()?;
    let mut tokens = match segmenter.segment(Cow::Borrowed(text)) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(target: LOG_TARGET, "Failed to segment line: {}", e);
            return None;
        }
    };

    let readings = tokens
        .iter_mut()
        .filter(|token| !token.surface.trim().is_empty())
        .map(|token| {
            let reading = token
                .get_detail(READING_FIELD)
                .filter(|r| !r.is_empty() && *r != "*")
                .map(str::to_string);
            let reading = reading.unwrap_or_else(|| token.surface.to_string());
            reading.chars().map(to_katakana).collect()
        })
        .collect();
    Some(readings)
}

/// Transliterate one katakana reading. `next` is the first kana of the
/// following token, doubled by a trailing sokuon.
fn kana_to_romaji(kana: &[char], next: Option<char>, out: &mut String) -> bool {
    let mut transliterated = false;
    let mut i = 0;
    while i < kana.len() {
        if i + 1 < kana.len() {
            let pair: String = kana[i..=i + 1].iter().collect();
            if let Some((_, romaji)) = DIGRAPHS.iter().find(|(k, _)| *k == pair) {
                out.push_str(romaji);
                transliterated = true;
                i += 2;
                continue;
            }
        }

        let c = kana[i];
        if c == 'ッ' {
            // Sokuon doubles the next consonant
            let following = kana.get(i + 1).copied().or(next);
            if let Some(first) = following
                .and_then(single)
                .and_then(|romaji| romaji.chars().next())
                .filter(|f| !"aiueon".contains(*f))
            {
                out.push(first);
            }
            transliterated = true;
        } else if let Some(romaji) = single(c) {
            out.push_str(romaji);
            transliterated = true;
        } else {
            out.push(c);
        }
        i += 1;
    }
    transliterated
}

/// Romanize a Japanese line. Returns `None` if nothing was transliterated.
pub fn romanize(text: &str) -> Option<String> {
    let readings = token_readings(text)?;
    let mut words = Vec::with_capacity(readings.len());
    let mut transliterated = false;

    for (i, reading) in readings.iter().enumerate() {
        let next = readings.get(i + 1).and_then(|r| r.first().copied());
        let mut word = String::with_capacity(reading.len() * 2);
        transliterated |= kana_to_romaji(reading, next, &mut word);
        if !word.is_empty() {
            words.push(word);
        }
    }

    transliterated.then(|| words.join(" "))
}
