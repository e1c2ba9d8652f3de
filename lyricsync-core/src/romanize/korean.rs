//! Hangul to Revised Romanization, with the final-consonant assimilation
//! rules applied against the initial of the following syllable.

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const JUNG_COUNT: u32 = 21;
const JONG_COUNT: u32 = 28;

#[rustfmt::skip]
const CHO: [&str; 19] = [
    "g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s",
    "ss", "", "j", "jj", "ch", "k", "t", "p", "h",
];

#[rustfmt::skip]
const JUNG: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa",
    "wae", "oe", "yo", "u", "wo", "we", "wi", "yu", "eu", "eui", "i",
];

/// Choseong indices that change how the preceding final is pronounced
const CHO_G: usize = 0;
const CHO_N: usize = 2;
const CHO_R: usize = 5;
const CHO_M: usize = 6;
const CHO_IEUNG: usize = 11;
const CHO_H: usize = 18;

/// Final consonant sounds, indexed by jongseong (1-based, 0 = none).
///
/// Column 0 is the standalone final. The other columns are the final merged
/// with the following initial (ㅇ, ㄴ, ㄹ, ㅁ, ㅎ), which replaces that
/// initial's own spelling.
#[rustfmt::skip]
const JONG: [[&str; 6]; 27] = [
    ["k", "g", "ngn", "ngn", "ngm", "kh"],    // ㄱ
    ["k", "kk", "ngn", "ngn", "ngm", "kh"],   // ㄲ
    ["k", "ks", "ngn", "ngn", "ngm", "kh"],   // ㄳ
    ["n", "n", "nn", "ll", "nm", "nh"],       // ㄴ
    ["n", "nj", "nn", "nn", "nm", "nch"],     // ㄵ
    ["n", "nh", "nn", "nn", "nm", "nh"],      // ㄶ
    ["t", "d", "nn", "nn", "nm", "th"],       // ㄷ
    ["l", "r", "ll", "ll", "lm", "lh"],       // ㄹ
    ["k", "lg", "ngn", "ngn", "ngm", "lkh"],  // ㄺ
    ["m", "lm", "mn", "mn", "mm", "lmh"],     // ㄻ
    ["p", "lb", "mn", "mn", "mm", "lph"],     // ㄼ
    ["t", "ls", "nn", "nn", "nm", "lsh"],     // ㄽ
    ["t", "lt", "nn", "nn", "nm", "lth"],     // ㄾ
    ["p", "lp", "mn", "mn", "mm", "lph"],     // ㄿ
    ["l", "lh", "ll", "ll", "lm", "lh"],      // ㅀ
    ["m", "m", "mn", "mn", "mm", "mh"],       // ㅁ
    ["p", "b", "mn", "mn", "mm", "ph"],       // ㅂ
    ["p", "ps", "mn", "mn", "mm", "psh"],     // ㅄ
    ["t", "s", "nn", "nn", "nm", "sh"],       // ㅅ
    ["t", "ss", "nn", "nn", "nm", "th"],      // ㅆ
    ["ng", "ng", "ngn", "ngn", "ngm", "ngh"], // ㅇ
    ["t", "j", "nn", "nn", "nm", "ch"],       // ㅈ
    ["t", "ch", "nn", "nn", "nm", "ch"],      // ㅊ
    ["k", "k", "ngn", "ngn", "ngm", "kh"],    // ㅋ
    ["t", "t", "nn", "nn", "nm", "th"],       // ㅌ
    ["p", "p", "mn", "mn", "mm", "ph"],       // ㅍ
    ["t", "h", "nn", "nn", "nm", "th"],       // ㅎ
];

/// Jongseong index of ㅎ, which merges with a following ㄱ
const JONG_H: usize = 27;

struct Syllable {
    cho: usize,
    jung: usize,
    jong: usize,
}

fn decompose(c: char) -> Option<Syllable> {
    let code = u32::from(c);
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return None;
    }
    let index = code - SYLLABLE_BASE;
    Some(Syllable {
        cho: usize::try_from(index / (JUNG_COUNT * JONG_COUNT)).ok()?,
        jung: usize::try_from((index % (JUNG_COUNT * JONG_COUNT)) / JONG_COUNT).ok()?,
        jong: usize::try_from(index % JONG_COUNT).ok()?,
    })
}

/// Sound of a final consonant given the next syllable's initial.
///
/// The flag is `true` when the returned spelling already covers that initial.
fn final_sound(jong: usize, next_cho: Option<usize>) -> (&'static str, bool) {
    let row = &JONG[jong - 1];
    match next_cho {
        Some(CHO_G) if jong == JONG_H => ("k", true),
        Some(CHO_IEUNG) => (row[1], true),
        Some(CHO_N) => (row[2], true),
        Some(CHO_R) => (row[3], true),
        Some(CHO_M) => (row[4], true),
        Some(CHO_H) => (row[5], true),
        _ => (row[0], false),
    }
}

/// Romanize a Korean line. Returns `None` if the line has no Hangul
/// syllables.
pub fn romanize(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len() * 2);
    let mut pending_final: Option<usize> = None;
    let mut transliterated = false;

    for c in text.chars() {
        if let Some(syllable) = decompose(c) {
            let mut initial_merged = false;
            if let Some(jong) = pending_final.take() {
                let (sound, merged) = final_sound(jong, Some(syllable.cho));
                out.push_str(sound);
                initial_merged = merged;
            }
            if !initial_merged {
                out.push_str(CHO[syllable.cho]);
            }
            out.push_str(JUNG[syllable.jung]);
            pending_final = (syllable.jong != 0).then_some(syllable.jong);
            transliterated = true;
        } else {
            if let Some(jong) = pending_final.take() {
                out.push_str(final_sound(jong, None).0);
            }
            out.push(c);
        }
    }

    if let Some(jong) = pending_final {
        out.push_str(final_sound(jong, None).0);
    }

    transliterated.then_some(out)
}
