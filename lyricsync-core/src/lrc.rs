//! Lyrics text parsing.
//!
//! Raw lyrics arrive either timestamp-tagged (LRC) or as plain text. Parsing
//! is pure and total: malformed tags are skipped one at a time and never
//! abort the rest of the document.

use crate::document::{
    LrcMetadata, LyricLine, LyricWord, LyricsDocument, LyricsMode, PLAIN_LINE_STEP_MS,
};
use std::time::Duration;

/// Marker the lyrics source stores when a track has no lyrics.
pub const LYRICS_NOT_FOUND: &str = "LYRICS_NOT_FOUND";

/// Parse raw lyrics text into a document
#[must_use]
pub fn parse(raw: &str) -> LyricsDocument {
    let trimmed = raw.trim();

    if trimmed == LYRICS_NOT_FOUND {
        return LyricsDocument::not_found();
    }
    if trimmed.is_empty() {
        return LyricsDocument::empty(LyricsMode::Plain);
    }
    if trimmed.starts_with('[') {
        parse_synced(trimmed)
    } else {
        parse_plain(trimmed)
    }
}

fn parse_plain(text: &str) -> LyricsDocument {
    let mut step = 0_i64;
    let lines = text
        .lines()
        .map(|line| {
            let entry = LyricLine::new(step, line);
            step += PLAIN_LINE_STEP_MS;
            entry
        })
        .collect();

    LyricsDocument {
        mode: LyricsMode::Plain,
        metadata: LrcMetadata::default(),
        lines,
    }
}

fn parse_synced(text: &str) -> LyricsDocument {
    let mut metadata = LrcMetadata::default();
    let mut lines: Vec<LyricLine> = Vec::new();
    let physical: Vec<&str> = text.lines().map(str::trim).collect();

    for (i, line) in physical.iter().enumerate() {
        if line.is_empty() || is_word_timing_line(line) {
            continue;
        }

        if let Some(parsed) = parse_lyric_line(line) {
            // A word timing line applies to every entry of the line above it
            let words = physical
                .get(i + 1)
                .filter(|next| is_word_timing_line(next))
                .and_then(|next| parse_word_timestamps(&next[1..next.len() - 1]));

            match words {
                Some(words) => {
                    lines.extend(parsed.into_iter().map(|l| l.with_words(words.clone())));
                }
                None => lines.extend(parsed),
            }
            continue;
        }

        if let Some((tag, value)) = parse_id_tag(line) {
            match tag.to_lowercase().as_str() {
                "ti" => metadata.title = Some(value),
                "ar" => metadata.artist = Some(value),
                "al" => metadata.album = Some(value),
                "au" => metadata.author = Some(value),
                "length" => metadata.length = parse_duration_tag(&value),
                "offset" => {
                    if let Ok(offset) = value.parse::<i64>() {
                        metadata.offset_ms = offset;
                    }
                }
                _ => {} // Ignore unknown tags
            }
        }
    }

    if metadata.offset_ms != 0 {
        for line in &mut lines {
            line.start_time_ms = line.start_time_ms.saturating_add(metadata.offset_ms).max(0);
        }
    }

    // Stable: entries sharing a timestamp keep document order
    lines.sort_by_key(|l| l.start_time_ms);
    lines.insert(0, LyricLine::sentinel());

    LyricsDocument {
        mode: LyricsMode::Synced,
        metadata,
        lines,
    }
}

/// Parse a lyric line like `[00:12.34]Hello` or `[00:05.00][00:15.00]Chorus`.
///
/// Returns `None` if the line carries no valid timestamp.
fn parse_lyric_line(line: &str) -> Option<Vec<LyricLine>> {
    let mut remaining = line;
    let mut timestamps = Vec::new();

    while remaining.starts_with('[') {
        let Some(end) = remaining.find(']') else {
            break;
        };
        let content = &remaining[1..end];
        if !looks_like_timestamp(content) {
            break;
        }
        // Malformed tags are dropped individually
        if let Some(ms) = parse_timestamp(content) {
            timestamps.push(ms);
        }
        // Tags may be separated by blanks
        remaining = remaining[end + 1..].trim_start_matches([' ', '\t']);
    }

    if timestamps.is_empty() {
        return None;
    }

    let text = remaining.trim();
    Some(
        timestamps
            .into_iter()
            .map(|ms| LyricLine::new(ms, text))
            .collect(),
    )
}

fn looks_like_timestamp(content: &str) -> bool {
    content.contains(':')
        && content
            .chars()
            .all(|c| c.is_ascii_digit() || c == ':' || c == '.')
}

/// Parse a timestamp like `mm:ss.xx`, `mm:ss.xxx`, `mm:ss` or `mm:ss:xx`
/// into milliseconds.
fn parse_timestamp(s: &str) -> Option<i64> {
    let parts: Vec<&str> = s.split(':').collect();

    match parts.as_slice() {
        [minutes, seconds] => {
            let minutes: i64 = parse_digits(minutes)?;
            let (whole, fraction) = match seconds.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (*seconds, None),
            };
            let seconds: i64 = parse_digits(whole)?;
            let millis = match fraction {
                Some(fraction) => parse_fraction_ms(fraction)?,
                None => 0,
            };
            Some(minutes * 60_000 + seconds * 1000 + millis)
        }
        [minutes, seconds, hundredths] => {
            let minutes: i64 = parse_digits(minutes)?;
            let seconds: i64 = parse_digits(seconds)?;
            let hundredths: i64 = parse_digits(hundredths)?;
            if hundredths >= 100 {
                return None;
            }
            Some(minutes * 60_000 + seconds * 1000 + hundredths * 10)
        }
        _ => None,
    }
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || s.len() > 9 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `.5` is 500ms, `.50` is 500ms, `.500` is 500ms. Digits past the third are
/// truncated.
fn parse_fraction_ms(fraction: &str) -> Option<i64> {
    let digits = fraction.get(..fraction.len().min(3))?;
    let value = parse_digits(digits)?;
    Some(match digits.len() {
        1 => value * 100,
        2 => value * 10,
        _ => value,
    })
}

/// Parse an ID tag like `[ti:Title]` or `[ar:Artist]`
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    if !line.starts_with('[') {
        return None;
    }

    let end = line.find(']')?;
    let content = &line[1..end];
    let (tag, value) = content.split_once(':')?;

    // If the tag part looks like a number, it's a timestamp, not an ID tag
    if tag.is_empty() || tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some((tag.trim().to_string(), value.trim().to_string()))
}

/// Parse a duration string like "mm:ss" or "mm:ss.xx"
fn parse_duration_tag(s: &str) -> Option<Duration> {
    let ms = parse_timestamp(s.trim())?;
    u64::try_from(ms).ok().map(Duration::from_millis)
}

fn is_word_timing_line(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('<') && line.ends_with('>')
}

/// Parse `word:start:end|word:start:end|...` with times in seconds.
///
/// Any malformed entry invalidates the whole word line.
fn parse_word_timestamps(data: &str) -> Option<Vec<LyricWord>> {
    if data.trim().is_empty() {
        return None;
    }

    data.split('|')
        .map(|entry| {
            // Words may contain ':' themselves, so split from the right
            let mut parts = entry.rsplitn(3, ':');
            let end_secs: f64 = parts.next()?.trim().parse().ok()?;
            let start_secs: f64 = parts.next()?.trim().parse().ok()?;
            let text = parts.next()?.to_string();
            Some(LyricWord {
                text,
                start_secs,
                end_secs,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SENTINEL_START_MS;

    fn times(doc: &LyricsDocument) -> Vec<i64> {
        doc.lines.iter().map(|l| l.start_time_ms).collect()
    }

    fn texts(doc: &LyricsDocument) -> Vec<&str> {
        doc.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_parse_synced_with_sentinel() {
        let doc = parse("[00:01.00]Hello\n[00:03.50]World");
        assert_eq!(doc.mode, LyricsMode::Synced);
        assert_eq!(times(&doc), vec![SENTINEL_START_MS, 1000, 3500]);
        assert_eq!(texts(&doc), vec!["", "Hello", "World"]);
    }

    #[test]
    fn test_parse_plain_fallback() {
        let doc = parse("Line A\nLine B");
        assert_eq!(doc.mode, LyricsMode::Plain);
        assert_eq!(times(&doc), vec![0, 100]);
        assert_eq!(texts(&doc), vec!["Line A", "Line B"]);
    }

    #[test]
    fn test_parse_not_found_marker() {
        let doc = parse(LYRICS_NOT_FOUND);
        assert_eq!(doc.mode, LyricsMode::NotFound);
        assert!(doc.lines.is_empty());
    }

    #[test]
    fn test_parse_blank_is_empty_not_not_found() {
        let doc = parse("  \n\t ");
        assert_eq!(doc.mode, LyricsMode::Plain);
        assert!(doc.lines.is_empty());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = "[00:05.00][00:15.00]Chorus\n[00:10.00]Verse\n[bad]x";
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn test_parse_multi_timestamp_line_sorted() {
        let doc = parse("[00:05.00][00:15.00]Repeated lyric\n[00:10.00]Middle");
        assert_eq!(times(&doc), vec![SENTINEL_START_MS, 5000, 10000, 15000]);
        assert_eq!(
            texts(&doc),
            vec!["", "Repeated lyric", "Middle", "Repeated lyric"]
        );
    }

    #[test]
    fn test_blank_between_tags() {
        let doc = parse("[00:01.00] [00:02.00]Hello\n[00:03.00]World");
        assert_eq!(times(&doc), vec![SENTINEL_START_MS, 1000, 2000, 3000]);
        assert_eq!(texts(&doc), vec!["", "Hello", "Hello", "World"]);
    }

    #[test]
    fn test_sorted_order_invariant() {
        let doc = parse("[01:00.00]c\n[00:30.00]b\n[00:30.00]b2\n[00:00.10]a");
        assert!(doc
            .lines
            .windows(2)
            .all(|w| w[0].start_time_ms <= w[1].start_time_ms));
        // Ties keep document order
        assert_eq!(texts(&doc), vec!["", "a", "b", "b2", "c"]);
    }

    #[test]
    fn test_malformed_tag_skipped_individually() {
        let doc = parse("[00:01.00][00:99:999]Hello\n[00:02.00]World");
        assert_eq!(times(&doc), vec![SENTINEL_START_MS, 1000, 2000]);
    }

    #[test]
    fn test_line_without_valid_tags_dropped() {
        let doc = parse("[00:01.00]Hello\n[xx:yy]garbage\nno tag here\n[00:02.00]World");
        assert_eq!(texts(&doc), vec!["", "Hello", "World"]);
    }

    #[test]
    fn test_empty_synced_line_is_kept() {
        let doc = parse("[00:01.00]Hello\n[00:02.00]\n[00:03.00]World");
        assert_eq!(texts(&doc), vec!["", "Hello", "", "World"]);
    }

    #[test]
    fn test_timestamp_forms() {
        assert_eq!(parse_timestamp("00:12.34"), Some(12_340));
        assert_eq!(parse_timestamp("00:12.345"), Some(12_345));
        assert_eq!(parse_timestamp("01:02"), Some(62_000));
        assert_eq!(parse_timestamp("00:12:34"), Some(12_340));
        assert_eq!(parse_timestamp("00:12.5"), Some(12_500));
        assert_eq!(parse_timestamp("12.34"), None);
        assert_eq!(parse_timestamp("a:12.34"), None);
        assert_eq!(parse_timestamp("00:.34"), None);
    }

    #[test]
    fn test_parse_id_tags() {
        let input = "[ti:Song Title]\n[ar:Artist Name]\n[al:Album Name]\n[length:03:25]\n[00:05.00]Lyrics here";
        let doc = parse(input);
        assert_eq!(doc.metadata.title, Some("Song Title".to_string()));
        assert_eq!(doc.metadata.artist, Some("Artist Name".to_string()));
        assert_eq!(doc.metadata.album, Some("Album Name".to_string()));
        assert_eq!(doc.metadata.length, Some(Duration::from_secs(205)));
        assert_eq!(texts(&doc), vec!["", "Lyrics here"]);
    }

    #[test]
    fn test_parse_offset() {
        let doc = parse("[offset:500]\n[00:10.00]Test");
        assert_eq!(doc.lines[1].start_time_ms, 10_500);
        assert!(doc.lines[0].is_sentinel());
    }

    #[test]
    fn test_parse_negative_offset_clamps_at_zero() {
        let doc = parse("[offset:-1500]\n[00:01.00]Early\n[00:10.00]Test");
        assert_eq!(times(&doc), vec![SENTINEL_START_MS, 0, 8500]);
    }

    #[test]
    fn test_word_timestamps_attach_to_previous_line() {
        let input = "[00:01.00][00:09.00]Hello world\n<Hello:1.0:1.5|world:1.5:2.0>\n[00:03.00]Next";
        let doc = parse(input);
        let first = doc.lines[1].words.as_ref().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].text, "Hello");
        assert!((first[1].end_secs - 2.0).abs() < f64::EPSILON);
        assert!(doc.lines[2].words.is_none());
        assert_eq!(doc.lines[3].words.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_malformed_word_line_ignored() {
        let doc = parse("[00:01.00]Hello\n<Hello:abc:1.5>");
        assert_eq!(doc.lines.len(), 2);
        assert!(doc.lines[1].words.is_none());
    }

    #[test]
    fn test_parse_cjk_lyrics() {
        let doc = parse("[00:05.00]你好世界");
        assert_eq!(doc.lines[1].text, "你好世界");
    }
}
