use crate::error::{CoreError, Result};
use crate::romanize::{CyrillicLanguage, DEFAULT_CACHE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const LOG_TARGET: &str = "lyricsync::config";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsSyncConfig {
    #[serde(default)]
    pub romanization: RomanizationConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomanizationConfig {
    #[serde(default = "default_true")]
    pub japanese: bool,
    #[serde(default = "default_true")]
    pub korean: bool,
    #[serde(default)]
    pub chinese: bool,
    #[serde(default)]
    pub cyrillic: CyrillicConfig,
    /// Romanized lines remembered across tracks
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

const fn default_true() -> bool {
    true
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for RomanizationConfig {
    fn default() -> Self {
        Self {
            japanese: true,
            korean: true,
            chinese: false,
            cyrillic: CyrillicConfig::default(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Cyrillic languages to romanize.
///
/// With `by_line` unset the language is detected once for the whole
/// document, so a line shared by several alphabets follows the rest of the
/// song. With `by_line` set every line is detected on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CyrillicConfig {
    #[serde(default)]
    pub russian: bool,
    #[serde(default)]
    pub ukrainian: bool,
    #[serde(default)]
    pub serbian: bool,
    #[serde(default)]
    pub bulgarian: bool,
    #[serde(default)]
    pub belarusian: bool,
    #[serde(default)]
    pub kyrgyz: bool,
    #[serde(default)]
    pub macedonian: bool,
    #[serde(default)]
    pub by_line: bool,
}

impl CyrillicConfig {
    #[must_use]
    pub const fn enabled(&self, language: CyrillicLanguage) -> bool {
        match language {
            CyrillicLanguage::Russian => self.russian,
            CyrillicLanguage::Ukrainian => self.ukrainian,
            CyrillicLanguage::Serbian => self.serbian,
            CyrillicLanguage::Bulgarian => self.bulgarian,
            CyrillicLanguage::Belarusian => self.belarusian,
            CyrillicLanguage::Kyrgyz => self.kyrgyz,
            CyrillicLanguage::Macedonian => self.macedonian,
        }
    }

    #[must_use]
    pub fn any_enabled(&self) -> bool {
        CyrillicLanguage::ALL.into_iter().any(|language| self.enabled(language))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_true")]
    pub auto_scroll: bool,
    #[serde(default = "default_true")]
    pub tap_to_seek: bool,
    /// How long manual scrolling holds off auto-follow
    #[serde(default = "default_preview_window")]
    pub preview_window_ms: u64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub durations: ScrollDurations,
}

const fn default_preview_window() -> u64 {
    2000
}

const fn default_tick_interval() -> u64 {
    50
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            tap_to_seek: true,
            preview_window_ms: default_preview_window(),
            tick_interval_ms: default_tick_interval(),
            durations: ScrollDurations::default(),
        }
    }
}

impl ScrollConfig {
    #[must_use]
    pub const fn preview_window(&self) -> Duration {
        Duration::from_millis(self.preview_window_ms)
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Animation length hints attached to each scroll intent. The renderer owns
/// the easing; these only classify how fast a move should feel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollDurations {
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,
    #[serde(default = "default_auto_follow_ms")]
    pub auto_follow_ms: u64,
    #[serde(default = "default_fast_seek_ms")]
    pub fast_seek_ms: u64,
}

const fn default_initial_ms() -> u64 {
    800
}

const fn default_auto_follow_ms() -> u64 {
    1500
}

const fn default_fast_seek_ms() -> u64 {
    500
}

impl Default for ScrollDurations {
    fn default() -> Self {
        Self {
            initial_ms: default_initial_ms(),
            auto_follow_ms: default_auto_follow_ms(),
            fast_seek_ms: default_fast_seek_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

const fn default_max_lines() -> usize {
    5
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `~/.config/lyricsync/lyricsync.log`
    #[serde(default)]
    pub enabled: bool,
}

/// User preferences read by the engine components.
///
/// Romanization flags are read when a document is loaded, scroll flags every
/// time the controller decides whether to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Preferences {
    pub romanize_japanese: bool,
    pub romanize_korean: bool,
    pub romanize_chinese: bool,
    pub cyrillic: CyrillicConfig,
    pub auto_scroll: bool,
    pub tap_to_seek: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        LyricsSyncConfig::default().preferences()
    }
}

impl LyricsSyncConfig {
    /// Get the config file path (~/.config/lyricsync/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default path, writing the template on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or fails
    /// validation.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Load config from `path`, writing the template there if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or fails
    /// validation.
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, CONFIG_TEMPLATE)?;
            info!(target: LOG_TARGET, "Wrote default config to {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.scroll.tick_interval_ms == 0 {
            return Err(invalid("scroll.tick_interval_ms must be greater than 0"));
        }
        if self.romanization.cache_capacity == 0 {
            return Err(invalid("romanization.cache_capacity must be greater than 0"));
        }
        if self.selection.max_lines == 0 {
            return Err(invalid("selection.max_lines must be greater than 0"));
        }
        let durations = &self.scroll.durations;
        if durations.fast_seek_ms >= durations.auto_follow_ms {
            return Err(invalid(
                "scroll.durations.fast_seek_ms must be shorter than auto_follow_ms",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn preferences(&self) -> Preferences {
        Preferences {
            romanize_japanese: self.romanization.japanese,
            romanize_korean: self.romanization.korean,
            romanize_chinese: self.romanization.chinese,
            cyrillic: self.romanization.cyrillic,
            auto_scroll: self.scroll.auto_scroll,
            tap_to_seek: self.scroll.tap_to_seek,
        }
    }
}

fn invalid(message: &str) -> CoreError {
    CoreError::ConfigInvalid {
        message: message.to_string(),
    }
}

/// Template written on first run
pub const CONFIG_TEMPLATE: &str = r#"# Lyricsync Configuration
# ~/.config/lyricsync/config.toml

[romanization]
# Show a Latin transliteration under lines in these scripts
japanese = true
korean = true
chinese = false
# Romanized lines remembered across tracks
cache_capacity = 512

[romanization.cyrillic]
russian = false
ukrainian = false
serbian = false
bulgarian = false
belarusian = false
kyrgyz = false
macedonian = false
# Detect the language of each line instead of the whole song
by_line = false

[scroll]
auto_scroll = true
# Tapping a line seeks playback to it
tap_to_seek = true
# How long a manual scroll holds off auto-follow
preview_window_ms = 2000
# How often the playback position is sampled
tick_interval_ms = 50

[scroll.durations]
initial_ms = 800
auto_follow_ms = 1500
fast_seek_ms = 500  # must be shorter than auto_follow_ms

[selection]
# Maximum number of lines that can be selected for sharing
max_lines = 5

[logging]
# Also write logs to ~/.config/lyricsync/lyricsync.log
enabled = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = LyricsSyncConfig::from_toml(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, LyricsSyncConfig::default());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LyricsSyncConfig::from_toml("").unwrap();
        assert!(config.romanization.japanese);
        assert!(!config.romanization.cyrillic.any_enabled());
        assert_eq!(config.romanization.cache_capacity, 512);
        assert_eq!(config.scroll.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.selection.max_lines, 5);
    }

    #[test]
    fn test_partial_section() {
        let config = LyricsSyncConfig::from_toml("[scroll]\nauto_scroll = false\n").unwrap();
        assert!(!config.scroll.auto_scroll);
        assert!(config.scroll.tap_to_seek);
        assert_eq!(config.scroll.preview_window_ms, 2000);
        assert!(!config.preferences().auto_scroll);
    }

    #[test]
    fn test_cyrillic_section() {
        let toml = "[romanization.cyrillic]\nukrainian = true\nby_line = true\n";
        let prefs = LyricsSyncConfig::from_toml(toml).unwrap().preferences();
        assert!(prefs.cyrillic.enabled(CyrillicLanguage::Ukrainian));
        assert!(!prefs.cyrillic.enabled(CyrillicLanguage::Russian));
        assert!(prefs.cyrillic.by_line);
        assert!(prefs.cyrillic.any_enabled());
    }

    #[test]
    fn test_zero_cache_capacity_rejected() {
        let err = LyricsSyncConfig::from_toml("[romanization]\ncache_capacity = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let err = LyricsSyncConfig::from_toml("[scroll]\ntick_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_zero_selection_rejected() {
        let err = LyricsSyncConfig::from_toml("[selection]\nmax_lines = 0\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_duration_order_rejected() {
        let toml = "[scroll.durations]\nfast_seek_ms = 2000\nauto_follow_ms = 1000\n";
        let err = LyricsSyncConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = LyricsSyncConfig::from_toml("[scroll\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParseError(_)));
    }

    #[test]
    fn test_load_or_create_writes_template() {
        let dir = std::env::temp_dir().join(format!("lyricsync-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        let config = LyricsSyncConfig::load_or_create_at(&path).unwrap();
        assert_eq!(config, LyricsSyncConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        fs::write(&path, "[selection]\nmax_lines = 3\n").unwrap();
        let config = LyricsSyncConfig::load_or_create_at(&path).unwrap();
        assert_eq!(config.selection.max_lines, 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
