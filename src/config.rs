use crate::defaults;
use crate::error::{Result, SonareError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub cleaner: CleanerConfig,
    pub glossifier: GlossifierConfig,
    pub streamer: StreamerConfig,
}

/// Cleaner stage: live transcript → clean transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleanerConfig {
    pub source: PathBuf,
    pub out: PathBuf,
    pub poll_secs: f64,
    /// Flush a trailing fragment after this much silence (0 = never)
    pub idle_ms: u64,
    pub from_start: bool,
    pub echo: bool,
}

/// Glossifier stage: clean transcript → sign queue records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlossifierConfig {
    pub source: PathBuf,
    pub out: PathBuf,
    pub lexicon: PathBuf,
    pub poll_secs: f64,
    /// Flush an unterminated line after this much silence (0 = never)
    pub idle_ms: u64,
    pub tween_ms: u64,
    pub sentence_pause_ms: u64,
    pub rate: f64,
    pub from_start: bool,
    pub echo: bool,
}

/// Streamer stage: sign queue records → final asset queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamerConfig {
    pub source: PathBuf,
    pub out: PathBuf,
    pub poll_secs: f64,
    pub idle_ms: u64,
    pub from_start: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(defaults::LIVE_TRANSCRIPT_FILE),
            out: PathBuf::from(defaults::CLEAN_TRANSCRIPT_FILE),
            poll_secs: defaults::CLEANER_POLL_SECS,
            idle_ms: defaults::CLEANER_IDLE_MS,
            from_start: false,
            echo: true,
        }
    }
}

impl Default for GlossifierConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(defaults::CLEAN_TRANSCRIPT_FILE),
            out: PathBuf::from(defaults::SIGN_QUEUE_FILE),
            lexicon: PathBuf::from(defaults::LEXICON_FILE),
            poll_secs: defaults::GLOSSIFIER_POLL_SECS,
            idle_ms: defaults::SENTENCE_PAUSE_MS,
            tween_ms: defaults::TWEEN_MS,
            sentence_pause_ms: defaults::SENTENCE_PAUSE_MS,
            rate: defaults::PLAYBACK_RATE,
            from_start: false,
            echo: true,
        }
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(defaults::SIGN_QUEUE_FILE),
            out: PathBuf::from(defaults::FINAL_QUEUE_FILE),
            poll_secs: defaults::STREAMER_POLL_SECS,
            idle_ms: defaults::STREAMER_IDLE_MS,
            from_start: false,
        }
    }
}

/// Poll interval from seconds; callers validate before converting.
fn poll_duration(secs: f64, fallback: f64) -> Duration {
    Duration::try_from_secs_f64(secs)
        .or_else(|_| Duration::try_from_secs_f64(fallback))
        .unwrap_or(Duration::from_millis(100))
}

impl CleanerConfig {
    pub fn poll(&self) -> Duration {
        poll_duration(self.poll_secs, defaults::CLEANER_POLL_SECS)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    /// Sleep after each batch of new text.
    pub fn pacing(&self) -> Duration {
        self.poll()
            .min(Duration::from_millis(defaults::PACING_MAX_MS))
    }
}

impl GlossifierConfig {
    pub fn poll(&self) -> Duration {
        poll_duration(self.poll_secs, defaults::GLOSSIFIER_POLL_SECS)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}

impl StreamerConfig {
    pub fn poll(&self) -> Duration {
        poll_duration(self.poll_secs, defaults::STREAMER_POLL_SECS)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}

fn check_positive(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SonareError::ConfigInvalidValue {
            key: key.to_string(),
            message: format!("must be a finite number greater than 0, got {value}"),
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SonareError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                SonareError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(SonareError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SONARE_LEXICON → glossifier.lexicon
    /// - SONARE_RATE → glossifier.rate
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(lexicon) = std::env::var("SONARE_LEXICON")
            && !lexicon.is_empty()
        {
            self.glossifier.lexicon = PathBuf::from(lexicon);
        }

        if let Ok(rate) = std::env::var("SONARE_RATE")
            && !rate.is_empty()
        {
            match rate.parse::<f64>() {
                Ok(rate) => self.glossifier.rate = rate,
                Err(_) => warn!(value = %rate, "ignoring unparsable SONARE_RATE"),
            }
        }

        self
    }

    /// Reject values the stages cannot run with.
    pub fn validate(&self) -> Result<()> {
        check_positive("cleaner.poll_secs", self.cleaner.poll_secs)?;
        check_positive("glossifier.poll_secs", self.glossifier.poll_secs)?;
        check_positive("streamer.poll_secs", self.streamer.poll_secs)?;
        check_positive("glossifier.rate", self.glossifier.rate)?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SonareError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/sonare/config.toml on Linux, or a relative
    /// `sonare/config.toml` when no config directory is known.
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sonare")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_sonare_env() {
        remove_env("SONARE_LEXICON");
        remove_env("SONARE_RATE");
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.cleaner.source, PathBuf::from("live_transcript.txt"));
        assert_eq!(config.cleaner.out, PathBuf::from("clean_transcript.txt"));
        assert_eq!(config.cleaner.poll_secs, 0.1);
        assert_eq!(config.cleaner.idle_ms, 350);
        assert!(!config.cleaner.from_start);

        assert_eq!(config.glossifier.source, config.cleaner.out);
        assert_eq!(config.glossifier.poll_secs, 0.2);
        assert_eq!(config.glossifier.tween_ms, 100);
        assert_eq!(config.glossifier.sentence_pause_ms, 250);
        assert_eq!(config.glossifier.idle_ms, 250);
        assert_eq!(config.glossifier.rate, 1.0);

        assert_eq!(config.streamer.source, config.glossifier.out);
        assert_eq!(config.streamer.out, PathBuf::from("final_queue.txt"));
        assert_eq!(config.streamer.poll_secs, 0.15);
        assert_eq!(config.streamer.idle_ms, 0);
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_config(
            r#"
            [cleaner]
            source = "/tmp/asr/live.txt"
            idle_ms = 500
            from_start = true

            [glossifier]
            lexicon = "/opt/signs/lexicons.json"
            rate = 2.0
            tween_ms = 0

            [streamer]
            out = "/tmp/final.txt"
            poll_secs = 0.5
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.cleaner.source, PathBuf::from("/tmp/asr/live.txt"));
        assert_eq!(config.cleaner.idle_ms, 500);
        assert!(config.cleaner.from_start);
        assert_eq!(
            config.glossifier.lexicon,
            PathBuf::from("/opt/signs/lexicons.json")
        );
        assert_eq!(config.glossifier.rate, 2.0);
        assert_eq!(config.glossifier.tween_ms, 0);
        assert_eq!(config.streamer.out, PathBuf::from("/tmp/final.txt"));
        assert_eq!(config.streamer.poll(), Duration::from_millis(500));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_config(
            r#"
            [glossifier]
            rate = 1.5
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.glossifier.rate, 1.5);
        assert_eq!(config.cleaner, CleanerConfig::default());
        assert_eq!(config.streamer, StreamerConfig::default());
        assert_eq!(config.glossifier.tween_ms, 100);
    }

    #[test]
    fn test_env_override_lexicon() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_sonare_env();

        set_env("SONARE_LEXICON", "/data/lex.json");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.glossifier.lexicon, PathBuf::from("/data/lex.json"));
        assert_eq!(config.glossifier.rate, 1.0); // Not overridden

        clear_sonare_env();
    }

    #[test]
    fn test_env_override_rate() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_sonare_env();

        set_env("SONARE_RATE", "0.5");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.glossifier.rate, 0.5);

        set_env("SONARE_RATE", "fast");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.glossifier.rate, 1.0);

        clear_sonare_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_sonare_env();

        set_env("SONARE_LEXICON", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.glossifier.lexicon, PathBuf::from("lexicons.json"));

        clear_sonare_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_config(
            r#"
            [cleaner
            source = "broken
        "#,
        );

        let result = Config::load(temp_file.path());

        assert!(matches!(result, Err(SonareError::Config(_))));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_sonare_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_config("[streamer]\npoll_secs = \"slow\"\n");
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.glossifier.rate = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("glossifier.rate"));

        let mut config = Config::default();
        config.cleaner.poll_secs = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(SonareError::ConfigInvalidValue { key, .. }) if key == "cleaner.poll_secs"
        ));
    }

    #[test]
    fn test_cleaner_pacing_is_capped() {
        let mut cleaner = CleanerConfig::default();
        assert_eq!(cleaner.pacing(), Duration::from_millis(50));
        cleaner.poll_secs = 0.01;
        assert_eq!(cleaner.pacing(), Duration::from_millis(10));
    }

    #[test]
    fn test_toml_round_trip_keeps_values() {
        let mut config = Config::default();
        config.glossifier.rate = 1.25;
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[glossifier]"));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_default_path_ends_with_sonare_config() {
        let path = Config::default_path();
        assert!(path.ends_with("sonare/config.toml"));
    }
}
