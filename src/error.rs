//! Error types for sonare.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonareError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Lexicon errors
    #[error("Failed to read lexicon at {}: {source}", path.display())]
    LexiconRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse lexicon at {}: {source}", path.display())]
    LexiconParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // File following and output errors
    #[error("Failed to open {} for following: {source}", path.display())]
    FollowOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Live channel closed")]
    ChannelClosed,

    // Stage failures
    #[error("Stage {stage} failed: {message}")]
    Stage { stage: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SonareError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = SonareError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = SonareError::ConfigInvalidValue {
            key: "glossifier.rate".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for glossifier.rate: must be positive"
        );
    }

    #[test]
    fn test_lexicon_parse_display_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let error = SonareError::LexiconParse {
            path: PathBuf::from("/data/lexicons.json"),
            source,
        };
        let msg = error.to_string();
        assert!(msg.starts_with("Failed to parse lexicon at /data/lexicons.json"));
    }

    #[test]
    fn test_sink_write_display() {
        let error = SonareError::SinkWrite {
            path: PathBuf::from("out/final_queue.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            error.to_string(),
            "Failed to write to out/final_queue.txt: denied"
        );
    }

    #[test]
    fn test_stage_display() {
        let error = SonareError::Stage {
            stage: "cleaner".to_string(),
            message: "output closed".to_string(),
        };
        assert_eq!(error.to_string(), "Stage cleaner failed: output closed");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SonareError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: SonareError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_follow_open() {
        let error = SonareError::FollowOpen {
            path: PathBuf::from("/tmp/live.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        };
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SonareError>();
        assert_sync::<SonareError>();
    }
}
