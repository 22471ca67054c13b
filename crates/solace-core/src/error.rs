use thiserror::Error;

/// Top-level error type for the Solace system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for SolaceError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolaceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Remote provider error: {0}")]
    Remote(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SolaceError {
    fn from(err: toml::de::Error) -> Self {
        SolaceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SolaceError {
    fn from(err: toml::ser::Error) -> Self {
        SolaceError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SolaceError {
    fn from(err: serde_json::Error) -> Self {
        SolaceError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Solace operations.
pub type Result<T> = std::result::Result<T, SolaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolaceError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SolaceError = io_err.into();
        assert!(matches!(err, SolaceError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(SolaceError, &str)> = vec![
            (
                SolaceError::Engine("empty bank".to_string()),
                "Engine error: empty bank",
            ),
            (
                SolaceError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                SolaceError::Auth("invalid credentials".to_string()),
                "Auth error: invalid credentials",
            ),
            (
                SolaceError::Remote("rate limited".to_string()),
                "Remote provider error: rate limited",
            ),
            (
                SolaceError::Transcription("no audio".to_string()),
                "Transcription error: no audio",
            ),
            (
                SolaceError::Chat("session missing".to_string()),
                "Chat error: session missing",
            ),
            (
                SolaceError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let solace_err: SolaceError = err.unwrap_err().into();
        assert!(matches!(solace_err, SolaceError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let solace_err: SolaceError = err.unwrap_err().into();
        assert!(matches!(solace_err, SolaceError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = SolaceError::Remote("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Remote"));
        assert!(debug_str.contains("test debug"));
    }
}
