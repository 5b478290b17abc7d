use thiserror::Error;

/// Main error type for rankaudit
#[derive(Error, Debug)]
pub enum RankauditError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Title mapping database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Unparsable ranking, qrels or entity-link content
    #[error("Malformed input in {source_name} at line {line}: {message}")]
    MalformedInput {
        source_name: String,
        line: usize,
        message: String,
    },

    /// External evaluator failed or produced unreadable output
    #[error("Evaluator error: {0}")]
    Evaluator(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RankauditError {
    pub(crate) fn malformed(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        RankauditError::MalformedInput {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}

/// Convenient Result type using RankauditError
pub type Result<T> = std::result::Result<T, RankauditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RankauditError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_malformed_names_source_and_line() {
        let err = RankauditError::malformed("run.txt", 7, "expected 6 fields");
        let msg = err.to_string();
        assert!(msg.contains("run.txt"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("expected 6 fields"));
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let err: RankauditError = rusqlite_err.into();
        assert!(matches!(err, RankauditError::Database(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RankauditError = io_err.into();
        assert!(matches!(err, RankauditError::Io(_)));
    }
}
