//! Wikisage error taxonomy.
//!
//! Startup problems (`Config`) are fatal. Extraction problems (`Fetch`,
//! `Parse`) abort the whole extraction run. Per-turn problems (`Embedding`,
//! `Completion`, `History`) fail only the turn they occur in.

/// Top-level error type for all Wikisage operations.
#[derive(Debug, thiserror::Error)]
pub enum WikisageError {
    /// Missing credential, unreadable prompt file, or invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Network failure while fetching a wiki page.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// HTML or URL parsing failure during extraction.
    #[error("parse error: {0}")]
    Parse(String),

    /// Embedding service failure.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Chat-completion service failure.
    #[error("completion error: {0}")]
    Completion(String),

    /// Session history store failure.
    #[error("history error: {0}")]
    History(String),

    /// Chat platform API failure.
    #[error("channel error: {0}")]
    Channel(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WikisageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WikisageError::Config("OPENAI_API_KEY is not set".into());
        assert_eq!(err.to_string(), "config error: OPENAI_API_KEY is not set");

        let err = WikisageError::Fetch("https://wiki.example.com/: timeout".into());
        assert!(err.to_string().starts_with("fetch error:"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: WikisageError = io.into();
        assert!(matches!(err, WikisageError::Io(_)));
    }
}
