//! Error types for runeterm.

use thiserror::Error;

/// Main error type for runeterm operations.
#[derive(Debug, Error)]
pub enum Error {
    /// PTY creation, exec, or I/O failure.
    ///
    /// Creation and exec failures are fatal to the caller: there is no shell
    /// to emulate without a pty.
    #[error("PTY error: {0}")]
    Pty(String),

    /// Font loading or rasterization failure
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid terminal dimensions
    #[error("Invalid dimensions: {rows}x{cols}")]
    InvalidDimensions {
        /// Number of rows
        rows: u16,
        /// Number of columns
        cols: u16,
    },

    /// Session already closed
    #[error("Session already closed")]
    SessionClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pty_error_display() {
        let err = Error::Pty("openpty failed".to_string());
        assert_eq!(err.to_string(), "PTY error: openpty failed");
    }

    #[test]
    fn test_font_error_display() {
        let err = Error::Font("not a ttf".to_string());
        assert_eq!(err.to_string(), "Font error: not a ttf");
    }

    #[test]
    fn test_invalid_dimensions_display() {
        let err = Error::InvalidDimensions { rows: 0, cols: 80 };
        assert_eq!(err.to_string(), "Invalid dimensions: 0x80");
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("shell must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: shell must not be empty"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_result_type() {
        let ok: Result<u32> = Ok(7);
        assert!(ok.is_ok());
        let failure: Result<u32> = Err(Error::SessionClosed);
        assert!(failure.is_err());
    }
}
