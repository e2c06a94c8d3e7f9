//! # Error handling for Tessera Core
//!
//! Unified error type for the grid engine. The error taxonomy mirrors how
//! failures are actually handled:
//!
//! - malformed geometry input (size/position tokens) is *recovered* with
//!   defaults at the parse site and never reaches this type;
//! - persistence failures are logged and dropped by the adapter, so they
//!   surface here only to the adapter's internals;
//! - impossible placements degrade to a last-known position inside the
//!   engine rather than erroring;
//! - gesture misuse (starting a drag while one is active, targeting an
//!   unknown widget) is a real `Err` the caller must handle.

use thiserror::Error;

/// Result type used throughout Tessera Core.
///
/// This is a type alias for `std::result::Result` with our custom [`Error`] type.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Result, Error};
///
/// fn example_function() -> Result<String> {
///     Ok("Success".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Tessera Core.
///
/// This enum represents all possible errors that can occur within the engine.
/// It uses `thiserror` for automatic `std::error::Error` implementation and
/// provides structured error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Grid layout errors
    #[error("Layout error: {message}")]
    Layout { message: String },

    /// Gesture state machine errors
    #[error("Gesture error: {message}")]
    Gesture { message: String },

    /// Persistence/backend submission errors
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Event system errors
    #[error("Event error: {message}")]
    Event { message: String },

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with custom message
    #[error("Error: {message}")]
    Generic { message: String },

    /// Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// Not found errors
    #[error("Not found: {resource}")]
    NotFound { resource: String },
}

impl Error {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Error;
    ///
    /// let error = Error::config("Invalid configuration file format");
    /// ```
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new layout error.
    pub fn layout<S: Into<String>>(message: S) -> Self {
        Self::Layout {
            message: message.into(),
        }
    }

    /// Create a new gesture error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Error;
    ///
    /// let error = Error::gesture("a gesture is already active");
    /// ```
    pub fn gesture<S: Into<String>>(message: S) -> Self {
        Self::Gesture {
            message: message.into(),
        }
    }

    /// Create a new persistence error.
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a new event error.
    pub fn event<S: Into<String>>(message: S) -> Self {
        Self::Event {
            message: message.into(),
        }
    }

    /// Create a new generic error.
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Error;
    ///
    /// let error = Error::validation("grid.cols", "Column count must be positive");
    /// ```
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if this error is a gesture error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Error;
    ///
    /// let error = Error::gesture("busy");
    /// assert!(error.is_gesture());
    /// ```
    pub fn is_gesture(&self) -> bool {
        matches!(self, Self::Gesture { .. })
    }

    /// Check if this error is a persistence error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::Http(_))
    }

    /// Check if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get the error category as a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Error;
    ///
    /// let error = Error::config("Invalid format");
    /// assert_eq!(error.category(), "Config");
    /// ```
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "Config",
            Self::Layout { .. } => "Layout",
            Self::Gesture { .. } => "Gesture",
            Self::Persistence { .. } => "Persistence",
            Self::Event { .. } => "Event",
            Self::Io(_) => "IO",
            Self::Json(_) => "JSON",
            Self::Toml(_) => "TOML",
            Self::Http(_) => "HTTP",
            Self::Generic { .. } => "Generic",
            Self::Validation { .. } => "Validation",
            Self::NotFound { .. } => "NotFound",
        }
    }
}

/// Convert from `anyhow::Error` to our custom error type.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let error = Error::config("Test message");
        assert_eq!(error.category(), "Config");
        assert!(error.to_string().contains("Test message"));
    }

    #[test]
    fn test_gesture_error() {
        let error = Error::gesture("drag already in progress");
        assert!(error.is_gesture());
        assert_eq!(error.category(), "Gesture");
    }

    #[test]
    fn test_persistence_error() {
        let error = Error::persistence("position save rejected: HTTP 500");
        assert!(error.is_persistence());
        assert_eq!(error.category(), "Persistence");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::from(io_error);
        assert_eq!(error.category(), "IO");
    }

    #[test]
    fn test_validation_error() {
        let error = Error::validation("grid.cols", "must be positive");
        assert!(error.is_validation());
        assert_eq!(error.category(), "Validation");
    }

    #[test]
    fn test_not_found_error() {
        let error = Error::not_found("widget 'weather'");
        assert_eq!(error.category(), "NotFound");
        assert!(error.to_string().contains("weather"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let anyhow_err = anyhow::anyhow!("Test error");
        let error = Error::from(anyhow_err);
        assert_eq!(error.category(), "Generic");
    }

    #[test]
    fn test_error_display() {
        let error = Error::gesture("no drag in progress");
        let display = format!("{}", error);
        assert!(display.contains("Gesture error"));
        assert!(display.contains("no drag in progress"));
    }
}
