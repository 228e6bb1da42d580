//! Error types for the PostureLens core.
//!
//! Error handling uses [`thiserror`] for automatic `Display` and `Error`
//! trait implementations.
//!
//! Missing landmarks and degenerate geometry are deliberately NOT errors:
//! they are in-band outcomes that map to an `Unknown` classification. The
//! variants here cover genuine misuse and carrier failures (invalid
//! configuration, out-of-convention landmark indices, and the I/O and
//! decoding faults a frame source can hit).
//!
//! # Example
//!
//! ```rust
//! use posturelens_core::error::CoreError;
//!
//! fn check_threshold(degrees: f64) -> Result<(), CoreError> {
//!     if !(0.0..=180.0).contains(&degrees) {
//!         return Err(CoreError::configuration(format!(
//!             "threshold {degrees} outside [0, 180]"
//!         )));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Top-level error type for the PostureLens core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// Validation error for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },

    /// Landmark index outside the skeletal convention
    #[error("Invalid landmark index: {index} (the convention defines indices 0-32)")]
    InvalidLandmarkIndex {
        /// The out-of-range index
        index: u8,
    },

    /// A frame carrier produced bytes that do not decode to a frame
    #[error("Decode error in {context}: {message}")]
    Decode {
        /// Where the bad input came from (for example `replay line 12`)
        context: String,
        /// Description of the decode failure
        message: String,
    },

    /// A value could not be serialized for a sink
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure
        message: String,
    },

    /// I/O failure in a frame source or assessment sink
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O failure
        message: String,
    },
}

impl CoreError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new decode error.
    #[must_use]
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a new I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// A decode failure affects a single frame; the carrier can skip it and
    /// continue. Everything else invalidates the session it occurred in.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Decode { .. } => true,
            Self::Configuration { .. }
            | Self::Validation { .. }
            | Self::InvalidLandmarkIndex { .. }
            | Self::Serialization { .. }
            | Self::Io { .. } => false,
        }
    }
}
