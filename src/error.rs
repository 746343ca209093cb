//! Error types for the timeline synthesis engine
//!
//! Only genuine failures live here. Degenerate but legal inputs (empty audio, weak onset
//! detection, labels without assets) are modelled as empty or shorter results instead.

/// Convenience result type used across the crate.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors that can occur while decoding, synthesizing or rendering a timeline
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error (the supplied bytes could not be turned into a waveform)
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Asset generation or lookup error
    #[error("Asset error: {0}")]
    AssetError(String),

    /// The rendering backend failed after receiving a valid render plan
    #[error("Render error: {0}")]
    RenderError(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl TimelineError {
    /// Build a [`TimelineError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`TimelineError::DecodingError`] value.
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::DecodingError(msg.into())
    }

    /// Build a [`TimelineError::AssetError`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::AssetError(msg.into())
    }

    /// Build a [`TimelineError::RenderError`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::RenderError(msg.into())
    }

    /// Build a [`TimelineError::ConfigError`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
