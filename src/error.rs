//! Error types for the extraction pipeline.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors the pipeline can surface to a caller.
///
/// Most classification failures are *not* represented here — a classifier
/// that doesn't match simply returns `None` and the cascade moves on (see
/// [`crate::validator`]). This enum is reserved for configuration mistakes
/// and the rare systemic failure that must abort the whole document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration value failed validation.
    #[error("invalid config field `{field}`: {cause}")]
    ConfigError { field: String, cause: String },

    /// The input bytes handed to [`crate::pipeline::Pipeline::extract_bytes`]
    /// were not valid UTF-8. Fatal: no partial result is produced.
    #[error("input is not valid UTF-8: {cause}")]
    InvalidUtf8 { cause: String },

    /// A grammar failed to build at registry-construction time.
    ///
    /// This never escapes [`crate::registry::GrammarRegistry::validate`] —
    /// a missing grammar there just makes that language report `valid: false`.
    #[error("grammar unavailable for language `{language}`")]
    GrammarUnavailable { language: String },
}
