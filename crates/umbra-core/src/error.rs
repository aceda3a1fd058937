use thiserror::Error;

/// Everything that can go wrong at the host boundaries.
///
/// None of these are fatal: the engine logs them and falls through to the
/// next precedence tier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemeError {
    #[error("persistent storage is unavailable")]
    StorageUnavailable,

    #[error("storage access failed for key `{key}`: {reason}")]
    Storage { key: String, reason: String },

    #[error("color-scheme media queries are not supported by this host")]
    MediaUnsupported,

    #[error("`{0}` is not a color scheme (expected `dark` or `light`)")]
    InvalidScheme(String),

    #[error("no color-scheme provider is active on this thread")]
    NoProvider,
}
