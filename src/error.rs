use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the ensemble engine.
///
/// The physics step itself never fails; errors only surface when an ensemble
/// is built from bad configuration or when a caller hands in bad parameters.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration that would produce nonsensical bounds or particles.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid caller-supplied parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("malformed configuration file: {0}")]
    Yaml(#[from] serde_yml::Error),
}
