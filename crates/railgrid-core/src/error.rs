use thiserror::Error;

/// Top-level error type for railed sampling.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
///
/// Raised when a sampler is built or a config file is loaded. Every variant
/// is fatal to the sampling attempt it belongs to.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid rail resolution for dof {dof}: {value} (must be > 0 and finite)")]
    InvalidResolution { dof: usize, value: f64 },

    #[error("Inverted rail bounds for dof {dof}: lower={lower}, upper={upper}")]
    InvertedBounds { dof: usize, lower: f64, upper: f64 },

    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid robot reach: {0} (must be > 0)")]
    InvalidReach(f64),

    #[error("Collision tolerance requires a collision capability")]
    MissingCollision,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Link not found in environment state: {0}")]
    MissingLink(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
