use thiserror::Error;

/// tallytable error types
#[derive(Error, Debug)]
pub enum TallyError {
    /// Record, child or group to remove is not resident
    #[error("not found: {0}")]
    NotFound(String),

    /// Sum type outside sum/last/avg
    #[error("unsupported sum type: {0}")]
    UnsupportedSumType(String),

    /// Rendering requested without a renderer bound to the report
    #[error("no renderer configured")]
    NoRendererConfigured,

    /// Failure surfaced by a renderer
    #[error("render error: {0}")]
    Render(String),

    /// Failed to parse JSON/TOML/date input
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid option value or argument combination
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for tallytable
pub type Result<T> = std::result::Result<T, TallyError>;
