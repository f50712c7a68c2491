use thiserror::Error;

/// Top-level error type for the Curvis curve kernel.
#[derive(Debug, Error)]
pub enum CurvisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

/// Errors related to curve construction and evaluation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("parameter {parameter} is not a number")]
    NotANumber { parameter: &'static str },

    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("pose solver did not converge after {iterations} iterations")]
    NoConvergence { iterations: u32 },
}

/// Errors related to flattening.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("invalid flattening parameters: {0}")]
    InvalidParameters(String),

    #[error("tolerance {parameter} is not a number")]
    NotANumber { parameter: &'static str },

    #[error("subdivision exceeded depth {max_depth} without meeting the error bound")]
    MaxDepthExceeded { max_depth: u32 },
}

/// Convenience type alias for results using [`CurvisError`].
pub type Result<T> = std::result::Result<T, CurvisError>;
