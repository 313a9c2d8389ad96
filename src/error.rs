use thiserror::Error;

/// Top-level error type for sweepkit.
#[derive(Debug, Error)]
pub enum SweepkitError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("degenerate tangent at t = {0}: orientation is undefined")]
    DegenerateTangent(f64),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised by modeling operations.
///
/// `InvalidInput` is reported before an operation starts; `Failed` means
/// the operation ran and did not complete.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to mesh structure.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh is empty")]
    Empty,

    #[error("input is not a triangle mesh: face {face} has {arity} vertices")]
    NotTriangleMesh { face: usize, arity: usize },

    #[error("face {face} references vertex {index}, but the mesh has {count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        count: usize,
    },

    #[error("mesh is not manifold: {0}")]
    NonManifold(String),

    #[error("mesh is not closed: {0} boundary edges")]
    NotClosed(usize),

    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),
}

/// Errors produced while reading a mesh file.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// One-based line number where the problem was found.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error at `line`.
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Convenience type alias for results using [`SweepkitError`].
pub type Result<T, E = SweepkitError> = std::result::Result<T, E>;
