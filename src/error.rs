use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, CfxError>;

/// Errors produced when inputs to the explanation utilities are invalid.
#[derive(Debug)]
pub enum CfxError {
    /// A configuration source could not be turned into the expected type.
    InvalidConfig {
        /// Name of the expected configuration type.
        expected: &'static str,
        /// What went wrong while coercing.
        reason: String,
    },

    /// An input array has a shape the operation cannot accept.
    InvalidShape {
        /// Human-readable context (e.g. "input", "batch").
        what: &'static str,
        /// The offending shape.
        shape: Vec<usize>,
    },

    /// A result could not be reshaped back to the caller's shape.
    IncompatibleReshape {
        /// Shape of the produced array.
        got: Vec<usize>,
        /// Shape the caller supplied.
        expected: Vec<usize>,
    },

    /// Two flat buffers that must agree in length do not.
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },

    /// A file could not be read.
    Io { path: String, source: io::Error },

    /// A file's content is not valid JSON.
    Json(serde_json::Error),
}

impl Display for CfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfxError::InvalidConfig { expected, reason } => {
                write!(
                    f,
                    "configs should be a mapping or an instance of `{expected}`: {reason}"
                )
            }
            CfxError::InvalidShape { what, shape } => {
                write!(
                    f,
                    "invalid {what} shape {shape:?}, expected (1, k) or (k,)"
                )
            }
            CfxError::IncompatibleReshape { got, expected } => {
                write!(
                    f,
                    "result shape {got:?} is not compatible with input shape {expected:?}"
                )
            }
            CfxError::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => {
                write!(
                    f,
                    "size mismatch between {a} and {b}: got {got}, expected {expected}"
                )
            }
            CfxError::Io { path, source } => write!(f, "cannot read '{path}': {source}"),
            CfxError::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl Error for CfxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CfxError::Io { source, .. } => Some(source),
            CfxError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CfxError {
    fn from(e: serde_json::Error) -> Self {
        CfxError::Json(e)
    }
}
