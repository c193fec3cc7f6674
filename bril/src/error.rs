use thiserror::Error;

/// Errors raised while reading or writing Bril programs.
///
/// Any failure here is a malformed-IR condition: a missing required field,
/// an unknown op, or a value of the wrong shape all surface as `Json`.
#[derive(Debug, Error)]
pub enum BrilError {
    #[error("malformed Bril program: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write program: {0}")]
    Io(#[from] std::io::Error),
}
