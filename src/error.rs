use thiserror::Error;

/// Result alias used across the truncation pipeline.
pub type Result<T> = std::result::Result<T, ShearError>;

/// Error taxonomy for the truncation engine.
///
/// Only two of these ever reach a user: a zero line limit (caught before any
/// parsing) and an infeasible one (the file's declarations alone exceed the
/// budget). Parse failures are internal: they route a file onto the heuristic
/// path and are logged at debug level, never surfaced.
#[derive(Error, Debug)]
pub enum ShearError {
    /// The configured line limit is zero. Rejected before any work begins.
    #[error("line limit must be at least 1 (got {0})")]
    InvalidLineLimit(usize),

    /// Header and footer lines alone already exceed the budget. Carries the
    /// smallest limit that would have worked so the caller can say so.
    #[error("line limit {line_limit} is too small: imports and declarations need at least {minimum_required} lines")]
    LineLimitTooSmall {
        line_limit: usize,
        minimum_required: usize,
    },

    /// Syntax tree construction failed for a supported language.
    #[error("failed to parse source as {language}")]
    ParseFailure { language: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShearError {
    /// The smallest workable limit for an infeasible-budget error, if that is
    /// what this error is.
    pub fn minimum_required(&self) -> Option<usize> {
        match self {
            ShearError::LineLimitTooSmall {
                minimum_required, ..
            } => Some(*minimum_required),
            _ => None,
        }
    }
}

/// Reject unusable budgets before any parsing happens.
pub fn validate_line_limit(limit: usize) -> Result<usize> {
    if limit == 0 {
        return Err(ShearError::InvalidLineLimit(limit));
    }
    Ok(limit)
}
