use thiserror::Error;

/// Failure kinds reported by every solver in the workspace
///
/// All of them are recoverable: the caller shows a message and carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// An input violates its domain constraint (sign, bound, count)
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A simultaneous system or iteration has no unique solution
    #[error("degenerate system: {0}")]
    DegenerateSystem(String),

    /// The requested model/format combination is not implemented
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl SolverError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SolverError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        SolverError::DegenerateSystem(reason.into())
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        SolverError::Unsupported(reason.into())
    }

    /// Short machine-readable kind, used in exported reports
    pub fn kind(&self) -> &'static str {
        match self {
            SolverError::InvalidParameter { .. } => "invalid-parameter",
            SolverError::DegenerateSystem(_) => "degenerate-system",
            SolverError::Unsupported(_) => "unsupported",
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
