/// Errors that can occur when setting up a drawing context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextError {
    /// Device pixel ratio is not a finite positive number.
    InvalidPixelRatio(f32),

    /// State stack needs room for at least one state.
    InvalidStateCapacity(usize),

    /// Stroke width limit is not a finite positive number.
    InvalidStrokeWidthLimit(f32),
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::InvalidPixelRatio(ratio) => {
                write!(f, "Invalid device pixel ratio: {} (must be finite and > 0)", ratio)
            }
            ContextError::InvalidStateCapacity(capacity) => {
                write!(f, "Invalid state stack capacity: {} (must be >= 1)", capacity)
            }
            ContextError::InvalidStrokeWidthLimit(limit) => {
                write!(f, "Invalid stroke width limit: {} (must be finite and > 0)", limit)
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;
