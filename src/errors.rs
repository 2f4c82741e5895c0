use std::fmt;
use std::error::Error;

/// Represents errors that can occur while configuring or driving the particle network core.
#[derive(Debug, Clone)]
pub enum ParticleNetError {
    /// Indicates an invalid world boundary (e.g., min >= max, or a negative extent).
    InvalidBounds,
    /// Indicates an invalid distance value (e.g., a negative connection distance).
    InvalidDistance,
    /// Indicates an invalid capacity or count value.
    InvalidCapacity,
    /// A general error for calculations that produce invalid results.
    CalculationError(String),
}

impl fmt::Display for ParticleNetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParticleNetError::InvalidBounds => write!(f, "Invalid world bounds"),
            ParticleNetError::InvalidDistance => write!(f, "Invalid distance value"),
            ParticleNetError::InvalidCapacity => write!(f, "Invalid capacity value"),
            ParticleNetError::CalculationError(msg) => write!(f, "Calculation error: {}", msg),
        }
    }
}

impl Error for ParticleNetError {}
