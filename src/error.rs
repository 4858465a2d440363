use thiserror::Error;

//errors raised by the numeric core (filters, strategies, accumulator)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfitError {
    #[error("Shape mismatch: signal has {signal} rows, returns have {returns}")]
    ShapeMismatch { signal: usize, returns: usize },
    #[error("No rows left to reduce after filtering")]
    EmptySelection,
    #[error("Cannot merge a {left} accumulator state with a {right} state")]
    StateKindMismatch {
        left: &'static str,
        right: &'static str,
    },
    #[error("Cannot merge a {left} accumulator with a {right} accumulator")]
    StrategyMismatch { left: String, right: String },
}

pub type Result<T> = std::result::Result<T, ProfitError>;

//fails unless both sequences are co-indexed
pub fn check_aligned(signal: usize, returns: usize) -> Result<()> {
    if signal != returns {
        return Err(ProfitError::ShapeMismatch { signal, returns });
    }
    Ok(())
}
