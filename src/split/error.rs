//! Split errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Error raised by the split engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("an expense can be split between at most {max} participants")]
    TooManyParticipants { max: usize },

    #[error("an expense must be split between at least {min} participants")]
    TooFewParticipants { min: usize },

    #[error("participant count {count} is outside {min}..={max}")]
    ParticipantCount { count: usize, min: usize, max: usize },

    #[error("duplicate participant id: {0}")]
    DuplicateParticipant(String),

    #[error("expense total must not be negative: {0}")]
    NegativeTotal(Decimal),

    #[error("expense total {0} has more than two decimals")]
    SubCentTotal(Decimal),

    #[error("{0} exceeds the largest supported amount")]
    AmountTooLarge(Decimal),

    #[error("participant {0} has a negative share")]
    NegativeShare(String),

    #[error("percentages sum to {sum}, expected 100")]
    PercentageSum { sum: Decimal },

    #[error("amounts sum to {sum}, expected {total}")]
    AmountSum { sum: Decimal, total: Decimal },

    #[error("participant {id} has amount {amount}, its percentage gives {expected}")]
    AmountMismatch { id: String, amount: Decimal, expected: Decimal },

    #[error("amounts exceed the expense total by {excess}")]
    OverAllocated { excess: Decimal },
}

/// Result type for split operations
pub type SplitResult<T> = Result<T, SplitError>;
