use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("down payment {down_payment} must be below home price {home_price}")]
    DownPaymentTooLarge { down_payment: f64, home_price: f64 },

    #[error("loan term must be at least one year")]
    ZeroLoanTerm,

    #[error("points per axis must be >= 2, got {0}")]
    TooFewPoints(usize),

    #[error("{axis} range is invalid: min {min}, max {max}")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} is too large to compute")]
    Overflow { field: &'static str },
}
