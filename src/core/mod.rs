mod defaults;
mod engine;
mod error;
mod sweep;
mod types;

pub use defaults::{
    ComparisonRanges, default_comparison_ranges, default_down_payment, default_property_tax,
    down_payment_bounds, savings_months,
};
pub use engine::{amortized_payment, amount_to_percent, evaluate, is_affordable, percent_to_amount};
pub use error::InvalidInputError;
pub use sweep::{affordability_rate, generate_comparisons};
pub use types::{
    BACK_END_RATIO_LIMIT, BreakdownSlice, CostComponent, DEFAULT_POINTS_PER_AXIS,
    FRONT_END_RATIO_LIMIT, MONTHS_PER_YEAR, Metrics, PaymentBreakdown, STANDARD_LOAN_TERMS,
    SWEEP_INSURANCE_RATE, SWEEP_PROPERTY_TAX_RATE, Scenario, SweepAxis, SweepPoint, SweepRange,
};
