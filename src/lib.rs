//! Mortgage affordability: amortized payments, debt-to-income ratios and
//! sensitivity sweeps, with a JSON HTTP API and a command-line front end.

pub mod api;
pub mod core;
