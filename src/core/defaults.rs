//! Starting values a caller can offer before the user overrides them.
//!
//! Everything here is a pure function of the current inputs and is recomputed
//! on every call; nothing is remembered between evaluations.

use serde::Serialize;

use super::types::{Scenario, SweepRange};

const DEFAULT_DOWN_PAYMENT_FRACTION: f64 = 0.20;
const DEFAULT_DOWN_PAYMENT_CAP: f64 = 1_000_000.0;
const MIN_DOWN_PAYMENT_FRACTION: f64 = 0.03;
const MIN_DOWN_PAYMENT_FLOOR: f64 = 1_000.0;
/// King County, WA effective rate.
const DEFAULT_PROPERTY_TAX_RATE: f64 = 0.0105;
const DEFAULT_SAVINGS_RATE: f64 = 0.20;

const PRICE_SPREAD_LOW: f64 = 0.70;
const PRICE_SPREAD_HIGH: f64 = 1.30;
const RATE_SPREAD: f64 = 2.0;
const RATE_FLOOR: f64 = 1.0;
const DOWN_PAYMENT_SPREAD_LOW: f64 = 0.05;
const DOWN_PAYMENT_SPREAD_HIGH: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRanges {
    pub price: SweepRange,
    pub rate: SweepRange,
    pub down_payment: SweepRange,
}

pub fn default_down_payment(home_price: f64) -> f64 {
    (home_price * DEFAULT_DOWN_PAYMENT_FRACTION)
        .floor()
        .min(DEFAULT_DOWN_PAYMENT_CAP)
}

/// Smallest and largest down payment a form should accept at this price.
pub fn down_payment_bounds(home_price: f64) -> (f64, f64) {
    let min = (home_price * MIN_DOWN_PAYMENT_FRACTION)
        .floor()
        .max(MIN_DOWN_PAYMENT_FLOOR);
    (min, home_price.floor())
}

pub fn default_property_tax(home_price: f64) -> f64 {
    (home_price * DEFAULT_PROPERTY_TAX_RATE).floor()
}

/// Sweep ranges centred on the scenario: price ±30%, rate ±2 points (never
/// below 1%), down payment 5%–80% of price as an absolute amount.
///
/// The price sweep holds the dollar down payment fixed, so the low price end
/// is raised to halfway between the down payment and the price whenever 70%
/// of the price would not exceed it.
pub fn default_comparison_ranges(scenario: &Scenario) -> ComparisonRanges {
    let price = scenario.home_price;
    let rate = scenario.interest_rate;
    let mut price_low = price * PRICE_SPREAD_LOW;
    if price_low <= scenario.down_payment {
        price_low = (scenario.down_payment + price) / 2.0;
    }
    ComparisonRanges {
        price: SweepRange::new(price_low, price * PRICE_SPREAD_HIGH),
        rate: SweepRange::new((rate - RATE_SPREAD).max(RATE_FLOOR), rate + RATE_SPREAD),
        down_payment: SweepRange::new(
            price * DOWN_PAYMENT_SPREAD_LOW,
            price * DOWN_PAYMENT_SPREAD_HIGH,
        ),
    }
}

/// Months needed to save the down payment at a fixed share of gross income.
pub fn savings_months(down_payment: f64, monthly_income: f64) -> Option<f64> {
    let monthly_savings = monthly_income * DEFAULT_SAVINGS_RATE;
    if !monthly_savings.is_finite() || monthly_savings <= 0.0 {
        return None;
    }
    Some(down_payment / monthly_savings)
}
