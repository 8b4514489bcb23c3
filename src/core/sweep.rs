use super::engine::evaluate;
use super::error::InvalidInputError;
use super::types::{
    SWEEP_INSURANCE_RATE, SWEEP_PROPERTY_TAX_RATE, Scenario, SweepAxis, SweepPoint, SweepRange,
};

/// Evaluates `base` across three one-dimensional sweeps.
///
/// Points are emitted axis by axis (price, rate, down payment), each axis in
/// ascending sample order. Every sample is a fresh scenario that copies `base`
/// except for the swept field. Price samples also replace property tax and
/// insurance with the typical-market rates so the curve reflects carrying cost
/// at that price. Down payment samples are absolute amounts.
pub fn generate_comparisons(
    base: &Scenario,
    price_range: SweepRange,
    rate_range: SweepRange,
    down_payment_range: SweepRange,
    points_per_axis: usize,
) -> Result<Vec<SweepPoint>, InvalidInputError> {
    if points_per_axis < 2 {
        return Err(InvalidInputError::TooFewPoints(points_per_axis));
    }
    price_range.validate(SweepAxis::HomePrice)?;
    rate_range.validate(SweepAxis::InterestRate)?;
    down_payment_range.validate(SweepAxis::DownPayment)?;

    let mut points = Vec::with_capacity(points_per_axis * SweepAxis::ALL.len());
    for (axis, range) in [
        (SweepAxis::HomePrice, price_range),
        (SweepAxis::InterestRate, rate_range),
        (SweepAxis::DownPayment, down_payment_range),
    ] {
        for value in sample_points(range, points_per_axis) {
            let scenario = derive_scenario(base, axis, value);
            let metrics = evaluate(&scenario)?;
            points.push(SweepPoint {
                axis,
                value,
                metrics,
            });
        }
    }

    tracing::debug!(
        points = points.len(),
        points_per_axis,
        "generated affordability comparisons"
    );
    Ok(points)
}

/// Share of the axis' sweep points that pass both DTI limits, in percent.
pub fn affordability_rate(points: &[SweepPoint], axis: SweepAxis) -> Option<f64> {
    let (total, affordable) = points
        .iter()
        .filter(|point| point.axis == axis)
        .fold((0usize, 0usize), |(total, affordable), point| {
            (total + 1, affordable + usize::from(point.metrics.affordable))
        });
    if total == 0 {
        return None;
    }
    Some(100.0 * affordable as f64 / total as f64)
}

fn derive_scenario(base: &Scenario, axis: SweepAxis, value: f64) -> Scenario {
    let mut scenario = base.clone();
    match axis {
        SweepAxis::HomePrice => {
            scenario.home_price = value;
            scenario.property_tax_annual = value * SWEEP_PROPERTY_TAX_RATE;
            scenario.insurance_annual = value * SWEEP_INSURANCE_RATE;
        }
        SweepAxis::InterestRate => scenario.interest_rate = value,
        SweepAxis::DownPayment => scenario.down_payment = value,
    }
    scenario
}

/// Evenly spaced samples covering both ends of the range. `count` must be >= 2.
fn sample_points(range: SweepRange, count: usize) -> impl Iterator<Item = f64> {
    let last = count - 1;
    let step = (range.max - range.min) / last as f64;
    (0..count).map(move |i| {
        if i == last {
            range.max
        } else {
            range.min + i as f64 * step
        }
    })
}
