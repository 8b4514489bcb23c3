use super::error::InvalidInputError;
use super::types::{BACK_END_RATIO_LIMIT, FRONT_END_RATIO_LIMIT, MONTHS_PER_YEAR, Metrics, Scenario};

/// Fixed monthly payment that fully amortizes `principal` over `term_years`.
///
/// A zero rate falls back to straight-line repayment. No rounding is applied.
pub fn amortized_payment(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
) -> Result<f64, InvalidInputError> {
    if term_years == 0 {
        return Err(InvalidInputError::ZeroLoanTerm);
    }
    if !principal.is_finite() {
        return Err(InvalidInputError::NonFinite {
            field: "principal",
            value: principal,
        });
    }
    if principal < 0.0 {
        return Err(InvalidInputError::Negative {
            field: "principal",
            value: principal,
        });
    }
    if !annual_rate_percent.is_finite() {
        return Err(InvalidInputError::NonFinite {
            field: "interest_rate",
            value: annual_rate_percent,
        });
    }
    if annual_rate_percent < 0.0 {
        return Err(InvalidInputError::Negative {
            field: "interest_rate",
            value: annual_rate_percent,
        });
    }

    let num_payments = f64::from(term_years) * f64::from(MONTHS_PER_YEAR);
    if annual_rate_percent == 0.0 {
        return Ok(principal / num_payments);
    }

    let monthly_rate = annual_rate_percent / f64::from(MONTHS_PER_YEAR) / 100.0;
    let growth = (1.0 + monthly_rate).powf(num_payments);
    // Rates below f64 resolution make the annuity factor 0/0.
    if growth == 1.0 {
        return Ok(principal / num_payments);
    }

    // P·r·g / (g - 1) rearranged so an infinite `g` converges to P·r.
    let payment = principal * monthly_rate / (1.0 - growth.recip());
    finite("monthly_principal_interest", payment)
}

pub fn evaluate(scenario: &Scenario) -> Result<Metrics, InvalidInputError> {
    scenario.validate()?;

    let loan_amount = scenario.loan_amount();
    let down_payment_amount = scenario.down_payment;
    let down_payment_percent = amount_to_percent(scenario.home_price, down_payment_amount)?;

    let monthly_principal_interest = amortized_payment(
        loan_amount,
        scenario.interest_rate,
        scenario.loan_term_years,
    )?;
    let months = f64::from(MONTHS_PER_YEAR);
    let monthly_property_tax = scenario.property_tax_annual / months;
    let monthly_insurance = scenario.insurance_annual / months;
    let monthly_hoa = scenario.hoa_monthly;
    let total_monthly_payment =
        monthly_principal_interest + monthly_property_tax + monthly_insurance + monthly_hoa;

    let front_end_ratio = 100.0 * total_monthly_payment / scenario.monthly_income;
    let back_end_ratio =
        100.0 * (total_monthly_payment + scenario.monthly_debts) / scenario.monthly_income;

    let total_payments = monthly_principal_interest
        * f64::from(scenario.loan_term_years)
        * f64::from(MONTHS_PER_YEAR);
    let total_interest = total_payments - loan_amount;

    for (field, value) in [
        ("total_monthly_payment", total_monthly_payment),
        ("front_end_ratio", front_end_ratio),
        ("back_end_ratio", back_end_ratio),
        ("total_payments", total_payments),
        ("total_interest", total_interest),
    ] {
        finite(field, value)?;
    }

    Ok(Metrics {
        loan_amount,
        down_payment_amount,
        down_payment_percent,
        monthly_principal_interest,
        monthly_property_tax,
        monthly_insurance,
        monthly_hoa,
        total_monthly_payment,
        front_end_ratio,
        back_end_ratio,
        total_payments,
        total_interest,
        affordable: is_affordable(front_end_ratio, back_end_ratio),
    })
}

pub fn is_affordable(front_end_ratio: f64, back_end_ratio: f64) -> bool {
    front_end_ratio <= FRONT_END_RATIO_LIMIT && back_end_ratio <= BACK_END_RATIO_LIMIT
}

pub fn percent_to_amount(home_price: f64, percent: f64) -> Result<f64, InvalidInputError> {
    check_home_price(home_price)?;
    if !percent.is_finite() {
        return Err(InvalidInputError::NonFinite {
            field: "down_payment_percent",
            value: percent,
        });
    }
    Ok(home_price * percent / 100.0)
}

pub fn amount_to_percent(home_price: f64, amount: f64) -> Result<f64, InvalidInputError> {
    check_home_price(home_price)?;
    if !amount.is_finite() {
        return Err(InvalidInputError::NonFinite {
            field: "down_payment",
            value: amount,
        });
    }
    Ok(amount / home_price * 100.0)
}

fn finite(field: &'static str, value: f64) -> Result<f64, InvalidInputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidInputError::Overflow { field })
    }
}

fn check_home_price(home_price: f64) -> Result<(), InvalidInputError> {
    if !home_price.is_finite() {
        return Err(InvalidInputError::NonFinite {
            field: "home_price",
            value: home_price,
        });
    }
    if home_price <= 0.0 {
        return Err(InvalidInputError::NonPositive {
            field: "home_price",
            value: home_price,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn reference_scenario() -> Scenario {
        Scenario::new(500_000.0, 100_000.0, 6.0, 30, 10_000.0)
    }

    #[test]
    fn amortized_payment_matches_known_thirty_year_quote() {
        let payment = amortized_payment(400_000.0, 6.0, 30).expect("valid loan");
        assert_approx_tol(payment, 2398.20, 0.5);
    }

    #[test]
    fn amortized_payment_zero_rate_is_straight_line() {
        let payment = amortized_payment(360_000.0, 0.0, 30).expect("valid loan");
        assert_eq!(payment, 360_000.0 / 360.0);

        let payment = amortized_payment(123_457.0, 0.0, 15).expect("valid loan");
        assert_eq!(payment, 123_457.0 / 180.0);
    }

    #[test]
    fn amortized_payment_zero_principal_is_zero() {
        assert_eq!(amortized_payment(0.0, 5.0, 30).expect("valid loan"), 0.0);
    }

    #[test]
    fn amortized_payment_rejects_zero_term() {
        let err = amortized_payment(100_000.0, 5.0, 0).expect_err("term must be positive");
        assert_eq!(err, InvalidInputError::ZeroLoanTerm);
        assert!(amortized_payment(100_000.0, 0.0, 0).is_err());
    }

    #[test]
    fn amortized_payment_rejects_negative_inputs() {
        assert!(matches!(
            amortized_payment(-1.0, 5.0, 30),
            Err(InvalidInputError::Negative { field: "principal", .. })
        ));
        assert!(matches!(
            amortized_payment(1_000.0, -0.5, 30),
            Err(InvalidInputError::Negative { field: "interest_rate", .. })
        ));
        assert!(matches!(
            amortized_payment(f64::NAN, 5.0, 30),
            Err(InvalidInputError::NonFinite { .. })
        ));
    }

    #[test]
    fn amortized_payment_handles_vanishing_rate() {
        let payment = amortized_payment(360_000.0, 1e-300, 30).expect("valid loan");
        assert!(payment.is_finite());
        assert_approx(payment, 1_000.0);
    }

    #[test]
    fn amortized_payment_handles_longest_term() {
        let payment = amortized_payment(100_000.0, 5.0, u32::MAX).expect("valid loan");
        assert_approx(payment, 100_000.0 * 5.0 / 1_200.0);

        let payment = amortized_payment(100_000.0, 0.0, u32::MAX).expect("valid loan");
        assert_eq!(payment, 100_000.0 / (f64::from(u32::MAX) * 12.0));
    }

    #[test]
    fn amortized_payment_converges_to_interest_only_at_extreme_rate() {
        let payment = amortized_payment(400_000.0, 10_000.0, 30).expect("valid loan");
        assert!(payment.is_finite());
        assert_approx(payment, 400_000.0 * 10_000.0 / 1_200.0);
    }

    #[test]
    fn amortized_payment_rejects_overflowing_principal() {
        assert_eq!(
            amortized_payment(f64::MAX, 6_000.0, 30),
            Err(InvalidInputError::Overflow {
                field: "monthly_principal_interest"
            })
        );
    }

    #[test]
    fn evaluate_extreme_rate_stays_finite() {
        let scenario = Scenario::new(500_000.0, 100_000.0, 10_000.0, 30, 10_000.0);
        let metrics = evaluate(&scenario).expect("valid scenario");

        assert_approx(metrics.monthly_principal_interest, 400_000.0 * 10_000.0 / 1_200.0);
        assert!(metrics.front_end_ratio.is_finite());
        assert!(metrics.total_interest.is_finite());
        assert!(!metrics.affordable);
    }

    #[test]
    fn evaluate_longest_term_stays_finite() {
        let scenario = Scenario::new(500_000.0, 100_000.0, 6.0, u32::MAX, 10_000.0);
        let metrics = evaluate(&scenario).expect("valid scenario");
        assert_approx(metrics.monthly_principal_interest, 2_000.0);
        assert!(metrics.total_payments.is_finite());
    }

    #[test]
    fn evaluate_rejects_ratios_that_overflow() {
        let scenario = Scenario::new(1e300, 0.0, 0.0, 30, 1e-10);
        assert_eq!(
            evaluate(&scenario),
            Err(InvalidInputError::Overflow {
                field: "front_end_ratio"
            })
        );
    }

    #[test]
    fn evaluate_reference_scenario() {
        let metrics = evaluate(&reference_scenario()).expect("valid scenario");

        assert_eq!(metrics.loan_amount, 400_000.0);
        assert_eq!(metrics.down_payment_amount, 100_000.0);
        assert_approx(metrics.down_payment_percent, 20.0);
        assert_approx_tol(metrics.monthly_principal_interest, 2398.20, 0.5);
        assert_eq!(metrics.monthly_property_tax, 0.0);
        assert_eq!(metrics.monthly_insurance, 0.0);
        assert_eq!(metrics.monthly_hoa, 0.0);
        assert_approx(
            metrics.total_monthly_payment,
            metrics.monthly_principal_interest,
        );
        assert_approx_tol(metrics.front_end_ratio, 23.98, 0.01);
        assert_approx(metrics.back_end_ratio, metrics.front_end_ratio);
        assert!(metrics.affordable);
    }

    #[test]
    fn evaluate_aggregates_carrying_costs() {
        let scenario = reference_scenario()
            .with_monthly_debts(500.0)
            .with_property_tax_annual(6_000.0)
            .with_insurance_annual(1_200.0)
            .with_hoa_monthly(150.0);
        let metrics = evaluate(&scenario).expect("valid scenario");

        assert_approx(metrics.monthly_property_tax, 500.0);
        assert_approx(metrics.monthly_insurance, 100.0);
        assert_approx(metrics.monthly_hoa, 150.0);
        assert_approx(
            metrics.total_monthly_payment,
            metrics.monthly_principal_interest + 750.0,
        );
        assert_approx(
            metrics.front_end_ratio,
            metrics.total_monthly_payment / 10_000.0 * 100.0,
        );
        assert_approx(
            metrics.back_end_ratio,
            (metrics.total_monthly_payment + 500.0) / 10_000.0 * 100.0,
        );
        assert_approx(metrics.total_interest, metrics.total_payments - 400_000.0);
    }

    #[test]
    fn evaluate_threshold_boundary_is_inclusive() {
        // Zero rate: P&I = 1_008_000 / 360 = 2_800 exactly.
        let scenario = Scenario::new(1_108_000.0, 100_000.0, 0.0, 30, 10_000.0)
            .with_monthly_debts(800.0);
        let metrics = evaluate(&scenario).expect("valid scenario");

        assert_eq!(metrics.total_monthly_payment, 2_800.0);
        assert_eq!(metrics.front_end_ratio, FRONT_END_RATIO_LIMIT);
        assert_eq!(metrics.back_end_ratio, BACK_END_RATIO_LIMIT);
        assert!(metrics.affordable);
    }

    #[test]
    fn evaluate_flags_back_end_breach_even_when_front_end_passes() {
        let scenario = reference_scenario().with_monthly_debts(1_500.0);
        let metrics = evaluate(&scenario).expect("valid scenario");

        assert!(metrics.front_end_ratio <= FRONT_END_RATIO_LIMIT);
        assert!(metrics.back_end_ratio > BACK_END_RATIO_LIMIT);
        assert!(!metrics.affordable);
    }

    #[test]
    fn evaluate_rejects_zero_home_price() {
        let mut scenario = reference_scenario();
        scenario.home_price = 0.0;
        scenario.down_payment = 0.0;
        let err = evaluate(&scenario).expect_err("zero price must fail");
        assert!(matches!(
            err,
            InvalidInputError::NonPositive { field: "home_price", .. }
        ));
    }

    #[test]
    fn evaluate_rejects_invalid_scenarios() {
        let mut scenario = reference_scenario();
        scenario.monthly_income = 0.0;
        assert!(matches!(
            evaluate(&scenario),
            Err(InvalidInputError::NonPositive { field: "monthly_income", .. })
        ));

        let mut scenario = reference_scenario();
        scenario.down_payment = 500_000.0;
        assert!(matches!(
            evaluate(&scenario),
            Err(InvalidInputError::DownPaymentTooLarge { .. })
        ));

        let mut scenario = reference_scenario();
        scenario.loan_term_years = 0;
        assert_eq!(evaluate(&scenario), Err(InvalidInputError::ZeroLoanTerm));

        let mut scenario = reference_scenario();
        scenario.hoa_monthly = -10.0;
        assert!(matches!(
            evaluate(&scenario),
            Err(InvalidInputError::Negative { field: "hoa_monthly", .. })
        ));

        let mut scenario = reference_scenario();
        scenario.insurance_annual = f64::INFINITY;
        assert!(matches!(
            evaluate(&scenario),
            Err(InvalidInputError::NonFinite { field: "insurance_annual", .. })
        ));
    }

    #[test]
    fn percent_and_amount_conversions_agree() {
        assert_approx(percent_to_amount(650_000.0, 20.0).expect("valid"), 130_000.0);
        assert_approx(amount_to_percent(650_000.0, 130_000.0).expect("valid"), 20.0);
        assert!(percent_to_amount(0.0, 20.0).is_err());
        assert!(amount_to_percent(-5.0, 1.0).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_loan_amount_is_price_minus_down_payment(
            price in 10_000u32..5_000_000,
            down_bp in 0u32..9_999,
            rate_bp in 0u32..1_500,
            term_index in 0usize..4,
            income in 1_000u32..100_000,
        ) {
            let price = price as f64;
            let down_payment = (price * down_bp as f64 / 10_000.0).floor();
            let term = crate::core::STANDARD_LOAN_TERMS[term_index];
            let scenario = Scenario::new(price, down_payment, rate_bp as f64 / 100.0, term, income as f64);
            let metrics = evaluate(&scenario).expect("valid scenario");

            prop_assert!(metrics.loan_amount == price - down_payment);
            prop_assert!(metrics.front_end_ratio.is_finite());
            prop_assert!(metrics.back_end_ratio >= metrics.front_end_ratio);
            prop_assert!(metrics.total_interest >= -1e-6);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_total_payments_is_payment_times_months(
            principal in 1_000u32..3_000_000,
            rate_bp in 1u32..1_500,
            term_index in 0usize..4,
        ) {
            let term = crate::core::STANDARD_LOAN_TERMS[term_index];
            let scenario = Scenario::new(principal as f64 + 50_000.0, 50_000.0, rate_bp as f64 / 100.0, term, 20_000.0);
            let metrics = evaluate(&scenario).expect("valid scenario");
            let expected = metrics.monthly_principal_interest * f64::from(term * 12);

            prop_assert!((metrics.total_payments - expected).abs() <= 1e-6 * expected.max(1.0));
            prop_assert!(metrics.total_payments > metrics.loan_amount);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_higher_price_with_fixed_down_payment_raises_payment(
            price in 100_000u32..2_000_000,
            step in 1_000u32..500_000,
            rate_bp in 0u32..1_200,
            term_index in 0usize..4,
        ) {
            let term = crate::core::STANDARD_LOAN_TERMS[term_index];
            let rate = rate_bp as f64 / 100.0;
            let low = Scenario::new(price as f64, 50_000.0, rate, term, 10_000.0);
            let high = Scenario::new((price + step) as f64, 50_000.0, rate, term, 10_000.0);
            let low = evaluate(&low).expect("valid scenario");
            let high = evaluate(&high).expect("valid scenario");

            prop_assert!(high.loan_amount > low.loan_amount);
            prop_assert!(high.monthly_principal_interest > low.monthly_principal_interest);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_higher_rate_raises_payment(
            principal in 10_000u32..2_000_000,
            rate_bp in 0u32..1_500,
            bump_bp in 1u32..500,
            term_index in 0usize..4,
        ) {
            let term = crate::core::STANDARD_LOAN_TERMS[term_index];
            let low_rate = rate_bp as f64 / 100.0;
            let high_rate = (rate_bp + bump_bp) as f64 / 100.0;

            let low = amortized_payment(principal as f64, low_rate, term).expect("valid loan");
            let high = amortized_payment(principal as f64, high_rate, term).expect("valid loan");
            prop_assert!(high > low);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_payment_is_finite_for_any_rate_and_term(
            principal in 0u32..5_000_000,
            rate_bp in 0u32..1_000_000,
            term in 1u32..=u32::MAX,
        ) {
            let payment = amortized_payment(principal as f64, rate_bp as f64 / 100.0, term)
                .expect("valid loan");
            prop_assert!(payment.is_finite());
            prop_assert!(payment >= 0.0);
            prop_assert!(payment <= principal as f64 * (1.0 + rate_bp as f64 / 120_000.0));
        }
    }
}
