use serde::Serialize;

use super::error::InvalidInputError;

/// Housing cost ceiling as a percentage of gross monthly income.
pub const FRONT_END_RATIO_LIMIT: f64 = 28.0;
/// Housing cost plus other debts ceiling as a percentage of gross monthly income.
pub const BACK_END_RATIO_LIMIT: f64 = 36.0;

/// Payments per year on a monthly amortization schedule.
pub const MONTHS_PER_YEAR: u32 = 12;
/// Loan terms, in years, the CLI and API accept.
pub const STANDARD_LOAN_TERMS: [u32; 4] = [15, 20, 25, 30];
/// Samples per sweep axis when the caller does not choose.
pub const DEFAULT_POINTS_PER_AXIS: usize = 10;

/// Market assumptions applied to every price-axis sample, as a fraction of price.
pub const SWEEP_PROPERTY_TAX_RATE: f64 = 0.01;
pub const SWEEP_INSURANCE_RATE: f64 = 0.003;

/// One home purchase to evaluate. The down payment is always held as an
/// absolute amount; see `percent_to_amount` for the other representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub home_price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub monthly_income: f64,
    pub monthly_debts: f64,
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
}

impl Scenario {
    pub fn new(
        home_price: f64,
        down_payment: f64,
        interest_rate: f64,
        loan_term_years: u32,
        monthly_income: f64,
    ) -> Self {
        Self {
            home_price,
            down_payment,
            interest_rate,
            loan_term_years,
            monthly_income,
            monthly_debts: 0.0,
            property_tax_annual: 0.0,
            insurance_annual: 0.0,
            hoa_monthly: 0.0,
        }
    }

    pub fn with_monthly_debts(mut self, monthly_debts: f64) -> Self {
        self.monthly_debts = monthly_debts;
        self
    }

    pub fn with_property_tax_annual(mut self, property_tax_annual: f64) -> Self {
        self.property_tax_annual = property_tax_annual;
        self
    }

    pub fn with_insurance_annual(mut self, insurance_annual: f64) -> Self {
        self.insurance_annual = insurance_annual;
        self
    }

    pub fn with_hoa_monthly(mut self, hoa_monthly: f64) -> Self {
        self.hoa_monthly = hoa_monthly;
        self
    }

    pub fn loan_amount(&self) -> f64 {
        self.home_price - self.down_payment
    }

    /// Checks every invariant the engine relies on, reporting the first violation.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let fields = [
            ("home_price", self.home_price),
            ("down_payment", self.down_payment),
            ("interest_rate", self.interest_rate),
            ("monthly_income", self.monthly_income),
            ("monthly_debts", self.monthly_debts),
            ("property_tax_annual", self.property_tax_annual),
            ("insurance_annual", self.insurance_annual),
            ("hoa_monthly", self.hoa_monthly),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(InvalidInputError::NonFinite { field, value });
            }
        }

        for (field, value) in [
            ("home_price", self.home_price),
            ("monthly_income", self.monthly_income),
        ] {
            if value <= 0.0 {
                return Err(InvalidInputError::NonPositive { field, value });
            }
        }

        for (field, value) in fields {
            if value < 0.0 {
                return Err(InvalidInputError::Negative { field, value });
            }
        }

        if self.loan_term_years == 0 {
            return Err(InvalidInputError::ZeroLoanTerm);
        }

        if self.down_payment >= self.home_price {
            return Err(InvalidInputError::DownPaymentTooLarge {
                down_payment: self.down_payment,
                home_price: self.home_price,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub loan_amount: f64,
    pub down_payment_amount: f64,
    pub down_payment_percent: f64,
    pub monthly_principal_interest: f64,
    pub monthly_property_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_hoa: f64,
    pub total_monthly_payment: f64,
    pub front_end_ratio: f64,
    pub back_end_ratio: f64,
    pub total_payments: f64,
    pub total_interest: f64,
    pub affordable: bool,
}

impl Metrics {
    pub fn breakdown(&self) -> PaymentBreakdown {
        let components = [
            (CostComponent::PrincipalInterest, self.monthly_principal_interest),
            (CostComponent::PropertyTax, self.monthly_property_tax),
            (CostComponent::Insurance, self.monthly_insurance),
            (CostComponent::Hoa, self.monthly_hoa),
        ];
        let slices = components
            .into_iter()
            .filter(|(_, amount)| *amount > 0.0)
            .map(|(component, amount)| BreakdownSlice {
                component,
                amount,
                share_percent: 100.0 * amount / self.total_monthly_payment,
            })
            .collect();
        PaymentBreakdown { slices }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostComponent {
    PrincipalInterest,
    PropertyTax,
    Insurance,
    Hoa,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSlice {
    pub component: CostComponent,
    pub amount: f64,
    pub share_percent: f64,
}

/// Monthly cost components with a positive amount, in fixed display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentBreakdown {
    pub slices: Vec<BreakdownSlice>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepAxis {
    HomePrice,
    InterestRate,
    DownPayment,
}

impl SweepAxis {
    pub const ALL: [SweepAxis; 3] = [
        SweepAxis::HomePrice,
        SweepAxis::InterestRate,
        SweepAxis::DownPayment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SweepAxis::HomePrice => "home price",
            SweepAxis::InterestRate => "interest rate",
            SweepAxis::DownPayment => "down payment",
        }
    }
}

/// Closed interval sampled by the sweep. Equal bounds are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRange {
    pub min: f64,
    pub max: f64,
}

impl SweepRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, axis: SweepAxis) -> Result<(), InvalidInputError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(InvalidInputError::InvalidRange {
                axis: axis.name(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub axis: SweepAxis,
    pub value: f64,
    pub metrics: Metrics,
}
