use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    BACK_END_RATIO_LIMIT, ComparisonRanges, DEFAULT_POINTS_PER_AXIS, FRONT_END_RATIO_LIMIT,
    Metrics, PaymentBreakdown, STANDARD_LOAN_TERMS, Scenario, SweepAxis, SweepPoint,
    affordability_rate, default_comparison_ranges, default_down_payment, default_property_tax,
    down_payment_bounds, evaluate, generate_comparisons, percent_to_amount, savings_months,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordabilityPayload {
    home_price: Option<f64>,
    down_payment: Option<f64>,
    down_payment_percent: Option<f64>,
    interest_rate: Option<f64>,
    loan_term_years: Option<u32>,
    monthly_income: Option<f64>,
    monthly_debts: Option<f64>,
    property_tax_annual: Option<f64>,
    insurance_annual: Option<f64>,
    hoa_monthly: Option<f64>,

    points_per_axis: Option<usize>,
    price_min: Option<f64>,
    price_max: Option<f64>,
    rate_min: Option<f64>,
    rate_max: Option<f64>,
    down_payment_min: Option<f64>,
    down_payment_max: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "affordability",
    about = "Home affordability estimator (amortized payment, DTI ratios, sensitivity sweeps)"
)]
struct Cli {
    #[arg(long)]
    home_price: f64,
    #[arg(
        long,
        help = "Down payment in dollars; defaults to 20% of home price, capped at 1,000,000"
    )]
    down_payment: Option<f64>,
    #[arg(
        long,
        conflicts_with = "down_payment",
        help = "Down payment as a percent of home price, e.g. 20"
    )]
    down_payment_percent: Option<f64>,
    #[arg(long, default_value_t = 6.5, help = "Annual interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30, help = "Loan term in years: 15, 20, 25 or 30")]
    loan_term_years: u32,
    #[arg(long, help = "Gross monthly income")]
    monthly_income: f64,
    #[arg(long, default_value_t = 0.0, help = "Other monthly debt payments")]
    monthly_debts: f64,
    #[arg(
        long,
        help = "Annual property tax; defaults to 1.05% of home price"
    )]
    property_tax_annual: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    insurance_annual: f64,
    #[arg(long, default_value_t = 0.0)]
    hoa_monthly: f64,
    #[arg(long, help = "Also run the price, rate and down payment sweeps")]
    compare: bool,
    #[arg(long, default_value_t = DEFAULT_POINTS_PER_AXIS)]
    points_per_axis: usize,
    #[arg(long, help = "Lowest swept home price; defaults to 70% of home price")]
    price_min: Option<f64>,
    #[arg(long, help = "Highest swept home price; defaults to 130% of home price")]
    price_max: Option<f64>,
    #[arg(long, help = "Lowest swept rate; defaults to rate - 2, at least 1")]
    rate_min: Option<f64>,
    #[arg(long, help = "Highest swept rate; defaults to rate + 2")]
    rate_max: Option<f64>,
    #[arg(long, help = "Lowest swept down payment; defaults to 5% of home price")]
    down_payment_min: Option<f64>,
    #[arg(long, help = "Highest swept down payment; defaults to 80% of home price")]
    down_payment_max: Option<f64>,
}

#[derive(Debug)]
struct ApiRequest {
    scenario: Scenario,
    ranges: ComparisonRanges,
    points_per_axis: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct Thresholds {
    front_end_ratio: f64,
    back_end_ratio: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResponse {
    scenario: Scenario,
    metrics: Metrics,
    breakdown: PaymentBreakdown,
    savings_months: Option<f64>,
    thresholds: Thresholds,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AxisAffordability {
    axis: SweepAxis,
    affordable_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(flatten)]
    evaluation: EvaluateResponse,
    ranges: ComparisonRanges,
    points_per_axis: usize,
    comparisons: Vec<SweepPoint>,
    affordability_rates: Vec<AxisAffordability>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_scenario(cli: &Cli) -> Result<Scenario, String> {
    if !cli.home_price.is_finite() || cli.home_price <= 0.0 {
        return Err("--home-price must be > 0".to_string());
    }

    if !cli.monthly_income.is_finite() || cli.monthly_income <= 0.0 {
        return Err("--monthly-income must be > 0".to_string());
    }

    if !STANDARD_LOAN_TERMS.contains(&cli.loan_term_years) {
        return Err(format!(
            "--loan-term-years must be one of {STANDARD_LOAN_TERMS:?}"
        ));
    }

    if !cli.interest_rate.is_finite() || cli.interest_rate < 0.0 {
        return Err("--interest-rate must be >= 0".to_string());
    }

    for (name, value) in [
        ("--monthly-debts", cli.monthly_debts),
        ("--insurance-annual", cli.insurance_annual),
        ("--hoa-monthly", cli.hoa_monthly),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    let down_payment = match (cli.down_payment, cli.down_payment_percent) {
        (Some(_), Some(_)) => {
            return Err(
                "--down-payment and --down-payment-percent cannot both be set".to_string(),
            );
        }
        (Some(amount), None) => amount,
        (None, Some(percent)) => {
            if !(0.0..100.0).contains(&percent) {
                return Err("--down-payment-percent must be >= 0 and < 100".to_string());
            }
            percent_to_amount(cli.home_price, percent).map_err(|e| e.to_string())?
        }
        (None, None) => default_down_payment(cli.home_price),
    };

    if !down_payment.is_finite() || down_payment < 0.0 {
        return Err("--down-payment must be >= 0".to_string());
    }

    if down_payment >= cli.home_price {
        return Err("--down-payment must be below --home-price".to_string());
    }

    let (min_down_payment, _) = down_payment_bounds(cli.home_price);
    if down_payment < min_down_payment {
        return Err(format!(
            "--down-payment must be at least {min_down_payment} (3% of price, minimum 1000)"
        ));
    }

    let property_tax_annual = cli
        .property_tax_annual
        .unwrap_or_else(|| default_property_tax(cli.home_price));
    if !property_tax_annual.is_finite() || property_tax_annual < 0.0 {
        return Err("--property-tax-annual must be >= 0".to_string());
    }

    let scenario = Scenario::new(
        cli.home_price,
        down_payment,
        cli.interest_rate,
        cli.loan_term_years,
        cli.monthly_income,
    )
    .with_monthly_debts(cli.monthly_debts)
    .with_property_tax_annual(property_tax_annual)
    .with_insurance_annual(cli.insurance_annual)
    .with_hoa_monthly(cli.hoa_monthly);

    scenario.validate().map_err(|e| e.to_string())?;
    Ok(scenario)
}

fn build_ranges(cli: &Cli, scenario: &Scenario) -> Result<ComparisonRanges, String> {
    if cli.points_per_axis < 2 {
        return Err("--points-per-axis must be >= 2".to_string());
    }

    let mut ranges = default_comparison_ranges(scenario);
    if let Some(v) = cli.price_min {
        ranges.price.min = v;
    }
    if let Some(v) = cli.price_max {
        ranges.price.max = v;
    }
    if let Some(v) = cli.rate_min {
        ranges.rate.min = v;
    }
    if let Some(v) = cli.rate_max {
        ranges.rate.max = v;
    }
    if let Some(v) = cli.down_payment_min {
        ranges.down_payment.min = v;
    }
    if let Some(v) = cli.down_payment_max {
        ranges.down_payment.max = v;
    }

    for (name, range) in [
        ("--price-min/--price-max", ranges.price),
        ("--rate-min/--rate-max", ranges.rate),
        ("--down-payment-min/--down-payment-max", ranges.down_payment),
    ] {
        if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
            return Err(format!("{name} must be finite with min <= max"));
        }
    }

    Ok(ranges)
}

fn build_api_request(cli: &Cli) -> Result<ApiRequest, String> {
    let scenario = build_scenario(cli)?;
    let ranges = build_ranges(cli, &scenario)?;
    Ok(ApiRequest {
        scenario,
        ranges,
        points_per_axis: cli.points_per_axis,
    })
}

fn build_evaluate_response(scenario: &Scenario) -> Result<EvaluateResponse, String> {
    let metrics = evaluate(scenario).map_err(|e| e.to_string())?;
    Ok(EvaluateResponse {
        scenario: scenario.clone(),
        breakdown: metrics.breakdown(),
        savings_months: savings_months(metrics.down_payment_amount, scenario.monthly_income),
        thresholds: Thresholds {
            front_end_ratio: FRONT_END_RATIO_LIMIT,
            back_end_ratio: BACK_END_RATIO_LIMIT,
        },
        metrics,
    })
}

fn build_analyze_response(request: &ApiRequest) -> Result<AnalyzeResponse, String> {
    let evaluation = build_evaluate_response(&request.scenario)?;
    let comparisons = generate_comparisons(
        &request.scenario,
        request.ranges.price,
        request.ranges.rate,
        request.ranges.down_payment,
        request.points_per_axis,
    )
    .map_err(|e| format!("comparison sweep failed: {e}"))?;
    let affordability_rates = SweepAxis::ALL
        .into_iter()
        .map(|axis| AxisAffordability {
            axis,
            affordable_percent: affordability_rate(&comparisons, axis),
        })
        .collect();

    Ok(AnalyzeResponse {
        evaluation,
        ranges: request.ranges,
        points_per_axis: request.points_per_axis,
        comparisons,
        affordability_rates,
    })
}

/// One-shot evaluation from command-line flags, printed as JSON on stdout.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let request = build_api_request(&cli)?;
    let json = if cli.compare {
        let response = build_analyze_response(&request)?;
        serde_json::to_string_pretty(&response)
    } else {
        let response = build_evaluate_response(&request.scenario)?;
        serde_json::to_string_pretty(&response)
    };
    let json = json.map_err(|e| format!("failed to serialize result: {e}"))?;

    tracing::debug!(
        home_price = request.scenario.home_price,
        compare = cli.compare,
        "evaluated scenario"
    );
    println!("{json}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "affordability HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/api/evaluate");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/evaluate",
            get(evaluate_get_handler).post(evaluate_post_handler),
        )
        .route(
            "/api/analyze",
            get(analyze_get_handler).post(analyze_post_handler),
        )
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn evaluate_get_handler(Query(payload): Query<AffordabilityPayload>) -> Response {
    evaluate_handler_impl(payload).await
}

async fn evaluate_post_handler(Json(payload): Json<AffordabilityPayload>) -> Response {
    evaluate_handler_impl(payload).await
}

async fn analyze_get_handler(Query(payload): Query<AffordabilityPayload>) -> Response {
    analyze_handler_impl(payload).await
}

async fn analyze_post_handler(Json(payload): Json<AffordabilityPayload>) -> Response {
    analyze_handler_impl(payload).await
}

async fn evaluate_handler_impl(payload: AffordabilityPayload) -> Response {
    let result = api_request_from_payload(payload)
        .and_then(|request| build_evaluate_response(&request.scenario));
    match result {
        Ok(response) => {
            tracing::info!(
                affordable = response.metrics.affordable,
                front_end_ratio = response.metrics.front_end_ratio,
                "evaluate request handled"
            );
            json_response(StatusCode::OK, response)
        }
        Err(msg) => {
            tracing::warn!(error = %msg, "evaluate request rejected");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn analyze_handler_impl(payload: AffordabilityPayload) -> Response {
    let result =
        api_request_from_payload(payload).and_then(|request| build_analyze_response(&request));
    match result {
        Ok(response) => {
            tracing::info!(
                points = response.comparisons.len(),
                affordable = response.evaluation.metrics.affordable,
                "analyze request handled"
            );
            json_response(StatusCode::OK, response)
        }
        Err(msg) => {
            tracing::warn!(error = %msg, "analyze request rejected");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<AffordabilityPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: AffordabilityPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.home_price {
        cli.home_price = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = Some(v);
    }
    if let Some(v) = payload.down_payment_percent {
        cli.down_payment_percent = Some(v);
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v;
    }
    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = payload.monthly_debts {
        cli.monthly_debts = v;
    }
    if let Some(v) = payload.property_tax_annual {
        cli.property_tax_annual = Some(v);
    }
    if let Some(v) = payload.insurance_annual {
        cli.insurance_annual = v;
    }
    if let Some(v) = payload.hoa_monthly {
        cli.hoa_monthly = v;
    }

    if let Some(v) = payload.points_per_axis {
        cli.points_per_axis = v;
    }
    cli.price_min = payload.price_min;
    cli.price_max = payload.price_max;
    cli.rate_min = payload.rate_min;
    cli.rate_max = payload.rate_max;
    cli.down_payment_min = payload.down_payment_min;
    cli.down_payment_max = payload.down_payment_max;

    build_api_request(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        home_price: 1_850_000.0,
        down_payment: None,
        down_payment_percent: None,
        interest_rate: 6.5,
        loan_term_years: 30,
        monthly_income: 25_000.0,
        monthly_debts: 2_500.0,
        property_tax_annual: None,
        insurance_annual: 2_800.0,
        hoa_monthly: 75.0,
        compare: false,
        points_per_axis: DEFAULT_POINTS_PER_AXIS,
        price_min: None,
        price_max: None,
        rate_min: None,
        rate_max: None,
        down_payment_min: None,
        down_payment_max: None,
    }
}
