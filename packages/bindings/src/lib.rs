use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use coop_lending_core::amortization::{calculator, funds, quote};
use coop_lending_core::schedule::{self, ScheduleInput};
use coop_lending_core::LendingSettings;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn settings_from(raw: Option<LendingSettings>) -> NapiResult<LendingSettings> {
    let settings = raw.unwrap_or_default();
    settings.validate().map_err(to_napi_error)?;
    Ok(settings)
}

// ---------------------------------------------------------------------------
// Calculator (live form fields; never errors on numeric input)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PaymentRequest {
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_years: Decimal,
}

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let req: PaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payment = calculator::monthly_payment(req.principal, req.annual_rate_pct, req.term_years);
    serde_json::to_string(&payment).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct TenureRequest {
    principal: Decimal,
    annual_rate_pct: Decimal,
    monthly_payment: Decimal,
}

#[napi]
pub fn loan_tenure(input_json: String) -> NapiResult<String> {
    let req: TenureRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tenure = calculator::loan_tenure(req.principal, req.annual_rate_pct, req.monthly_payment);
    serde_json::to_string(&tenure).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct InterestRequest {
    outstanding_principal: Decimal,
    annual_rate_pct: Decimal,
}

#[napi]
pub fn monthly_interest(input_json: String) -> NapiResult<String> {
    let req: InterestRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let interest = calculator::monthly_interest(req.outstanding_principal, req.annual_rate_pct);
    serde_json::to_string(&interest).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Funds
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FundsRequest {
    loan_amount: Decimal,
    #[serde(default)]
    settings: Option<LendingSettings>,
}

#[napi]
pub fn required_funds(input_json: String) -> NapiResult<String> {
    let req: FundsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let settings = settings_from(req.settings)?;
    let requirement = funds::required_funds_with(req.loan_amount, &settings);
    serde_json::to_string(&requirement).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct EligibilityRequest {
    #[serde(flatten)]
    input: funds::FundEligibilityInput,
    #[serde(default)]
    settings: Option<LendingSettings>,
}

#[napi]
pub fn fund_eligibility(input_json: String) -> NapiResult<String> {
    let req: EligibilityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let settings = settings_from(req.settings)?;
    let output = funds::assess_eligibility(&req.input, &settings).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Quote & schedule
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct QuoteRequest {
    #[serde(flatten)]
    input: quote::LoanQuoteInput,
    #[serde(default)]
    settings: Option<LendingSettings>,
}

#[napi]
pub fn loan_quote(input_json: String) -> NapiResult<String> {
    let req: QuoteRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let settings = settings_from(req.settings)?;
    let output = quote::quote_loan(&req.input, &settings).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Input: `{ "loan": <stored loan record>, "settings": {...}? }`.
#[napi]
pub fn project_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
