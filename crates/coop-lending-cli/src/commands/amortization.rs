use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use coop_lending_core::amortization::calculator::{loan_tenure, monthly_interest, monthly_payment};
use coop_lending_core::amortization::funds::{
    self, monthly_thrift_interest, required_funds_with, FundEligibilityInput,
};
use coop_lending_core::amortization::quote::{self, LoanQuoteInput};
use coop_lending_core::{with_metadata, LendingSettings};

use crate::input;

fn scalar_output(methodology: &str, assumptions: Value, start: Instant, result: Value) -> Value {
    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(methodology, &assumptions, Vec::new(), elapsed, result);
    serde_json::to_value(output).unwrap_or_default()
}

/// Arguments for the level monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (defaults to the society's loan rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub term_years: Decimal,
}

pub fn run_payment(
    args: PaymentArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let rate = args.rate.unwrap_or(settings.loan_interest_rate_pct);
    let payment = monthly_payment(args.principal, rate, args.term_years);
    Ok(scalar_output(
        "Level-Payment Annuity",
        json!({
            "principal": args.principal.to_string(),
            "rate_pct": rate.to_string(),
            "term_years": args.term_years.to_string(),
        }),
        start,
        json!({ "monthly_payment": payment.round_dp(2).to_string() }),
    ))
}

/// Arguments for loan tenure
#[derive(Args)]
pub struct TenureArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (defaults to the society's loan rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Monthly payment (principal + interest)
    #[arg(long)]
    pub payment: Decimal,
}

pub fn run_tenure(
    args: TenureArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let rate = args.rate.unwrap_or(settings.loan_interest_rate_pct);
    let tenure = loan_tenure(args.principal, rate, args.payment);
    let result = match tenure.months() {
        Some(m) => json!({ "tenure_months": m, "retires": true }),
        None => json!({ "tenure_months": null, "retires": false }),
    };
    Ok(scalar_output(
        "Annuity Tenure",
        json!({
            "principal": args.principal.to_string(),
            "rate_pct": rate.to_string(),
            "payment": args.payment.to_string(),
        }),
        start,
        result,
    ))
}

/// Arguments for one month of interest
#[derive(Args)]
pub struct InterestArgs {
    /// Outstanding principal
    #[arg(long)]
    pub outstanding: Decimal,

    /// Annual interest rate in percent (defaults to the society's loan rate)
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_interest(
    args: InterestArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let rate = args.rate.unwrap_or(settings.loan_interest_rate_pct);
    let interest = monthly_interest(args.outstanding, rate);
    Ok(scalar_output(
        "Simple Monthly Interest",
        json!({
            "outstanding": args.outstanding.to_string(),
            "rate_pct": rate.to_string(),
        }),
        start,
        json!({ "interest": interest.round_dp(2).to_string() }),
    ))
}

/// Arguments for collateral fund requirements
#[derive(Args)]
pub struct FundsArgs {
    /// Requested loan amount
    #[arg(long)]
    pub amount: Decimal,
}

pub fn run_required_funds(
    args: FundsArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let req = required_funds_with(args.amount, settings);
    Ok(scalar_output(
        "Collateral Fund Requirement",
        json!({
            "amount": args.amount.to_string(),
            "share_fund_pct": settings.share_fund_pct.to_string(),
            "guaranteed_fund_pct": settings.guaranteed_fund_pct.to_string(),
        }),
        start,
        serde_json::to_value(req)?,
    ))
}

/// Arguments for thrift interest
#[derive(Args)]
pub struct ThriftArgs {
    /// Thrift fund balance
    #[arg(long)]
    pub balance: Decimal,
}

pub fn run_thrift_interest(
    args: ThriftArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let interest = monthly_thrift_interest(args.balance, settings);
    Ok(scalar_output(
        "Thrift Monthly Interest",
        json!({
            "balance": args.balance.to_string(),
            "thrift_rate_pct": settings.thrift_rate_pct.to_string(),
        }),
        start,
        json!({ "interest": interest.round_dp(2).to_string() }),
    ))
}

/// Arguments for fund eligibility
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Requested loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Member's share fund balance
    #[arg(long)]
    pub share_balance: Option<Decimal>,

    /// Member's guaranteed fund balance
    #[arg(long)]
    pub guaranteed_balance: Option<Decimal>,
}

pub fn run_eligibility(
    args: EligibilityArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let elig_input: FundEligibilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        FundEligibilityInput {
            loan_amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            share_balance: args.share_balance.unwrap_or(Decimal::ZERO),
            guaranteed_balance: args.guaranteed_balance.unwrap_or(Decimal::ZERO),
        }
    };

    let result = funds::assess_eligibility(&elig_input, settings)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a loan quote
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Requested loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub term_years: Option<Decimal>,

    /// Annual interest rate in percent (defaults to the society's loan rate)
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_quote(
    args: QuoteArgs,
    settings: &LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: LoanQuoteInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        LoanQuoteInput {
            amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            term_years: args
                .term_years
                .ok_or("--term-years is required (or provide --input)")?,
            annual_rate_pct: args.rate,
        }
    };

    let result = quote::quote_loan(&quote_input, settings)?;
    Ok(serde_json::to_value(result)?)
}
