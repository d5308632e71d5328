use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::calculator::{loan_tenure, monthly_interest, monthly_payment, Tenure};
use crate::amortization::funds::{required_funds_with, FundRequirement};
use crate::error::CoopLendingError;
use crate::settings::LendingSettings;
use crate::types::{with_metadata, ComputationOutput, Money, RatePct, Years};
use crate::CoopLendingResult;

/// Input for quoting a new loan application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuoteInput {
    pub amount: Money,
    pub term_years: Years,
    /// Overrides the society's loan rate when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_pct: Option<RatePct>,
}

/// Summary figures for a loan application. Money values are rounded to cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuote {
    pub amount: Money,
    pub annual_rate_pct: RatePct,
    pub term_months: Decimal,
    pub monthly_payment: Money,
    pub first_month_interest: Money,
    pub total_repayable: Money,
    pub total_interest: Money,
    pub tenure: Tenure,
    pub required_funds: FundRequirement,
}

/// Quote a level-payment loan and the collateral it requires.
pub fn quote_loan(
    input: &LoanQuoteInput,
    settings: &LendingSettings,
) -> CoopLendingResult<ComputationOutput<LoanQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.amount <= Decimal::ZERO {
        return Err(CoopLendingError::InvalidInput {
            field: "amount".into(),
            reason: "Loan amount must be positive".into(),
        });
    }
    if input.term_years <= Decimal::ZERO {
        return Err(CoopLendingError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be positive".into(),
        });
    }

    let rate = input.annual_rate_pct.unwrap_or(settings.loan_interest_rate_pct);
    if rate < Decimal::ZERO {
        return Err(CoopLendingError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if rate.is_zero() {
        warnings.push("Zero interest rate: payments are straight-line principal".into());
    }

    let term_months = input
        .term_years
        .checked_mul(dec!(12))
        .ok_or_else(|| out_of_range("term_years"))?;
    if !term_months.fract().is_zero() {
        warnings.push(format!(
            "Term of {term_months} months is fractional; the final payment is partial"
        ));
    }

    let payment = monthly_payment(input.amount, rate, input.term_years);
    let tenure = loan_tenure(input.amount, rate, payment);
    let total_repayable = payment
        .checked_mul(term_months)
        .ok_or_else(|| out_of_range("amount"))?;

    let output = LoanQuote {
        amount: input.amount,
        annual_rate_pct: rate,
        term_months,
        monthly_payment: payment.round_dp(2),
        first_month_interest: monthly_interest(input.amount, rate).round_dp(2),
        total_repayable: total_repayable.round_dp(2),
        total_interest: (total_repayable - input.amount).round_dp(2),
        tenure,
        required_funds: required_funds_with(input.amount, settings),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-Payment Annuity Quote",
        &serde_json::json!({
            "amount": input.amount.to_string(),
            "rate_pct": rate.to_string(),
            "term_years": input.term_years.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn out_of_range(field: &str) -> CoopLendingError {
    CoopLendingError::InvalidInput {
        field: field.into(),
        reason: "Value exceeds the representable decimal range".into(),
    }
}
