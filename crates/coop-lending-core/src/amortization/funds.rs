//! Collateral fund requirements and thrift accrual.
//!
//! A member borrowing from the society must hold a share-fund balance and a
//! guaranteed-fund balance, each a fixed fraction of the requested amount.
//! The two requirements are independent and never summed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::calculator::monthly_interest;
use crate::error::CoopLendingError;
use crate::settings::{LendingSettings, DEFAULT_GUARANTEED_FUND_PCT, DEFAULT_SHARE_FUND_PCT};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::CoopLendingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRequirement {
    pub required_share: Money,
    pub required_guaranteed: Money,
}

impl FundRequirement {
    pub const NONE: FundRequirement = FundRequirement {
        required_share: Decimal::ZERO,
        required_guaranteed: Decimal::ZERO,
    };
}

/// Share and guaranteed fund requirement at the standard 5% each.
pub fn required_funds(loan_amount: Money) -> FundRequirement {
    requirement(loan_amount, DEFAULT_SHARE_FUND_PCT, DEFAULT_GUARANTEED_FUND_PCT)
}

/// Fund requirement using the society's configured percentages.
pub fn required_funds_with(loan_amount: Money, settings: &LendingSettings) -> FundRequirement {
    requirement(
        loan_amount,
        settings.share_fund_pct,
        settings.guaranteed_fund_pct,
    )
}

fn requirement(loan_amount: Money, share_pct: Decimal, guaranteed_pct: Decimal) -> FundRequirement {
    if loan_amount <= Decimal::ZERO {
        return FundRequirement::NONE;
    }
    FundRequirement {
        required_share: loan_amount.checked_mul(share_pct).unwrap_or(Decimal::ZERO),
        required_guaranteed: loan_amount.checked_mul(guaranteed_pct).unwrap_or(Decimal::ZERO),
    }
}

/// One month of thrift interest at the society's thrift rate.
pub fn monthly_thrift_interest(thrift_balance: Money, settings: &LendingSettings) -> Money {
    monthly_interest(thrift_balance, settings.thrift_rate_pct)
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundEligibilityInput {
    pub loan_amount: Money,
    pub share_balance: Money,
    pub guaranteed_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundEligibility {
    pub requirement: FundRequirement,
    pub share_shortfall: Money,
    pub guaranteed_shortfall: Money,
    pub eligible: bool,
}

/// Check a member's fund balances against the requirement for a loan.
pub fn assess_eligibility(
    input: &FundEligibilityInput,
    settings: &LendingSettings,
) -> CoopLendingResult<ComputationOutput<FundEligibility>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.loan_amount <= Decimal::ZERO {
        return Err(CoopLendingError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be positive".into(),
        });
    }
    if input.share_balance < Decimal::ZERO || input.guaranteed_balance < Decimal::ZERO {
        return Err(CoopLendingError::InvalidInput {
            field: "share_balance/guaranteed_balance".into(),
            reason: "Fund balances cannot be negative".into(),
        });
    }

    let req = required_funds_with(input.loan_amount, settings);
    let share_shortfall = (req.required_share - input.share_balance).max(Decimal::ZERO);
    let guaranteed_shortfall =
        (req.required_guaranteed - input.guaranteed_balance).max(Decimal::ZERO);

    if share_shortfall > Decimal::ZERO {
        warnings.push(format!("Share fund short by {share_shortfall}"));
    }
    if guaranteed_shortfall > Decimal::ZERO {
        warnings.push(format!("Guaranteed fund short by {guaranteed_shortfall}"));
    }

    let output = FundEligibility {
        requirement: req,
        share_shortfall,
        guaranteed_shortfall,
        eligible: share_shortfall.is_zero() && guaranteed_shortfall.is_zero(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Collateral Fund Eligibility",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "share_fund_pct": settings.share_fund_pct.to_string(),
            "guaranteed_fund_pct": settings.guaranteed_fund_pct.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
