//! Closed-form amortization arithmetic.
//!
//! Every function here is total. Degenerate input (non-positive principal,
//! negative rate, zero term) produces a zero result instead of an error, so the
//! functions can be driven straight from a live-editing form where partial
//! keystrokes are routinely invalid. Arithmetic that would leave the 96-bit
//! decimal range degrades the same way (zero, or [`Tenure::Never`]). Rates are
//! annual percentages (10 = 10%). Nothing is rounded; callers round for display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, RatePct, Years};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);
/// Decimal places kept on the fractional period count before rounding up.
/// Logarithm noise below this would otherwise push an exact term into an
/// extra month.
const TENURE_NOISE_DP: u32 = 6;

/// Number of monthly payments needed to retire a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Months(u32),
    /// The payment never exceeds the interest accruing on the balance.
    Never,
}

impl Tenure {
    pub fn months(&self) -> Option<u32> {
        match self {
            Tenure::Months(m) => Some(*m),
            Tenure::Never => None,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Tenure::Never)
    }
}

/// Annual percentage to monthly fraction: 12 -> 0.01.
pub fn monthly_rate(annual_rate_pct: RatePct) -> Rate {
    annual_rate_pct / PERCENT / MONTHS_PER_YEAR
}

/// Level monthly payment (principal + interest) for an annuity loan.
pub fn monthly_payment(principal: Money, annual_rate_pct: RatePct, term_years: Years) -> Money {
    if principal <= Decimal::ZERO
        || annual_rate_pct < Decimal::ZERO
        || term_years <= Decimal::ZERO
    {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_pct);
    let n = match term_years.checked_mul(MONTHS_PER_YEAR) {
        Some(n) => n,
        None => return Decimal::ZERO,
    };

    if r.is_zero() {
        return principal.checked_div(n).unwrap_or(Decimal::ZERO);
    }

    let growth = match (Decimal::ONE + r).checked_powd(n) {
        Some(g) => g,
        None => return Decimal::ZERO,
    };
    let denominator = growth - Decimal::ONE;
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(denominator))
        .unwrap_or(Decimal::ZERO)
}

/// Months needed to retire `principal` with a fixed `monthly_payment`.
///
/// Returns [`Tenure::Never`] when the payment does not exceed the first
/// month's interest. A partial final month counts as a full month.
pub fn loan_tenure(principal: Money, annual_rate_pct: RatePct, monthly_payment: Money) -> Tenure {
    if principal <= Decimal::ZERO
        || annual_rate_pct < Decimal::ZERO
        || monthly_payment <= Decimal::ZERO
    {
        return Tenure::Months(0);
    }

    let r = monthly_rate(annual_rate_pct);
    // p * rate / 1200, dividing last so round thresholds stay exact
    let first_interest = match principal
        .checked_mul(annual_rate_pct)
        .and_then(|v| v.checked_div(PERCENT * MONTHS_PER_YEAR))
    {
        Some(i) => i,
        None => return Tenure::Never,
    };
    if monthly_payment <= first_interest {
        return Tenure::Never;
    }

    if r.is_zero() {
        return match principal.checked_div(monthly_payment) {
            Some(periods) => months_from(periods.round_dp(TENURE_NOISE_DP).ceil()),
            None => Tenure::Never,
        };
    }

    let ratio = first_interest / monthly_payment;
    let (numerator, denominator) = match (
        (Decimal::ONE - ratio).checked_ln(),
        (Decimal::ONE + r).checked_ln(),
    ) {
        (Some(num), Some(den)) if !den.is_zero() => (num, den),
        _ => return Tenure::Never,
    };

    match (-numerator).checked_div(denominator) {
        Some(periods) => months_from(periods.round_dp(TENURE_NOISE_DP).ceil()),
        None => Tenure::Never,
    }
}

/// One month of simple interest on the outstanding balance.
pub fn monthly_interest(outstanding_principal: Money, annual_rate_pct: RatePct) -> Money {
    if outstanding_principal <= Decimal::ZERO || annual_rate_pct <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    outstanding_principal
        .checked_mul(annual_rate_pct / MONTHS_PER_YEAR / PERCENT)
        .unwrap_or(Decimal::ZERO)
}

fn months_from(periods: Decimal) -> Tenure {
    match periods.to_u32() {
        Some(m) => Tenure::Months(m),
        None => Tenure::Never,
    }
}
