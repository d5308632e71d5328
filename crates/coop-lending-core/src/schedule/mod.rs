pub mod events;
pub mod projector;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::calculator::monthly_interest;
use crate::error::CoopLendingError;
use crate::loan::{LoanRecord, LoanTerms};
use crate::settings::{IncreasePolicy, LendingSettings, DEFAULT_MAX_SCHEDULE_MONTHS};
use crate::types::{with_metadata, ComputationOutput, Money, YearMonth};
use crate::CoopLendingResult;

pub use events::ModificationEvent;
pub use projector::{
    project_schedule, project_schedule_with, ProjectionOptions, RowStatus, ScheduleRow,
};

/// Input for a full schedule projection from a stored loan record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan: LoanRecord,
    #[serde(default)]
    pub settings: LendingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub rows: Vec<ScheduleRow>,
    pub months: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_payments: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_month: Option<YearMonth>,
    pub truncated: bool,
}

/// Reject loans whose monthly principal payments cannot outpace the interest
/// accruing on the largest balance the loan reaches.
///
/// Under [`IncreasePolicy::AlreadyApplied`] the balance only falls, so the
/// peak is the recorded principal. Under
/// [`IncreasePolicy::ApplyInEffectiveMonth`] increases can raise it later on,
/// and the peak is read off the projected schedule.
pub fn validate_affordability(
    terms: &LoanTerms,
    events: &[ModificationEvent],
    policy: IncreasePolicy,
) -> CoopLendingResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Ok(());
    }

    let peak = peak_balance(terms, events, policy);
    let peak_interest = monthly_interest(peak, terms.annual_interest_rate_pct);
    if terms.monthly_principal_payment <= peak_interest {
        return Err(CoopLendingError::Unaffordable(format!(
            "monthly principal payment {} does not exceed interest {} on balance {}",
            terms.monthly_principal_payment,
            peak_interest.round_dp(2),
            peak.round_dp(2)
        )));
    }

    for event in events {
        if let ModificationEvent::PaymentChange {
            new_monthly_principal,
            effective_month,
        } = event
        {
            if *new_monthly_principal <= peak_interest {
                return Err(CoopLendingError::Unaffordable(format!(
                    "payment change to {new_monthly_principal} in {effective_month} does not exceed interest {} on balance {}",
                    peak_interest.round_dp(2),
                    peak.round_dp(2)
                )));
            }
        }
    }

    Ok(())
}

fn peak_balance(terms: &LoanTerms, events: &[ModificationEvent], policy: IncreasePolicy) -> Money {
    match policy {
        IncreasePolicy::AlreadyApplied => terms.principal,
        IncreasePolicy::ApplyInEffectiveMonth => {
            let options = ProjectionOptions {
                max_months: DEFAULT_MAX_SCHEDULE_MONTHS,
                increase_policy: policy,
            };
            project_schedule_with(terms, events, &options)
                .iter()
                .map(|r| r.opening_balance)
                .fold(terms.principal, Decimal::max)
        }
    }
}

fn checked_total(mut values: impl Iterator<Item = Money>, field: &str) -> CoopLendingResult<Money> {
    values
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| CoopLendingError::InvalidInput {
            field: field.into(),
            reason: "Schedule total exceeds the representable decimal range".into(),
        })
}

/// Validate a loan record and project its schedule with totals.
pub fn build_schedule(input: &ScheduleInput) -> CoopLendingResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();

    input.settings.validate()?;
    let terms = input.loan.terms();
    terms.validate()?;

    let (events, mut warnings) = input.loan.approved_events();
    validate_affordability(&terms, &events, input.settings.increase_policy)?;

    let options = ProjectionOptions::from(&input.settings);
    let rows = project_schedule_with(&terms, &events, &options);

    let truncated = rows.last().is_some_and(|r| r.is_truncated());
    let total_interest = checked_total(rows.iter().map(|r| r.interest_portion), "total_interest")?;
    let total_principal =
        checked_total(rows.iter().map(|r| r.principal_portion), "total_principal")?;
    let total_payments = checked_total([total_interest, total_principal].into_iter(), "total_payments")?;
    let payoff_month = if truncated {
        None
    } else {
        rows.last().map(|r| r.year_month())
    };

    if truncated {
        warnings.push(format!(
            "Schedule truncated at {} months with balance outstanding",
            options.max_months
        ));
    }
    if let Some(last) = rows.last().map(|r| r.year_month()) {
        for event in &events {
            if let ModificationEvent::AmountIncrease { amount, .. } = event {
                let month = event.effective_month();
                if month > last {
                    warnings.push(format!(
                        "Increase of {amount} dated {month} falls after the final projected month"
                    ));
                }
            }
        }
    }

    let output = ScheduleOutput {
        months: rows.len() as u32,
        total_interest,
        total_principal,
        total_payments,
        payoff_month,
        truncated,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Principal Monthly Schedule",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "rate_pct": terms.annual_interest_rate_pct.to_string(),
            "monthly_principal_payment": terms.monthly_principal_payment.to_string(),
            "issue_date": terms.issue_date.to_string(),
            "increase_policy": input.settings.increase_policy,
            "max_months": options.max_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record() -> LoanRecord {
        LoanRecord {
            principal: dec!(12000),
            interest_rate: dec!(12),
            monthly_principal_payment: dec!(1000),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            modification_requests: vec![],
        }
    }

    #[test]
    fn test_build_schedule_totals() {
        let input = ScheduleInput {
            loan: record(),
            settings: LendingSettings::default(),
        };
        let out = build_schedule(&input).unwrap();
        let s = &out.result;
        assert_eq!(s.months, 12);
        assert_eq!(s.total_principal, dec!(12000));
        // Interest on 12000, 11000, ... 1000 at 1% a month
        assert_eq!(s.total_interest, dec!(780));
        assert_eq!(s.total_payments, dec!(12780));
        assert_eq!(s.payoff_month, Some(YearMonth::new(2025, 1).unwrap()));
        assert!(!s.truncated);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unaffordable_base_payment_rejected() {
        let mut loan = record();
        loan.monthly_principal_payment = dec!(120);
        let input = ScheduleInput {
            loan,
            settings: LendingSettings::default(),
        };
        assert!(matches!(
            build_schedule(&input),
            Err(CoopLendingError::Unaffordable(_))
        ));
    }

    #[test]
    fn test_unaffordable_payment_change_rejected() {
        let terms = record().terms();
        let events = vec![ModificationEvent::PaymentChange {
            new_monthly_principal: dec!(50),
            effective_month: YearMonth::new(2024, 5).unwrap(),
        }];
        assert!(validate_affordability(&terms, &events, IncreasePolicy::AlreadyApplied).is_err());
        assert!(validate_affordability(&terms, &[], IncreasePolicy::AlreadyApplied).is_ok());
    }

    #[test]
    fn test_zero_rate_zero_payment_rejected() {
        let mut terms = record().terms();
        terms.annual_interest_rate_pct = dec!(0);
        terms.monthly_principal_payment = dec!(0);
        assert!(validate_affordability(&terms, &[], IncreasePolicy::AlreadyApplied).is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let input = ScheduleInput {
            loan: record(),
            settings: LendingSettings {
                max_schedule_months: 0,
                ..Default::default()
            },
        };
        assert!(matches!(
            build_schedule(&input),
            Err(CoopLendingError::InvalidInput { .. })
        ));
    }
}
