//! Bank-wide lending settings.
//!
//! The society's rates and fund percentages are passed explicitly into every
//! calculation that needs them; nothing in this crate reads global state.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CoopLendingError;
use crate::types::{Rate, RatePct};
use crate::CoopLendingResult;

/// Default share-fund collateral requirement (5% of the loan amount).
pub const DEFAULT_SHARE_FUND_PCT: Rate = dec!(0.05);
/// Default guaranteed-fund collateral requirement (5% of the loan amount).
pub const DEFAULT_GUARANTEED_FUND_PCT: Rate = dec!(0.05);
/// 100 years of monthly rows.
pub const DEFAULT_MAX_SCHEDULE_MONTHS: u32 = 1200;

/// How approved principal increases relate to the starting balance handed to
/// the schedule projector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncreasePolicy {
    /// The loan's recorded principal already includes every approved increase;
    /// the projector only annotates the month the increase was approved.
    #[default]
    AlreadyApplied,
    /// The recorded principal excludes increases dated in or after the first
    /// projected month; each is added to the opening balance of its month.
    ApplyInEffectiveMonth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingSettings {
    /// Annual loan interest rate in percent (10 = 10%).
    pub loan_interest_rate_pct: RatePct,
    /// Annual thrift savings rate in percent.
    pub thrift_rate_pct: RatePct,
    /// Share fund required per unit of loan amount.
    pub share_fund_pct: Rate,
    /// Guaranteed fund required per unit of loan amount.
    pub guaranteed_fund_pct: Rate,
    pub max_schedule_months: u32,
    pub increase_policy: IncreasePolicy,
}

impl Default for LendingSettings {
    fn default() -> Self {
        LendingSettings {
            loan_interest_rate_pct: dec!(10),
            thrift_rate_pct: dec!(6),
            share_fund_pct: DEFAULT_SHARE_FUND_PCT,
            guaranteed_fund_pct: DEFAULT_GUARANTEED_FUND_PCT,
            max_schedule_months: DEFAULT_MAX_SCHEDULE_MONTHS,
            increase_policy: IncreasePolicy::default(),
        }
    }
}

impl LendingSettings {
    pub fn validate(&self) -> CoopLendingResult<()> {
        if self.loan_interest_rate_pct < Decimal::ZERO {
            return Err(CoopLendingError::InvalidInput {
                field: "loan_interest_rate_pct".into(),
                reason: "Loan interest rate cannot be negative".into(),
            });
        }
        if self.thrift_rate_pct < Decimal::ZERO {
            return Err(CoopLendingError::InvalidInput {
                field: "thrift_rate_pct".into(),
                reason: "Thrift rate cannot be negative".into(),
            });
        }
        for (field, pct) in [
            ("share_fund_pct", self.share_fund_pct),
            ("guaranteed_fund_pct", self.guaranteed_fund_pct),
        ] {
            if pct < Decimal::ZERO || pct > Decimal::ONE {
                return Err(CoopLendingError::InvalidInput {
                    field: field.into(),
                    reason: "Fund percentage must be a fraction between 0 and 1".into(),
                });
            }
        }
        if self.max_schedule_months == 0 || self.max_schedule_months > DEFAULT_MAX_SCHEDULE_MONTHS {
            return Err(CoopLendingError::InvalidInput {
                field: "max_schedule_months".into(),
                reason: format!("Must be between 1 and {DEFAULT_MAX_SCHEDULE_MONTHS}"),
            });
        }
        Ok(())
    }

    /// Parse settings from a JSON document; missing fields take their defaults.
    pub fn from_json(raw: &str) -> CoopLendingResult<Self> {
        let settings: LendingSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = LendingSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.share_fund_pct, dec!(0.05));
        assert_eq!(settings.guaranteed_fund_pct, dec!(0.05));
        assert_eq!(settings.max_schedule_months, 1200);
        assert_eq!(settings.increase_policy, IncreasePolicy::AlreadyApplied);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings =
            LendingSettings::from_json(r#"{"loan_interest_rate_pct": "12.5"}"#).unwrap();
        assert_eq!(settings.loan_interest_rate_pct, dec!(12.5));
        assert_eq!(settings.thrift_rate_pct, dec!(6));
    }

    #[test]
    fn test_increase_policy_parses_snake_case() {
        let settings = LendingSettings::from_json(
            r#"{"increase_policy": "apply_in_effective_month"}"#,
        )
        .unwrap();
        assert_eq!(
            settings.increase_policy,
            IncreasePolicy::ApplyInEffectiveMonth
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let settings = LendingSettings {
            loan_interest_rate_pct: dec!(-1),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_fund_pct_above_one_rejected() {
        let settings = LendingSettings {
            share_fund_pct: dec!(1.5),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cap_above_hundred_years_rejected() {
        let settings = LendingSettings {
            max_schedule_months: 1201,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
