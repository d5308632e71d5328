use chrono::NaiveDate;
use coop_lending_core::loan::{
    LoanRecord, LoanTerms, ModificationRequest, RequestStatus, RequestType,
};
use coop_lending_core::schedule::{
    build_schedule, project_schedule, project_schedule_with, ModificationEvent,
    ProjectionOptions, RowStatus, ScheduleInput,
};
use coop_lending_core::{CoopLendingError, IncreasePolicy, LendingSettings, YearMonth};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn standard_loan(principal: Decimal) -> LoanTerms {
    LoanTerms {
        principal,
        annual_interest_rate_pct: dec!(10),
        monthly_principal_payment: dec!(2000),
        issue_date: date(2024, 1, 15),
    }
}

fn increase_in_march() -> Vec<ModificationEvent> {
    vec![ModificationEvent::AmountIncrease {
        amount: dec!(20000),
        effective_date: date(2024, 3, 12),
    }]
}

// ===========================================================================
// Baseline scenarios
// ===========================================================================

#[test]
fn test_standard_loan_first_row() {
    let rows = project_schedule(&standard_loan(dec!(100000)), &[]);
    let first = &rows[0];
    assert_eq!((first.calendar_year, first.calendar_month), (2024, 2));
    assert_eq!(first.opening_balance, dec!(100000));
    assert_eq!(first.interest_portion.round_dp(2), dec!(833.33));
    assert_eq!(first.principal_portion, dec!(2000));
    assert_eq!(first.closing_balance, dec!(98000));
    assert!(first.notes.is_empty());
}

#[test]
fn test_balances_chain_between_rows() {
    let rows = project_schedule(&standard_loan(dec!(100000)), &[]);
    for pair in rows.windows(2) {
        assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        assert_eq!(pair[1].month_index, pair[0].month_index + 1);
    }
    assert_eq!(rows.last().unwrap().closing_balance, Decimal::ZERO);
}

#[test]
fn test_single_iteration_payoff() {
    let loan = LoanTerms {
        principal: dec!(1000),
        annual_interest_rate_pct: Decimal::ZERO,
        monthly_principal_payment: dec!(1000000),
        issue_date: date(2024, 1, 15),
    };
    let rows = project_schedule(&loan, &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].principal_portion, dec!(1000));
    assert_eq!(rows[0].interest_portion, Decimal::ZERO);
    assert_eq!(rows[0].closing_balance, Decimal::ZERO);
}

// ===========================================================================
// Amount increases under both policies
// ===========================================================================

#[test]
fn test_increase_already_applied_only_annotates() {
    // Recorded principal already carries the March increase.
    let rows = project_schedule(&standard_loan(dec!(120000)), &increase_in_march());
    let march = &rows[1];
    assert_eq!((march.calendar_year, march.calendar_month), (2024, 3));
    assert_eq!(march.notes, vec!["Loan amount increased by 20000".to_string()]);
    assert_eq!(march.opening_balance, rows[0].closing_balance);
    assert_eq!(march.opening_balance, dec!(118000));
    assert_eq!(rows.len(), 60);
}

#[test]
fn test_increase_applied_in_effective_month_raises_balance() {
    let options = ProjectionOptions {
        increase_policy: IncreasePolicy::ApplyInEffectiveMonth,
        ..Default::default()
    };
    let rows = project_schedule_with(&standard_loan(dec!(100000)), &increase_in_march(), &options);
    assert_eq!(rows[0].closing_balance, dec!(98000));
    let march = &rows[1];
    assert_eq!(march.opening_balance, dec!(118000));
    assert_eq!(march.closing_balance, dec!(116000));
    assert_eq!(march.notes.len(), 1);
    // Same payoff as a 120000 loan issued with the increase baked in.
    assert_eq!(rows.len(), 60);
}

#[test]
fn test_increase_before_first_month_is_not_reapplied() {
    let options = ProjectionOptions {
        increase_policy: IncreasePolicy::ApplyInEffectiveMonth,
        ..Default::default()
    };
    let events = vec![ModificationEvent::AmountIncrease {
        amount: dec!(20000),
        effective_date: date(2024, 1, 20),
    }];
    let rows = project_schedule_with(&standard_loan(dec!(100000)), &events, &options);
    assert_eq!(rows[0].opening_balance, dec!(100000));
    assert!(rows.iter().all(|r| r.notes.is_empty()));
}

// ===========================================================================
// Iteration cap
// ===========================================================================

#[test]
fn test_never_more_than_1200_rows() {
    let loan = LoanTerms {
        principal: dec!(100000),
        annual_interest_rate_pct: dec!(10),
        monthly_principal_payment: dec!(0.01),
        issue_date: date(2024, 1, 15),
    };
    let rows = project_schedule(&loan, &[]);
    assert_eq!(rows.len(), 1200);
    let last = rows.last().unwrap();
    assert_eq!(last.status, RowStatus::Truncated);
    assert_eq!(rows.iter().filter(|r| r.is_truncated()).count(), 1);
}

#[test]
fn test_cap_clamped_to_hundred_years() {
    let options = ProjectionOptions {
        max_months: 5000,
        ..Default::default()
    };
    let loan = LoanTerms {
        principal: dec!(100000),
        annual_interest_rate_pct: Decimal::ZERO,
        monthly_principal_payment: Decimal::ZERO,
        issue_date: date(2024, 1, 15),
    };
    assert_eq!(project_schedule_with(&loan, &[], &options).len(), 1200);
}

// ===========================================================================
// Record-driven projection
// ===========================================================================

#[test]
fn test_build_schedule_from_record_ignores_unapproved_requests() {
    let record = LoanRecord {
        principal: dec!(10000),
        interest_rate: dec!(12),
        monthly_principal_payment: dec!(1000),
        issue_date: date(2024, 1, 15),
        modification_requests: vec![
            ModificationRequest {
                kind: RequestType::PaymentChange,
                requested_value: dec!(4000),
                status: RequestStatus::Approved,
                request_date: date(2024, 2, 1),
                approval_date: Some(date(2024, 2, 3)),
                effective_month: Some(3),
                effective_year: Some(2024),
            },
            ModificationRequest {
                kind: RequestType::PaymentChange,
                requested_value: dec!(9000),
                status: RequestStatus::Rejected,
                request_date: date(2024, 2, 1),
                approval_date: None,
                effective_month: Some(4),
                effective_year: Some(2024),
            },
        ],
    };
    let out = build_schedule(&ScheduleInput {
        loan: record,
        settings: LendingSettings::default(),
    })
    .unwrap();
    let s = &out.result;

    // Feb 1000, Mar 1000, Apr 4000 (override), then 1000 a month for 4000
    assert_eq!(s.rows[2].principal_portion, dec!(4000));
    assert_eq!(s.rows[3].principal_portion, dec!(1000));
    assert_eq!(s.months, 7);
    assert_eq!(s.total_principal, dec!(10000));
    assert_eq!(s.payoff_month, Some(YearMonth::new(2024, 8).unwrap()));
}

#[test]
fn test_build_schedule_warns_on_increase_after_payoff() {
    let record = LoanRecord {
        principal: dec!(3000),
        interest_rate: dec!(0),
        monthly_principal_payment: dec!(1000),
        issue_date: date(2024, 1, 15),
        modification_requests: vec![ModificationRequest {
            kind: RequestType::AmountIncrease,
            requested_value: dec!(500),
            status: RequestStatus::Approved,
            request_date: date(2024, 9, 1),
            approval_date: Some(date(2024, 9, 2)),
            effective_month: None,
            effective_year: None,
        }],
    };
    let out = build_schedule(&ScheduleInput {
        loan: record,
        settings: LendingSettings::default(),
    })
    .unwrap();
    assert_eq!(out.result.months, 3);
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Affordability against the peak balance
// ===========================================================================

fn record_with_march_increase(payment: Decimal) -> LoanRecord {
    LoanRecord {
        principal: dec!(100000),
        interest_rate: dec!(10),
        monthly_principal_payment: payment,
        issue_date: date(2024, 1, 15),
        modification_requests: vec![ModificationRequest {
            kind: RequestType::AmountIncrease,
            requested_value: dec!(20000),
            status: RequestStatus::Approved,
            request_date: date(2024, 3, 1),
            approval_date: Some(date(2024, 3, 12)),
            effective_month: None,
            effective_year: None,
        }],
    }
}

fn settings_with(policy: IncreasePolicy) -> LendingSettings {
    LendingSettings {
        increase_policy: policy,
        ..Default::default()
    }
}

#[test]
fn test_increase_in_effective_month_rejects_payment_below_later_interest() {
    // 900 beats the 833.33 of February, but March opens at 119100 and
    // accrues 992.50.
    let result = build_schedule(&ScheduleInput {
        loan: record_with_march_increase(dec!(900)),
        settings: settings_with(IncreasePolicy::ApplyInEffectiveMonth),
    });
    assert!(matches!(result, Err(CoopLendingError::Unaffordable(_))));
}

#[test]
fn test_same_record_is_affordable_when_increase_already_applied() {
    let out = build_schedule(&ScheduleInput {
        loan: record_with_march_increase(dec!(900)),
        settings: settings_with(IncreasePolicy::AlreadyApplied),
    })
    .unwrap();
    assert!(!out.result.truncated);
}

#[test]
fn test_payment_above_peak_interest_is_accepted() {
    // March opens at 119000 and accrues 991.67
    let out = build_schedule(&ScheduleInput {
        loan: record_with_march_increase(dec!(1000)),
        settings: settings_with(IncreasePolicy::ApplyInEffectiveMonth),
    })
    .unwrap();
    let s = &out.result;
    assert_eq!(s.rows[1].opening_balance, dec!(119000));
    assert!(s.rows.iter().all(|r| r.interest_portion < dec!(1000)));
    assert_eq!(s.total_principal, dec!(120000));
}
