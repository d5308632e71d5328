//! Month-by-month repayment schedule.
//!
//! Loans in the society repay a fixed slice of principal each month plus
//! simple interest on the opening balance. Approved modification events
//! annotate (and, under [`IncreasePolicy::ApplyInEffectiveMonth`], adjust) the
//! month they fall in. The projector is a pure function of its inputs.

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::calculator::monthly_interest;
use crate::loan::LoanTerms;
use crate::schedule::events::{ModificationEvent, PartitionedEvents};
use crate::settings::{IncreasePolicy, LendingSettings, DEFAULT_MAX_SCHEDULE_MONTHS};
use crate::types::{Money, YearMonth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    /// Hard cap on emitted rows, terminal marker included.
    pub max_months: u32,
    pub increase_policy: IncreasePolicy,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        ProjectionOptions {
            max_months: DEFAULT_MAX_SCHEDULE_MONTHS,
            increase_policy: IncreasePolicy::default(),
        }
    }
}

impl From<&LendingSettings> for ProjectionOptions {
    fn from(settings: &LendingSettings) -> Self {
        ProjectionOptions {
            max_months: settings.max_schedule_months,
            increase_policy: settings.increase_policy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Scheduled,
    /// Terminal marker: the cap was reached with a balance still outstanding.
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based position in the schedule.
    pub month_index: u32,
    /// 1-based calendar month.
    pub calendar_month: u32,
    pub calendar_year: i32,
    pub opening_balance: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub total_payment: Money,
    pub closing_balance: Money,
    pub notes: Vec<String>,
    pub status: RowStatus,
}

impl ScheduleRow {
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.calendar_year,
            month: self.calendar_month,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.status == RowStatus::Truncated
    }
}

/// Project the repayment schedule with the default cap and increase policy.
pub fn project_schedule(loan: &LoanTerms, events: &[ModificationEvent]) -> Vec<ScheduleRow> {
    project_schedule_with(loan, events, &ProjectionOptions::default())
}

/// Project the repayment schedule until the balance reaches zero.
///
/// Amortization starts the month after `issue_date`. A payment change applies
/// to its own month only. Never emits more than `options.max_months` rows; if
/// the last permitted month would leave a balance, a single
/// [`RowStatus::Truncated`] row takes its place.
pub fn project_schedule_with(
    loan: &LoanTerms,
    events: &[ModificationEvent],
    options: &ProjectionOptions,
) -> Vec<ScheduleRow> {
    let max_months = options.max_months.clamp(1, DEFAULT_MAX_SCHEDULE_MONTHS);
    let partitioned = PartitionedEvents::from_events(events);

    let mut current_principal = loan.principal;
    let mut current_month = YearMonth::of(loan.issue_date).next();
    let mut rows: Vec<ScheduleRow> = Vec::new();

    debug!(
        "projecting schedule: principal={} rate={}% payment={} from {} ({} payment changes, {} increases)",
        loan.principal,
        loan.annual_interest_rate_pct,
        loan.monthly_principal_payment,
        current_month,
        partitioned.payment_changes.len(),
        partitioned.amount_increases.len(),
    );

    loop {
        let mut notes = Vec::new();
        let mut opening = current_principal;
        let mut out_of_range = false;

        for amount in partitioned.increases_in(current_month) {
            notes.push(format!("Loan amount increased by {amount}"));
            if options.increase_policy == IncreasePolicy::ApplyInEffectiveMonth {
                match opening.checked_add(amount) {
                    Some(raised) => opening = raised,
                    None => out_of_range = true,
                }
            }
        }

        if opening <= Decimal::ZERO && !out_of_range {
            break;
        }

        let effective_payment = match partitioned.payment_change_in(current_month) {
            Some(amount) => {
                notes.push(format!("Monthly principal payment changed to {amount}"));
                amount
            }
            None => loan.monthly_principal_payment,
        };

        let interest = monthly_interest(opening, loan.annual_interest_rate_pct);
        let principal_portion = opening.min(effective_payment).max(Decimal::ZERO);
        let closing = opening - principal_portion;
        let month_index = rows.len() as u32 + 1;
        let total_payment = interest.checked_add(principal_portion);

        let Some(total_payment) = total_payment.filter(|_| !out_of_range) else {
            warn!("schedule stopped in {current_month}: balance {opening} leaves the decimal range");
            notes.push("Projection stopped: the balance exceeds the representable range".into());
            rows.push(truncated_row(month_index, current_month, opening, notes));
            break;
        };

        if month_index == max_months && closing > Decimal::ZERO {
            warn!(
                "schedule truncated after {max_months} months with {opening} outstanding"
            );
            notes.push(format!(
                "Projection stopped after {max_months} months: the payment does not retire the balance"
            ));
            rows.push(truncated_row(month_index, current_month, opening, notes));
            break;
        }

        rows.push(ScheduleRow {
            month_index,
            calendar_month: current_month.month,
            calendar_year: current_month.year,
            opening_balance: opening,
            interest_portion: interest,
            principal_portion,
            total_payment,
            closing_balance: closing,
            notes,
            status: RowStatus::Scheduled,
        });

        current_principal = closing;
        current_month = current_month.next();
    }

    debug!("schedule projected: {} rows", rows.len());
    rows
}

/// Terminal marker row: nothing is paid and the opening balance carries over.
fn truncated_row(
    month_index: u32,
    month: YearMonth,
    opening: Money,
    notes: Vec<String>,
) -> ScheduleRow {
    ScheduleRow {
        month_index,
        calendar_month: month.month,
        calendar_year: month.year,
        opening_balance: opening,
        interest_portion: Decimal::ZERO,
        principal_portion: Decimal::ZERO,
        total_payment: Decimal::ZERO,
        closing_balance: opening,
        notes,
        status: RowStatus::Truncated,
    }
}
