use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, YearMonth};

/// An approved change to an active loan. Immutable once approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModificationEvent {
    /// Principal increase, effective on the date it was approved.
    AmountIncrease {
        amount: Money,
        effective_date: NaiveDate,
    },
    /// One-month override of the monthly principal payment.
    PaymentChange {
        new_monthly_principal: Money,
        effective_month: YearMonth,
    },
}

impl ModificationEvent {
    pub fn effective_month(&self) -> YearMonth {
        match self {
            ModificationEvent::AmountIncrease { effective_date, .. } => {
                YearMonth::of(*effective_date)
            }
            ModificationEvent::PaymentChange {
                effective_month, ..
            } => *effective_month,
        }
    }
}

/// Events split by kind and ordered chronologically. Ties keep input order.
#[derive(Debug, Default)]
pub(crate) struct PartitionedEvents {
    /// (month, new monthly principal)
    pub payment_changes: Vec<(YearMonth, Money)>,
    /// (approval date, amount)
    pub amount_increases: Vec<(NaiveDate, Money)>,
}

impl PartitionedEvents {
    pub fn from_events(events: &[ModificationEvent]) -> Self {
        let mut partitioned = PartitionedEvents::default();
        for event in events {
            match event {
                ModificationEvent::AmountIncrease {
                    amount,
                    effective_date,
                } => partitioned.amount_increases.push((*effective_date, *amount)),
                ModificationEvent::PaymentChange {
                    new_monthly_principal,
                    effective_month,
                } => partitioned
                    .payment_changes
                    .push((*effective_month, *new_monthly_principal)),
            }
        }
        partitioned.payment_changes.sort_by_key(|(m, _)| m.ordinal());
        partitioned.amount_increases.sort_by_key(|(d, _)| *d);
        partitioned
    }

    pub fn increases_in(&self, month: YearMonth) -> impl Iterator<Item = Money> + '_ {
        self.amount_increases
            .iter()
            .filter(move |(date, _)| YearMonth::of(*date) == month)
            .map(|(_, amount)| *amount)
    }

    pub fn payment_change_in(&self, month: YearMonth) -> Option<Money> {
        self.payment_changes
            .iter()
            .find(|(m, _)| *m == month)
            .map(|(_, amount)| *amount)
    }
}
