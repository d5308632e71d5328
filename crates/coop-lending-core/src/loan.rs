//! Loan records as stored by the society's loan-management application, and
//! their conversion into the immutable inputs of the schedule projector.
//!
//! Records use camelCase field names because they are produced by the web
//! application's document store. Only approved modification requests reach
//! the projector; pending and rejected ones are dropped.

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoopLendingError;
use crate::schedule::events::ModificationEvent;
use crate::types::{Money, RatePct, YearMonth};
use crate::CoopLendingResult;

/// The numeric terms the projector works from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_interest_rate_pct: RatePct,
    pub monthly_principal_payment: Money,
    pub issue_date: NaiveDate,
}

impl LoanTerms {
    pub fn validate(&self) -> CoopLendingResult<()> {
        if self.principal < Decimal::ZERO {
            return Err(CoopLendingError::InvalidInput {
                field: "principal".into(),
                reason: "Principal cannot be negative".into(),
            });
        }
        if self.annual_interest_rate_pct < Decimal::ZERO {
            return Err(CoopLendingError::InvalidInput {
                field: "annual_interest_rate_pct".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        if self.monthly_principal_payment < Decimal::ZERO {
            return Err(CoopLendingError::InvalidInput {
                field: "monthly_principal_payment".into(),
                reason: "Monthly principal payment cannot be negative".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    AmountIncrease,
    PaymentChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A member's request to change an active loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRequest {
    #[serde(rename = "type")]
    pub kind: RequestType,
    /// Increase amount, or the new monthly principal payment.
    pub requested_value: Money,
    pub status: RequestStatus,
    pub request_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<NaiveDate>,
    /// 0-indexed month (0 = January), payment changes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    /// Current principal, including every increase approved so far.
    pub principal: Money,
    /// Annual rate in percent.
    pub interest_rate: RatePct,
    pub monthly_principal_payment: Money,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub modification_requests: Vec<ModificationRequest>,
}

impl LoanRecord {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_interest_rate_pct: self.interest_rate,
            monthly_principal_payment: self.monthly_principal_payment,
            issue_date: self.issue_date,
        }
    }

    /// Approved requests as projector events, plus a warning for every
    /// approved request that had to be adjusted or skipped.
    pub fn approved_events(&self) -> (Vec<ModificationEvent>, Vec<String>) {
        let mut events = Vec::new();
        let mut warnings = Vec::new();

        for (idx, req) in self.modification_requests.iter().enumerate() {
            if req.status != RequestStatus::Approved {
                continue;
            }
            match req.kind {
                RequestType::AmountIncrease => {
                    let effective_date = match req.approval_date {
                        Some(d) => d,
                        None => {
                            let msg = format!(
                                "Request {idx}: approved increase has no approval date; using request date {}",
                                req.request_date
                            );
                            warn!("{msg}");
                            warnings.push(msg);
                            req.request_date
                        }
                    };
                    events.push(ModificationEvent::AmountIncrease {
                        amount: req.requested_value,
                        effective_date,
                    });
                }
                RequestType::PaymentChange => match payment_change_month(req) {
                    Ok(effective_month) => events.push(ModificationEvent::PaymentChange {
                        new_monthly_principal: req.requested_value,
                        effective_month,
                    }),
                    Err(e) => {
                        let msg = format!("Request {idx}: payment change skipped ({e})");
                        warn!("{msg}");
                        warnings.push(msg);
                    }
                },
            }
        }

        (events, warnings)
    }
}

fn payment_change_month(req: &ModificationRequest) -> CoopLendingResult<YearMonth> {
    match (req.effective_year, req.effective_month) {
        (Some(year), Some(month0)) => YearMonth::from_zero_based(year, month0),
        _ => Err(CoopLendingError::DateError(
            "effective month and year are required".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(kind: RequestType, status: RequestStatus) -> ModificationRequest {
        ModificationRequest {
            kind,
            requested_value: dec!(1000),
            status,
            request_date: date(2024, 2, 10),
            approval_date: Some(date(2024, 3, 5)),
            effective_month: Some(3),
            effective_year: Some(2024),
        }
    }

    fn record(requests: Vec<ModificationRequest>) -> LoanRecord {
        LoanRecord {
            principal: dec!(100000),
            interest_rate: dec!(10),
            monthly_principal_payment: dec!(2000),
            issue_date: date(2024, 1, 15),
            modification_requests: requests,
        }
    }

    #[test]
    fn test_only_approved_requests_become_events() {
        let rec = record(vec![
            request(RequestType::AmountIncrease, RequestStatus::Pending),
            request(RequestType::AmountIncrease, RequestStatus::Rejected),
            request(RequestType::AmountIncrease, RequestStatus::Approved),
        ]);
        let (events, warnings) = rec.approved_events();
        assert_eq!(events.len(), 1);
        assert!(warnings.is_empty());
        assert_eq!(
            events[0],
            ModificationEvent::AmountIncrease {
                amount: dec!(1000),
                effective_date: date(2024, 3, 5),
            }
        );
    }

    #[test]
    fn test_payment_change_month_is_zero_based_on_record() {
        let rec = record(vec![request(
            RequestType::PaymentChange,
            RequestStatus::Approved,
        )]);
        let (events, _) = rec.approved_events();
        assert_eq!(
            events[0].effective_month(),
            YearMonth::new(2024, 4).unwrap()
        );
    }

    #[test]
    fn test_increase_without_approval_date_falls_back() {
        let mut req = request(RequestType::AmountIncrease, RequestStatus::Approved);
        req.approval_date = None;
        let (events, warnings) = record(vec![req]).approved_events();
        assert_eq!(events[0].effective_month(), YearMonth::new(2024, 2).unwrap());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_payment_change_without_month_skipped() {
        let mut req = request(RequestType::PaymentChange, RequestStatus::Approved);
        req.effective_month = None;
        let mut bad_month = request(RequestType::PaymentChange, RequestStatus::Approved);
        bad_month.effective_month = Some(12);
        let (events, warnings) = record(vec![req, bad_month]).approved_events();
        assert!(events.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_record_parses_camel_case_json() {
        let raw = r#"{
            "principal": 100000,
            "interestRate": 10,
            "monthlyPrincipalPayment": 2000,
            "issueDate": "2024-01-15",
            "modificationRequests": [
                {"type": "payment_change", "requestedValue": 2500, "status": "approved",
                 "requestDate": "2024-03-01", "approvalDate": "2024-03-02",
                 "effectiveMonth": 4, "effectiveYear": 2024}
            ]
        }"#;
        let rec: LoanRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.terms().principal, dec!(100000));
        assert_eq!(rec.modification_requests[0].kind, RequestType::PaymentChange);
    }

    #[test]
    fn test_terms_validation() {
        let mut terms = record(vec![]).terms();
        assert!(terms.validate().is_ok());
        terms.monthly_principal_payment = dec!(-1);
        assert!(terms.validate().is_err());
    }
}
