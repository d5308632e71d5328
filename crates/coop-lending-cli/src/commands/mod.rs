pub mod amortization;
pub mod schedule;
