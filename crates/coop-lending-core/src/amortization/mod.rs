pub mod calculator;
pub mod funds;
pub mod quote;
