pub mod error;
pub mod settings;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "schedule")]
pub mod loan;

#[cfg(feature = "schedule")]
pub mod schedule;

pub use error::CoopLendingError;
pub use settings::{IncreasePolicy, LendingSettings};
pub use types::*;

/// Standard result type for all coop-lending operations
pub type CoopLendingResult<T> = Result<T, CoopLendingError>;
