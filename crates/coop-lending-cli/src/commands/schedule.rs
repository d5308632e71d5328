use clap::{Args, ValueEnum};
use serde_json::Value;

use coop_lending_core::loan::LoanRecord;
use coop_lending_core::schedule::{self, ScheduleInput};
use coop_lending_core::{IncreasePolicy, LendingSettings};

use crate::input;

#[derive(Debug, Clone, ValueEnum)]
pub enum PolicyArg {
    /// Recorded principal already includes approved increases
    AlreadyApplied,
    /// Add each increase to the balance in the month it was approved
    ApplyInEffectiveMonth,
}

impl From<PolicyArg> for IncreasePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AlreadyApplied => IncreasePolicy::AlreadyApplied,
            PolicyArg::ApplyInEffectiveMonth => IncreasePolicy::ApplyInEffectiveMonth,
        }
    }
}

/// Arguments for schedule projection
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to the loan record JSON (camelCase, as stored)
    #[arg(long)]
    pub input: Option<String>,

    /// How approved principal increases relate to the recorded principal
    #[arg(long)]
    pub increase_policy: Option<PolicyArg>,

    /// Maximum number of schedule rows (1..=1200)
    #[arg(long)]
    pub max_months: Option<u32>,
}

pub fn run_schedule(
    args: ScheduleArgs,
    mut settings: LendingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanRecord = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <loan.json> or stdin required for schedule".into());
    };

    if let Some(policy) = args.increase_policy {
        settings.increase_policy = policy.into();
    }
    if let Some(max) = args.max_months {
        settings.max_schedule_months = max;
    }

    let result = schedule::build_schedule(&ScheduleInput { loan, settings })?;
    Ok(serde_json::to_value(result)?)
}
