//! CLI command implementations for Formic.

pub(crate) mod bots;
pub(crate) mod check;
pub(crate) mod driver;
pub(crate) mod inspect;
pub(crate) mod run;
pub(crate) mod selfplay;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

use formic::game::{CombatPolicy, FoodPlacement};

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Combat policy selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CombatArg {
    /// Focus-fire weakness comparison.
    Focus,
    /// Distance-shell mutual destruction.
    Closest,
    /// Local headcount comparison.
    Support,
    /// Split damage accumulation.
    Damage,
}

impl From<CombatArg> for CombatPolicy {
    fn from(arg: CombatArg) -> Self {
        match arg {
            CombatArg::Focus => CombatPolicy::Focus,
            CombatArg::Closest => CombatPolicy::Closest,
            CombatArg::Support => CombatPolicy::Support,
            CombatArg::Damage => CombatPolicy::Damage,
        }
    }
}

/// Food placement selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FoodArg {
    /// Uniformly random free land.
    Random,
    /// Near each player's start, round-robin.
    StartRegion,
    /// Symmetric fairness sets.
    Symmetric,
}

impl From<FoodArg> for FoodPlacement {
    fn from(arg: FoodArg) -> Self {
        match arg {
            FoodArg::Random => FoodPlacement::Random,
            FoodArg::StartRegion => FoodPlacement::StartRegion,
            FoodArg::Symmetric => FoodPlacement::Symmetric,
        }
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<formic::SetupError> for CliError {
    fn from(e: formic::SetupError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}
