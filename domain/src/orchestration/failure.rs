//! Fatal vs recoverable failure classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a failure must stop the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalKind {
    /// The provider account has no credit left
    CreditBalance,
    /// The API key was rejected
    Authentication,
}

impl FatalKind {
    /// Machine-readable tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FatalKind::CreditBalance => "credit_balance",
            FatalKind::Authentication => "authentication",
        }
    }

    /// Short explanation shown to the user instead of the raw provider error
    pub fn user_message(&self) -> &'static str {
        match self {
            FatalKind::CreditBalance => {
                "Credit balance exhausted. Add credits to your provider account to continue."
            }
            FatalKind::Authentication => {
                "Invalid API key. Check the provider settings in your configuration."
            }
        }
    }
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failed unit of work aborts the run or is skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Fatal(FatalKind),
    Recoverable,
}

impl FailureClass {
    /// Tag used by `boomerang_error` when the run was cancelled by the caller
    pub const CANCELLED: &'static str = "cancelled";

    pub fn is_fatal(&self) -> bool {
        matches!(self, FailureClass::Fatal(_))
    }

    pub fn fatal_kind(&self) -> Option<FatalKind> {
        match self {
            FailureClass::Fatal(kind) => Some(*kind),
            FailureClass::Recoverable => None,
        }
    }

    /// Classification tag carried by `agent_error` and `boomerang_error`
    pub fn tag(&self) -> &'static str {
        match self {
            FailureClass::Fatal(kind) => kind.as_str(),
            FailureClass::Recoverable => "recoverable",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
