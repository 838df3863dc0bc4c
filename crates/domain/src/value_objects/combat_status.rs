//! Combat session lifecycle.
//!
//! ```text
//! Preparing ──start──▶ Active ◀──resume── Paused
//!     │                  │ └────pause─────▶ │
//!     │                  ▼                  │
//!     └──conclude──▶ Concluded ◀──conclude──┘
//! ```
//!
//! Every mutating operation names itself as a [`CombatOperation`] and asks the
//! current [`CombatStatus`] whether it is permitted *before* anything is touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifecycle status of a combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    /// Roster is being assembled; round is 0
    Preparing,
    /// Turns advance and actions are recorded
    Active,
    /// Turn advancement blocked; roster editable for late arrivals
    Paused,
    /// Terminal
    Concluded,
}

/// Every state-changing operation the session state machine gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOperation {
    AddParticipant,
    UpdateParticipant,
    StartCombat,
    AdvanceTurn,
    Pause,
    Resume,
    Conclude,
    RecordAction,
}

impl CombatOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddParticipant => "add a participant",
            Self::UpdateParticipant => "update a participant",
            Self::StartCombat => "start combat",
            Self::AdvanceTurn => "advance the turn",
            Self::Pause => "pause combat",
            Self::Resume => "resume combat",
            Self::Conclude => "conclude combat",
            Self::RecordAction => "record an action",
        }
    }
}

impl CombatStatus {
    /// Whether `op` may run while the session is in this status.
    pub fn permits(self, op: CombatOperation) -> bool {
        use CombatOperation::*;
        use CombatStatus::*;

        match (self, op) {
            (Concluded, _) => false,
            (Preparing | Paused, AddParticipant | StartCombat) => true,
            (_, UpdateParticipant | Conclude) => true,
            (Active, AdvanceTurn | Pause | RecordAction) => true,
            (Paused, Resume) => true,
            _ => false,
        }
    }

    /// Fails with `InvalidStateTransition` when `op` is not permitted.
    pub fn require(self, op: CombatOperation) -> Result<(), DomainError> {
        if self.permits(op) {
            Ok(())
        } else {
            Err(DomainError::invalid_state_transition(format!(
                "cannot {} while combat is {}",
                op.as_str(),
                self
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Concluded => "concluded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Concluded)
    }
}

impl fmt::Display for CombatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of the single pause/resume toggle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusToggle {
    Pause,
    Resume,
}

impl StatusToggle {
    pub fn operation(self) -> CombatOperation {
        match self {
            Self::Pause => CombatOperation::Pause,
            Self::Resume => CombatOperation::Resume,
        }
    }

    /// Status the session lands in once the toggle succeeds.
    pub fn target_status(self) -> CombatStatus {
        match self {
            Self::Pause => CombatStatus::Paused,
            Self::Resume => CombatStatus::Active,
        }
    }
}

impl FromStr for StatusToggle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            other => Err(DomainError::validation(format!(
                "unknown status action '{}', expected \"pause\" or \"resume\"",
                other
            ))),
        }
    }
}
