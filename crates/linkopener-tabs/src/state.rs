//! Session State Machine
//!
//! ```text
//! NoSession
//!   ↓ ensure_session
//! Active
//!   ↓ failed probe / last owned tab closed / shutdown
//! NoSession
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No automation session exists
    NoSession,
    /// A session exists and answered its last call
    Active,
}

impl SessionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        match (self, target) {
            (SessionState::NoSession, SessionState::Active) => true,
            (SessionState::Active, SessionState::NoSession) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::NoSession => "no_session",
            SessionState::Active => "active",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no_session" => Ok(SessionState::NoSession),
            "active" => Ok(SessionState::Active),
            _ => Err(format!("Unknown session state: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(SessionState::NoSession.can_transition_to(SessionState::Active));
        assert!(SessionState::Active.can_transition_to(SessionState::NoSession));
        assert!(SessionState::Active.can_transition_to(SessionState::Active));
    }

    #[test]
    fn test_round_trip_names() {
        for state in [SessionState::NoSession, SessionState::Active] {
            assert_eq!(state.as_str().parse::<SessionState>().unwrap(), state);
        }
        assert!("zombie".parse::<SessionState>().is_err());
    }
}
