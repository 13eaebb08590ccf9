//! Support ticket models

use serde::{Deserialize, Serialize};

/// Status of a support ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Whether a ticket may move from `self` to `next`
    ///
    /// Staying in the same status is always allowed.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, Resolved)
                | (Open, Closed)
                | (InProgress, Open)
                | (InProgress, Resolved)
                | (InProgress, Closed)
                | (Resolved, Closed)
                | (Resolved, Open)
                | (Closed, Open)
        )
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress)
    }

    /// Stored names of every status that counts as open
    pub fn open_statuses() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|s| s.is_open())
            .map(|s| s.as_str())
            .collect()
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(format!("unknown ticket status '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_statuses() {
        assert_eq!(TicketStatus::open_statuses(), vec!["open", "in_progress"]);
        for status in TicketStatus::ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::InProgress));
        assert!(TicketStatus::InProgress.can_transition_to(TicketStatus::Resolved));
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Closed));
        assert!(TicketStatus::Closed.can_transition_to(TicketStatus::Open));
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Resolved));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Resolved));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::InProgress));
        assert!(!TicketStatus::Resolved.can_transition_to(TicketStatus::InProgress));
    }

    #[test]
    fn test_wire_names_match_database_values() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: TicketStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(parsed.as_str(), "resolved");
    }

    #[test]
    fn test_open_states() {
        assert!(TicketStatus::Open.is_open());
        assert!(TicketStatus::InProgress.is_open());
        assert!(!TicketStatus::Resolved.is_open());
        assert!(!TicketStatus::Closed.is_open());
    }
}
