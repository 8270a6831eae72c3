use serde::{Serialize, Deserialize};

/// Maximum number of players in a single quarter
pub const QUARTER_CAPACITY: usize = 5;

/// Number of quarters a fresh planner starts with
pub const DEFAULT_QUARTERS: usize = 4;

/// A player available for lineup assignment.
/// Persisted players come from the team directory, temporary ones only live in the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub number: Option<String>,
    pub is_temporary: bool,
}

impl Player {
    pub fn persisted(id: impl Into<String>, name: impl Into<String>, number: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number,
            is_temporary: false,
        }
    }
}

/// Result of trying to put a player into a quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignOutcome {
    Success,
    InvalidQuarter,
    AlreadyAssigned,
    QuarterFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_serialize_in_kebab_case() {
        assert_eq!(serde_json::to_value(AssignOutcome::AlreadyAssigned).unwrap(), "already-assigned");
        assert_eq!(serde_json::to_value(AssignOutcome::QuarterFull).unwrap(), "quarter-full");
        assert_eq!(serde_json::to_value(AssignOutcome::InvalidQuarter).unwrap(), "invalid-quarter");
        let parsed: AssignOutcome = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(parsed, AssignOutcome::Success);
    }
}
