use serde::{Deserialize, Serialize};
use super::ValidationError;

/// Inputs of the "add temporary player" control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Number,
}

/// Current contents of the temporary-player form, filled from input-change events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporaryPlayerForm {
    pub name: String,
    pub number: String,
}

/// Validated input, ready for the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemporaryPlayer {
    pub name: String,
    pub number: Option<String>,
}

impl TemporaryPlayerForm {
    /// Records the latest value of one input
    pub fn apply(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Name => self.name = value.to_string(),
            FormField::Number => self.number = value.to_string(),
        }
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.number.clear();
    }

    pub fn validate(&self) -> Result<NewTemporaryPlayer, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("Player name is required"));
        }

        let number = self.number.trim();
        if !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("Jersey number must contain only digits"));
        }

        Ok(NewTemporaryPlayer {
            name: name.to_string(),
            number: if number.is_empty() { None } else { Some(number.to_string()) },
        })
    }
}
