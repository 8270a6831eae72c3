pub mod temporary_player;
pub mod quarter_count;

use thiserror::Error;

pub use temporary_player::{FormField, NewTemporaryPlayer, TemporaryPlayerForm};
pub use quarter_count::{QuarterCountForm, MAX_QUARTERS};

/// Rejected form input. The message is shown as-is in the page's error area.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}
