pub mod types;
pub mod ordering;
pub mod lineup;

pub use types::{AssignOutcome, Player, DEFAULT_QUARTERS, QUARTER_CAPACITY};
pub use ordering::sort_roster;
pub use lineup::LineupPlanner;
