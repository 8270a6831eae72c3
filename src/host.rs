use serde::Serialize;

use crate::directory::Team;
use crate::display::{quarter_views, QuarterView};
use crate::form::{FormField, QuarterCountForm, TemporaryPlayerForm, ValidationError};
use crate::planner::{AssignOutcome, LineupPlanner, Player, QUARTER_CAPACITY};

/// Single-line error area of the planner page. A new report replaces the old one.
#[derive(Debug, Clone, Default)]
pub struct ErrorBanner {
    message: Option<String>,
}

impl ErrorBanner {
    pub fn report(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Everything the page needs to redraw itself
#[derive(Debug, Clone, Serialize)]
pub struct PlannerSnapshot {
    pub team: Option<Team>,
    pub quarter_count: usize,
    pub capacity: usize,
    pub roster: Vec<Player>,
    pub quarters: Vec<QuarterView>,
    pub temporary_form: TemporaryPlayerForm,
    pub error: Option<String>,
}

/// Couples one planner with the team it was loaded for and the page's error area.
/// Every UI intent goes through here and is followed by a fresh snapshot.
#[derive(Debug, Default)]
pub struct LineupHost {
    planner: LineupPlanner,
    team: Option<Team>,
    temporary_form: TemporaryPlayerForm,
    banner: ErrorBanner,
}

impl LineupHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planner(&self) -> &LineupPlanner {
        &self.planner
    }

    pub fn team(&self) -> Option<&Team> {
        self.team.as_ref()
    }

    pub fn banner(&self) -> &ErrorBanner {
        &self.banner
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.banner.report(message);
    }

    /// Switches to `team` with an already fetched roster. The lineup is reset even
    /// when the same team is selected again.
    pub fn load_team(&mut self, team: Team, roster: Vec<Player>) {
        log::info!("Selected team {} with {} players", team.id, roster.len());
        self.planner.set_team(team.id.clone());
        self.planner.set_roster(roster);
        self.team = Some(team);
        self.temporary_form.reset();
        self.banner.clear();
    }

    /// Installs a freshly fetched roster if it belongs to the current team.
    /// Existing assignments are kept. Returns false for a roster of another team.
    pub fn replace_roster(&mut self, team_id: &str, roster: Vec<Player>) -> bool {
        if self.team.as_ref().map(|t| t.id.as_str()) != Some(team_id) {
            log::debug!("Ignoring roster for team {} fetched after a team switch", team_id);
            return false;
        }
        self.planner.set_roster(roster);
        log::debug!(
            "Reloaded roster for team {}: {} players, {} temporary kept",
            team_id,
            self.planner.roster().len(),
            self.planner.temporary_players().len()
        );
        true
    }

    /// Handles a roster entry dropped on a quarter
    pub fn drop_player(&mut self, quarter: usize, player_id: &str) -> Option<AssignOutcome> {
        if self.planner.find_player(player_id).is_none() {
            self.banner.report("Player not found");
            return None;
        }

        let outcome = self.planner.assign_to_quarter(quarter, player_id);
        match outcome {
            AssignOutcome::Success => self.banner.clear(),
            AssignOutcome::AlreadyAssigned => {}
            AssignOutcome::QuarterFull => {
                self.banner.report(format!("Quarter {} is already full", quarter + 1));
            }
            AssignOutcome::InvalidQuarter => {
                log::error!(
                    "Drop on quarter {} but planner only has {} quarters",
                    quarter,
                    self.planner.quarter_count()
                );
                self.banner.report(format!("Internal error: quarter {} does not exist", quarter + 1));
            }
        }
        Some(outcome)
    }

    pub fn remove_player(&mut self, quarter: usize, player_id: &str) -> bool {
        let removed = self.planner.unassign_from_quarter(quarter, player_id);
        if removed {
            self.banner.clear();
        }
        removed
    }

    /// Records an input-change event of the temporary-player form
    pub fn update_temporary_form(&mut self, field: FormField, value: &str) {
        self.temporary_form.apply(field, value);
    }

    /// Adds a temporary player from the current form contents and clears the form
    pub fn submit_temporary(&mut self) -> Result<Player, ValidationError> {
        let input = self
            .temporary_form
            .validate()
            .inspect_err(|e| self.banner.report(e.to_string()))?;
        let player = self.planner.add_temporary_player(&input.name, input.number.as_deref());
        log::debug!("Added temporary player {} ({})", player.name, player.id);
        self.temporary_form.reset();
        self.banner.clear();
        Ok(player)
    }

    pub fn change_quarter_count(&mut self, form: &QuarterCountForm) -> Result<usize, ValidationError> {
        let count = form.validate().inspect_err(|e| self.banner.report(e.to_string()))?;
        self.planner.set_quarter_count(count);
        self.banner.clear();
        Ok(self.planner.quarter_count())
    }

    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            team: self.team.clone(),
            quarter_count: self.planner.quarter_count(),
            capacity: QUARTER_CAPACITY,
            roster: self.planner.sorted_roster(),
            quarters: quarter_views(&self.planner),
            temporary_form: self.temporary_form.clone(),
            error: self.banner.message().map(str::to_string),
        }
    }
}
