use super::ordering::sort_roster;
use super::types::{AssignOutcome, Player, DEFAULT_QUARTERS, QUARTER_CAPACITY};

/// In-memory lineup for one team: the roster plus one assignment set per quarter.
///
/// Assignment sets hold player ids. An id appears at most once per quarter and a
/// quarter never holds more than [`QUARTER_CAPACITY`] ids. The same player may be
/// assigned to several quarters.
#[derive(Debug, Clone)]
pub struct LineupPlanner {
    team_id: Option<String>,
    persisted: Vec<Player>,
    temporary: Vec<Player>,
    quarters: Vec<Vec<String>>,
    next_temp_id: u64,
}

impl Default for LineupPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_QUARTERS)
    }
}

impl LineupPlanner {
    pub fn new(quarter_count: usize) -> Self {
        Self {
            team_id: None,
            persisted: Vec::new(),
            temporary: Vec::new(),
            quarters: vec![Vec::new(); quarter_count.max(1)],
            next_temp_id: 1,
        }
    }

    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    /// Switches the active team. Temporary players are dropped and every quarter
    /// is emptied; the persisted roster stays until the caller reloads it.
    pub fn set_team(&mut self, team_id: impl Into<String>) {
        self.team_id = Some(team_id.into());
        self.temporary.clear();
        for quarter in &mut self.quarters {
            quarter.clear();
        }
    }

    /// Replaces the persisted roster. Assignments to players that are no longer
    /// present are kept and resolve to nothing on lookup.
    ///
    /// A temporary player whose id now belongs to a persisted player gets a fresh
    /// id, and its quarter assignments follow it.
    pub fn set_roster(&mut self, players: Vec<Player>) {
        self.persisted = players;

        let clashing: Vec<usize> = self
            .temporary
            .iter()
            .enumerate()
            .filter(|(_, t)| self.persisted.iter().any(|p| p.id == t.id))
            .map(|(index, _)| index)
            .collect();
        for index in clashing {
            let new_id = self.next_temporary_id();
            let old_id = std::mem::replace(&mut self.temporary[index].id, new_id.clone());
            for quarter in &mut self.quarters {
                for id in quarter.iter_mut().filter(|id| **id == old_id) {
                    *id = new_id.clone();
                }
            }
            log::debug!("Temporary player {} renamed to {} after roster reload", old_id, new_id);
        }
    }

    /// Adds a session-only player. Input is expected to be validated already.
    pub fn add_temporary_player(&mut self, name: &str, number: Option<&str>) -> Player {
        let id = self.next_temporary_id();
        let player = Player {
            id,
            name: name.to_string(),
            number: number.map(str::to_string),
            is_temporary: true,
        };
        self.temporary.push(player.clone());
        player
    }

    fn next_temporary_id(&mut self) -> String {
        loop {
            let candidate = format!("temp-{}", self.next_temp_id);
            self.next_temp_id += 1;
            if self.find_player(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Persisted players followed by temporary ones, in insertion order
    pub fn roster(&self) -> Vec<Player> {
        self.persisted.iter().chain(self.temporary.iter()).cloned().collect()
    }

    pub fn temporary_players(&self) -> &[Player] {
        &self.temporary
    }

    /// Roster in display order (see [`sort_roster`])
    pub fn sorted_roster(&self) -> Vec<Player> {
        sort_roster(&self.roster())
    }

    pub fn find_player(&self, player_id: &str) -> Option<&Player> {
        self.persisted
            .iter()
            .chain(self.temporary.iter())
            .find(|p| p.id == player_id)
    }

    pub fn quarter_count(&self) -> usize {
        self.quarters.len()
    }

    /// Resizes the quarter list. Growing appends empty quarters, shrinking drops
    /// quarters from the end together with their assignments.
    pub fn set_quarter_count(&mut self, count: usize) {
        let count = count.max(1);
        if count == self.quarters.len() {
            return;
        }
        self.quarters.resize_with(count, Vec::new);
    }

    pub fn quarter(&self, index: usize) -> Option<&[String]> {
        self.quarters.get(index).map(|q| q.as_slice())
    }

    pub fn quarters(&self) -> &[Vec<String>] {
        &self.quarters
    }

    pub fn is_quarter_full(&self, index: usize) -> bool {
        self.quarters
            .get(index)
            .map(|q| q.len() >= QUARTER_CAPACITY)
            .unwrap_or(false)
    }

    pub fn assign_to_quarter(&mut self, quarter_index: usize, player_id: &str) -> AssignOutcome {
        let Some(quarter) = self.quarters.get_mut(quarter_index) else {
            return AssignOutcome::InvalidQuarter;
        };
        if quarter.iter().any(|id| id == player_id) {
            return AssignOutcome::AlreadyAssigned;
        }
        if quarter.len() >= QUARTER_CAPACITY {
            return AssignOutcome::QuarterFull;
        }
        quarter.push(player_id.to_string());
        AssignOutcome::Success
    }

    /// Removes a player from one quarter. Returns false if they were not in it.
    pub fn unassign_from_quarter(&mut self, quarter_index: usize, player_id: &str) -> bool {
        match self.quarters.get_mut(quarter_index) {
            Some(quarter) => {
                let before = quarter.len();
                quarter.retain(|id| id != player_id);
                quarter.len() != before
            }
            None => false,
        }
    }
}
