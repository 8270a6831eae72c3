use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::planner::Player;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("missing data file {}", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

/// A user's role on a team as reported by the backend. Role and permission
/// names are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub team_id: String,
    pub user_id: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl Membership {
    pub fn allows(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Read side of the remote team store
pub trait TeamDirectory: Send + Sync {
    /// Teams the user is affiliated with
    fn teams_for_user(&self, user_id: &str) -> Result<Vec<Team>, DirectoryError>;
    fn team(&self, team_id: &str) -> Result<Option<Team>, DirectoryError>;
    /// Persisted players of a team
    fn roster(&self, team_id: &str) -> Result<Vec<Player>, DirectoryError>;
    fn membership(&self, team_id: &str, user_id: &str) -> Result<Option<Membership>, DirectoryError>;
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerRow {
    id: Option<String>,
    team_id: Option<String>,
    name: Option<String>,
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MembershipRow {
    team_id: Option<String>,
    user_id: Option<String>,
    role: Option<String>,
    permissions: Option<String>,
}

/// Returns the trimmed value, or None when it is missing or blank
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Splits a `;`-separated permission list
fn parse_permissions(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Directory backed by CSV exports of the team store:
/// `teams.csv` (id,name), `players.csv` (id,team_id,name,number) and
/// `memberships.csv` (team_id,user_id,role,permissions).
///
/// Files are read on every call so a fresh export shows up on the next roster reload.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    data_dir: PathBuf,
}

impl CsvDirectory {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn read_rows<T>(&self, file_name: &str) -> Result<Vec<T>, DirectoryError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let path = self.data_dir.join(file_name);
        if !path.exists() {
            return Err(DirectoryError::MissingFile(path));
        }
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(&path)
            .map_err(|source| DirectoryError::Csv { path: path.clone(), source })?;

        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: T = result.map_err(|source| DirectoryError::Csv { path: path.clone(), source })?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn load_teams(&self) -> Result<Vec<Team>, DirectoryError> {
        let rows: Vec<TeamRow> = self.read_rows("teams.csv")?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(Team {
                    id: non_empty(row.id)?,
                    name: non_empty(row.name)?,
                })
            })
            .collect())
    }

    fn load_memberships(&self) -> Result<Vec<Membership>, DirectoryError> {
        let rows: Vec<MembershipRow> = self.read_rows("memberships.csv")?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(Membership {
                    team_id: non_empty(row.team_id)?,
                    user_id: non_empty(row.user_id)?,
                    role: non_empty(row.role).unwrap_or_default(),
                    permissions: parse_permissions(row.permissions),
                })
            })
            .collect())
    }
}

impl TeamDirectory for CsvDirectory {
    fn teams_for_user(&self, user_id: &str) -> Result<Vec<Team>, DirectoryError> {
        let team_ids: Vec<String> = self
            .load_memberships()?
            .into_iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.team_id)
            .collect();
        let mut teams: Vec<Team> = self
            .load_teams()?
            .into_iter()
            .filter(|t| team_ids.contains(&t.id))
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn team(&self, team_id: &str) -> Result<Option<Team>, DirectoryError> {
        Ok(self.load_teams()?.into_iter().find(|t| t.id == team_id))
    }

    fn roster(&self, team_id: &str) -> Result<Vec<Player>, DirectoryError> {
        let rows: Vec<PlayerRow> = self.read_rows("players.csv")?;
        let mut players: Vec<Player> = Vec::new();
        // Repeated ids replace the earlier row in place
        let mut positions: HashMap<String, usize> = HashMap::new();

        for row in rows {
            if non_empty(row.team_id).as_deref() != Some(team_id) {
                continue;
            }
            let (Some(id), Some(name)) = (non_empty(row.id), non_empty(row.name)) else {
                continue;
            };
            let player = Player::persisted(id.clone(), name, non_empty(row.number));
            match positions.get(&id) {
                Some(&index) => players[index] = player,
                None => {
                    positions.insert(id, players.len());
                    players.push(player);
                }
            }
        }
        Ok(players)
    }

    fn membership(&self, team_id: &str, user_id: &str) -> Result<Option<Membership>, DirectoryError> {
        Ok(self
            .load_memberships()?
            .into_iter()
            .find(|m| m.team_id == team_id && m.user_id == user_id))
    }
}
