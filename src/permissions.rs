use std::collections::HashMap;

use crate::directory::{DirectoryError, Membership, TeamDirectory};

/// Permission required to change a team's lineup
pub const LINEUP_EDIT: &str = "lineup.edit";

/// Caches team memberships per (team, user). Entries stay until the host
/// invalidates them explicitly; a missing membership is cached too.
#[derive(Debug, Default)]
pub struct PermissionCache {
    entries: HashMap<(String, String), Option<Membership>>,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn membership(
        &mut self,
        team_id: &str,
        user_id: &str,
        directory: &dyn TeamDirectory,
    ) -> Result<Option<Membership>, DirectoryError> {
        let key = (team_id.to_string(), user_id.to_string());
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }
        let membership = directory.membership(team_id, user_id)?;
        log::debug!("Cached membership for user {} on team {}", user_id, team_id);
        self.entries.insert(key, membership.clone());
        Ok(membership)
    }

    pub fn has_permission(
        &mut self,
        team_id: &str,
        user_id: &str,
        permission: &str,
        directory: &dyn TeamDirectory,
    ) -> Result<bool, DirectoryError> {
        Ok(self
            .membership(team_id, user_id, directory)?
            .map(|m| m.allows(permission))
            .unwrap_or(false))
    }

    /// Drops every cached entry for one team
    pub fn invalidate_team(&mut self, team_id: &str) {
        self.entries.retain(|(team, _), _| team != team_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Player;
    use crate::directory::Team;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory that counts membership lookups
    struct CountingDirectory {
        lookups: AtomicUsize,
    }

    impl TeamDirectory for CountingDirectory {
        fn teams_for_user(&self, _user_id: &str) -> Result<Vec<Team>, DirectoryError> {
            Ok(Vec::new())
        }

        fn team(&self, _team_id: &str) -> Result<Option<Team>, DirectoryError> {
            Ok(None)
        }

        fn roster(&self, _team_id: &str) -> Result<Vec<Player>, DirectoryError> {
            Ok(Vec::new())
        }

        fn membership(&self, team_id: &str, user_id: &str) -> Result<Option<Membership>, DirectoryError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if user_id == "coach" {
                Ok(Some(Membership {
                    team_id: team_id.to_string(),
                    user_id: user_id.to_string(),
                    role: "coach".to_string(),
                    permissions: vec![LINEUP_EDIT.to_string()],
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn directory() -> CountingDirectory {
        CountingDirectory { lookups: AtomicUsize::new(0) }
    }

    #[test]
    fn lookups_are_cached_until_invalidated() {
        let directory = directory();
        let mut cache = PermissionCache::new();

        assert!(cache.has_permission("u12", "coach", LINEUP_EDIT, &directory).unwrap());
        assert!(cache.has_permission("u12", "coach", LINEUP_EDIT, &directory).unwrap());
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 1);

        cache.invalidate_team("u12");
        assert!(cache.is_empty());
        cache.membership("u12", "coach", &directory).unwrap();
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_membership_is_cached_and_denied() {
        let directory = directory();
        let mut cache = PermissionCache::new();
        assert!(!cache.has_permission("u12", "guest", LINEUP_EDIT, &directory).unwrap());
        assert!(!cache.has_permission("u12", "guest", LINEUP_EDIT, &directory).unwrap());
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidation_is_scoped_to_team() {
        let directory = directory();
        let mut cache = PermissionCache::new();
        cache.membership("u12", "coach", &directory).unwrap();
        cache.membership("u14", "coach", &directory).unwrap();
        cache.invalidate_team("u12");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
