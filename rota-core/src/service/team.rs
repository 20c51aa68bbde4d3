//! Team creation and lookup

use std::sync::Arc;

use tracing::{error, info};

use crate::model::{Team, TeamMember, User};
use crate::store::{TeamDirectory, UserDirectory};
use crate::Result;

/// Creates teams and registers their members in the user directory
#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamDirectory>,
    users: Arc<dyn UserDirectory>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamDirectory>, users: Arc<dyn UserDirectory>) -> Self {
        Self { teams, users }
    }

    /// Create a team and upsert its members
    ///
    /// Members that already exist elsewhere are moved into this team.
    pub async fn create_team(&self, team_name: &str, members: Vec<TeamMember>) -> Result<Team> {
        self.teams.create(team_name).await.inspect_err(|e| {
            error!(team_name, error = %e, "failed to create team");
        })?;

        let users: Vec<User> = members
            .into_iter()
            .map(|m| m.into_user(team_name))
            .collect();

        if !users.is_empty() {
            self.users
                .add_team_members(team_name, &users)
                .await
                .inspect_err(|e| {
                    error!(team_name, members_count = users.len(), error = %e, "failed to upsert team members");
                })?;
        }

        let stored = self.users.list_by_team(team_name).await.inspect_err(|e| {
            error!(team_name, error = %e, "failed to list team members after creation");
        })?;

        let team = Team {
            team_name: team_name.to_string(),
            members: stored.into_iter().map(TeamMember::from).collect(),
        };

        info!(team_name, members_count = team.members.len(), "team created");
        Ok(team)
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        let team = self.teams.get_by_name(team_name).await.inspect_err(|e| {
            error!(team_name, error = %e, "failed to get team by name");
        })?;

        info!(team_name, members_count = team.members.len(), "team loaded");
        Ok(team)
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        self.teams.list().await.inspect_err(|e| {
            error!(error = %e, "failed to list teams");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::ErrorKind;

    fn service(store: &Arc<InMemoryStore>) -> TeamService {
        TeamService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(&store);

        let team = svc
            .create_team(
                "backend",
                vec![
                    TeamMember::new("u2", "Bob", true),
                    TeamMember::new("u1", "Alice", false),
                ],
            )
            .await
            .unwrap();

        assert_eq!(team.team_name, "backend");
        assert_eq!(
            team.members,
            vec![
                TeamMember::new("u1", "Alice", false),
                TeamMember::new("u2", "Bob", true),
            ]
        );

        let loaded = svc.get_team("backend").await.unwrap();
        assert_eq!(loaded, team);
    }

    #[tokio::test]
    async fn test_create_duplicate_team() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(&store);

        svc.create_team("backend", vec![]).await.unwrap();
        let err = svc.create_team("backend", vec![]).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.code(), "TEAM_EXISTS");
    }

    #[tokio::test]
    async fn test_member_moves_between_teams() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(&store);

        svc.create_team("backend", vec![TeamMember::new("u1", "Alice", true)])
            .await
            .unwrap();
        svc.create_team("frontend", vec![TeamMember::new("u1", "Alice", true)])
            .await
            .unwrap();

        assert!(svc.get_team("backend").await.unwrap().members.is_empty());
        assert_eq!(svc.get_team("frontend").await.unwrap().members.len(), 1);
        assert_eq!(store.user("u1").await.unwrap().team_name, "frontend");
    }

    #[tokio::test]
    async fn test_get_missing_team() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store).get_team("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_teams_sorted() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(&store);
        svc.create_team("qa", vec![]).await.unwrap();
        svc.create_team("backend", vec![]).await.unwrap();

        let names: Vec<String> = svc
            .list_teams()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.team_name)
            .collect();
        assert_eq!(names, vec!["backend".to_string(), "qa".to_string()]);
    }
}
