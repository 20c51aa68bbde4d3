//! Team directory on SQLite

use std::collections::BTreeMap;

use async_trait::async_trait;
use rota_core::{Entity, Error, Result, Team, TeamDirectory, TeamMember, User};
use sqlx::SqlitePool;

use super::users::UserRow;
use super::{is_unique_violation, storage};

/// Repository for teams and their membership
#[derive(Debug, Clone)]
pub struct TeamRepo {
    pool: SqlitePool,
}

impl TeamRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamDirectory for TeamRepo {
    async fn create(&self, team_name: &str) -> Result<()> {
        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(team_name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::already_exists(Entity::Team, team_name)
                } else {
                    Error::storage("create team", e)
                }
            })?;
        Ok(())
    }

    async fn get_by_name(&self, team_name: &str) -> Result<Team> {
        let exists: Option<String> =
            sqlx::query_scalar("SELECT team_name FROM teams WHERE team_name = ?")
                .bind(team_name)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage("get team"))?;

        if exists.is_none() {
            return Err(Error::not_found(Entity::Team, team_name));
        }

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await
        .map_err(storage("get team members"))?;

        Ok(Team {
            team_name: team_name.to_string(),
            members: rows
                .into_iter()
                .map(|row| TeamMember::from(User::from(row)))
                .collect(),
        })
    }

    async fn list(&self) -> Result<Vec<Team>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT team_name FROM teams ORDER BY team_name")
            .fetch_all(&self.pool)
            .await
            .map_err(storage("list teams"))?;

        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage("list team members"))?;

        let mut teams: BTreeMap<String, Vec<TeamMember>> =
            names.into_iter().map(|name| (name, Vec::new())).collect();
        for row in rows {
            if let Some(members) = teams.get_mut(&row.team_name) {
                members.push(TeamMember::from(User::from(row)));
            }
        }

        Ok(teams
            .into_iter()
            .map(|(team_name, members)| Team { team_name, members })
            .collect())
    }
}
