//! User directory on SQLite

use async_trait::async_trait;
use rota_core::{Entity, Error, Result, User, UserDirectory};
use sqlx::SqlitePool;
use tracing::debug;

use super::storage;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

/// Repository for users and their active flags
#[derive(Debug, Clone)]
pub struct UserRepo {
    pool: SqlitePool,
}

impl UserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepo {
    async fn get_by_id(&self, user_id: &str) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage("get user"))?
        .map(User::from)
        .ok_or_else(|| Error::not_found(Entity::User, user_id))
    }

    async fn list_by_team(&self, team_name: &str) -> Result<Vec<User>> {
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
        .map_err(storage("list team users"))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_active(&self, user_id: &str, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage("update user active flag"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(Entity::User, user_id));
        }
        Ok(())
    }

    async fn add_team_members(&self, team_name: &str, members: &[User]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("begin add team members"))?;

        for member in members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(team_name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await
            .map_err(storage("upsert team member"))?;
        }

        tx.commit().await.map_err(storage("commit add team members"))?;

        debug!(team_name, members_count = members.len(), "team members upserted");
        Ok(())
    }
}
