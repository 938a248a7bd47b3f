// SQLite Contest Store

use crate::error::map_sqlx_error;
use crate::rows::{CompetitionRow, UserRow, COMPETITION_COLUMNS, USER_COLUMNS};
use crate::transaction::SqliteContestTransaction;
use async_trait::async_trait;
use chrono::NaiveDate;
use contest_core::domain::{Competition, CompetitionId, NewCompetition, User, UserId};
use contest_core::error::{AppError, Result};
use contest_core::port::{ContestStore, ContestTransaction};
use sqlx::SqlitePool;

/// User record as written by the admin layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id_qr_code: String,
    pub full_name: Option<String>,
    pub is_gold: bool,
    pub is_active: bool,
    pub date_wedding: Option<NaiveDate>,
    pub url: Option<String>,
    pub likes_number: Option<i64>,
    pub views_number: Option<i64>,
}

impl NewUser {
    /// Active gold user without wedding date or content yet
    pub fn new(id_qr_code: impl Into<String>) -> Self {
        Self {
            id_qr_code: id_qr_code.into(),
            full_name: None,
            is_gold: true,
            is_active: true,
            date_wedding: None,
            url: None,
            likes_number: Some(0),
            views_number: Some(0),
        }
    }

    pub fn wedding(mut self, date: NaiveDate) -> Self {
        self.date_wedding = Some(date);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn likes(mut self, likes: Option<i64>) -> Self {
        self.likes_number = likes;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn gold(mut self, is_gold: bool) -> Self {
        self.is_gold = is_gold;
        self
    }
}

/// Pool-backed store; every `begin` opens one SQLite transaction
#[derive(Clone)]
pub struct SqliteContestStore {
    pool: SqlitePool,
}

impl SqliteContestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user outside of any job transaction
    pub async fn insert_user(&self, user: &NewUser) -> Result<UserId> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id_qr_code, full_name, is_gold, is_active,
                date_wedding, url, likes_number, views_number
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id_qr_code)
        .bind(&user.full_name)
        .bind(user.is_gold)
        .bind(user.is_active)
        .bind(user.date_wedding)
        .bind(&user.url)
        .bind(user.likes_number)
        .bind(user.views_number)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a competition outside of any job transaction
    pub async fn insert_competition(&self, competition: &NewCompetition) -> Result<Competition> {
        let mut tx = self.begin().await?;
        let created = tx.insert_competition(competition).await?;
        tx.commit().await?;
        Ok(created)
    }

    pub async fn user(&self, id: UserId) -> Result<User> {
        let sql = format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user)
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }

    pub async fn competition(&self, id: CompetitionId) -> Result<Competition> {
        let sql = format!("SELECT {} FROM competitions WHERE id = ?", COMPETITION_COLUMNS);
        let row: Option<CompetitionRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.ok_or_else(|| AppError::NotFound(format!("Competition {}", id)))?
            .into_competition()
    }

    pub async fn competitions(&self) -> Result<Vec<Competition>> {
        let sql = format!("SELECT {} FROM competitions ORDER BY id", COMPETITION_COLUMNS);
        let rows: Vec<CompetitionRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(CompetitionRow::into_competition).collect()
    }

    /// Participant ids in admission order
    pub async fn participants(&self, competition_id: CompetitionId) -> Result<Vec<UserId>> {
        sqlx::query_scalar(
            "SELECT user_id FROM user_competition WHERE competition_id = ? ORDER BY admitted_at, rowid",
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    /// Ids of competitions `user_id` takes part in
    pub async fn memberships(&self, user_id: UserId) -> Result<Vec<CompetitionId>> {
        sqlx::query_scalar(
            "SELECT competition_id FROM user_competition WHERE user_id = ? ORDER BY competition_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    /// Admission instant of a participation, if any
    pub async fn admitted_at(
        &self,
        competition_id: CompetitionId,
        user_id: UserId,
    ) -> Result<Option<i64>> {
        sqlx::query_scalar(
            "SELECT admitted_at FROM user_competition WHERE competition_id = ? AND user_id = ?",
        )
        .bind(competition_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    pub async fn set_user_url(&self, user_id: UserId, url: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET url = ? WHERE id = ?")
            .bind(url)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl ContestStore for SqliteContestStore {
    async fn begin(&self) -> Result<Box<dyn ContestTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteContestTransaction::new(tx)))
    }
}
