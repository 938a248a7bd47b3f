// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::rows::{to_millis, CompetitionRow, UserRow, COMPETITION_COLUMNS, USER_COLUMNS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contest_core::domain::{
    Competition, CompetitionId, CompetitionPhase, NewCompetition, Standings, User, UserId,
};
use contest_core::error::{AppError, Result};
use contest_core::port::{ContestTransaction, Transaction, VideoMetrics};
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use tracing::debug;

/// SQL rendering of a phase predicate; `?1` is the current instant
fn phase_clause(phase: CompetitionPhase) -> &'static str {
    match phase {
        CompetitionPhase::AcceptingRegistrations => {
            "is_active = 1 AND registration_deadline >= ?1"
        }
        CompetitionPhase::Admitting => {
            "is_active = 1 AND start_date <= ?1 AND registration_deadline > ?1"
        }
        CompetitionPhase::Running => "is_active = 1 AND start_date <= ?1 AND end_date >= ?1",
        CompetitionPhase::Closable => "is_active = 1 AND end_date <= ?1",
    }
}

pub struct SqliteContestTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteContestTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteContestTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ContestTransaction for SqliteContestTransaction<'_> {
    async fn find_competitions(
        &mut self,
        phase: CompetitionPhase,
        now: DateTime<Utc>,
    ) -> Result<Vec<Competition>> {
        let sql = format!(
            "SELECT {} FROM competitions WHERE {} ORDER BY start_date, id",
            COMPETITION_COLUMNS,
            phase_clause(phase)
        );

        let rows: Vec<CompetitionRow> = sqlx::query_as(&sql)
            .bind(to_millis(now))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        debug!(phase = %phase, found = rows.len(), "Competitions selected");
        rows.into_iter().map(CompetitionRow::into_competition).collect()
    }

    async fn insert_competition(&mut self, competition: &NewCompetition) -> Result<Competition> {
        let result = sqlx::query(
            r#"
            INSERT INTO competitions (name, start_date, end_date, registration_deadline, is_active)
            VALUES (?, ?, ?, ?, 1)
            "#,
        )
        .bind(&competition.name)
        .bind(to_millis(competition.start_date))
        .bind(to_millis(competition.end_date))
        .bind(to_millis(competition.registration_deadline))
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Competition {
            id: result.last_insert_rowid(),
            name: competition.name.clone(),
            start_date: competition.start_date,
            end_date: competition.end_date,
            registration_deadline: competition.registration_deadline,
            is_active: true,
            winner_id: None,
        })
    }

    async fn list_participants(&mut self, competition_id: CompetitionId) -> Result<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {} FROM users u
            JOIN user_competition uc ON uc.user_id = u.id
            WHERE uc.competition_id = ?
            ORDER BY uc.admitted_at, uc.rowid
            "#,
            USER_COLUMNS
        );

        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(competition_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn list_admission_candidates(&mut self) -> Result<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {} FROM users u
            WHERE u.is_gold = 1
              AND u.is_active = 1
              AND u.date_wedding IS NOT NULL
              AND u.url IS NOT NULL
              AND u.url != ''
            ORDER BY u.id
            "#,
            USER_COLUMNS
        );

        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn add_participant(
        &mut self,
        competition_id: CompetitionId,
        user_id: UserId,
        admitted_at: DateTime<Utc>,
    ) -> Result<bool> {
        // Closed competitions never gain participants
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_competition (user_id, competition_id, admitted_at)
            SELECT ?, id, ? FROM competitions WHERE id = ? AND is_active = 1
            "#,
        )
        .bind(user_id)
        .bind(to_millis(admitted_at))
        .bind(competition_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_metrics(&mut self, user_id: UserId, metrics: &VideoMetrics) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET likes_number = COALESCE(?, likes_number),
                views_number = COALESCE(?, views_number)
            WHERE id = ?
            "#,
        )
        .bind(metrics.likes)
        .bind(metrics.views)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn finalize_competition(&mut self, standings: &Standings) -> Result<()> {
        let result = sqlx::query(
            "UPDATE competitions SET is_active = 0, winner_id = ? WHERE id = ? AND is_active = 1",
        )
        .bind(standings.winner_id)
        .bind(standings.competition_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(format!(
                "Competition {} is not active",
                standings.competition_id
            )));
        }

        sqlx::query(
            r#"
            UPDATE users SET is_winner = 0
            WHERE id IN (SELECT user_id FROM user_competition WHERE competition_id = ?)
            "#,
        )
        .bind(standings.competition_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        for participant in &standings.ranking {
            let is_winner = standings.winner_id == Some(participant.user_id);
            sqlx::query("UPDATE users SET rank = ?, is_winner = ? WHERE id = ?")
                .bind(participant.rank)
                .bind(is_winner)
                .bind(participant.user_id)
                .execute(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        Ok(())
    }
}
