// SQLite row representations

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use contest_core::domain::{Competition, User};
use contest_core::error::{AppError, Result};

pub(crate) const COMPETITION_COLUMNS: &str =
    "id, name, start_date, end_date, registration_deadline, is_active, winner_id";

pub(crate) const USER_COLUMNS: &str = "u.id, u.id_qr_code, u.full_name, u.is_gold, u.is_active, \
     u.date_wedding, u.url, u.likes_number, u.views_number, u.rank, u.is_winner";

/// Instants are stored as epoch milliseconds
pub(crate) fn to_millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::Database(format!("Timestamp out of range: {}", millis)))
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CompetitionRow {
    id: i64,
    name: String,
    start_date: i64,
    end_date: i64,
    registration_deadline: i64,
    is_active: bool,
    winner_id: Option<i64>,
}

impl CompetitionRow {
    pub(crate) fn into_competition(self) -> Result<Competition> {
        Ok(Competition {
            id: self.id,
            name: self.name,
            start_date: from_millis(self.start_date)?,
            end_date: from_millis(self.end_date)?,
            registration_deadline: from_millis(self.registration_deadline)?,
            is_active: self.is_active,
            winner_id: self.winner_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    id_qr_code: String,
    full_name: Option<String>,
    is_gold: bool,
    is_active: bool,
    date_wedding: Option<NaiveDate>,
    url: Option<String>,
    likes_number: Option<i64>,
    views_number: Option<i64>,
    rank: i64,
    is_winner: bool,
}

impl UserRow {
    pub(crate) fn into_user(self) -> User {
        User {
            id: self.id,
            id_qr_code: self.id_qr_code,
            full_name: self.full_name,
            is_gold: self.is_gold,
            is_active: self.is_active,
            date_wedding: self.date_wedding,
            url: self.url,
            likes_number: self.likes_number,
            views_number: self.views_number,
            rank: self.rank,
            is_winner: self.is_winner,
        }
    }
}
