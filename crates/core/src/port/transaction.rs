// Transaction port for atomic job runs
//
// Every lifecycle job acquires exactly one transaction, performs all reads and
// writes through it, then commits or rolls back as a whole.

use crate::domain::{
    Competition, CompetitionId, CompetitionPhase, NewCompetition, Standings, User, UserId,
};
use crate::error::Result;
use crate::port::VideoMetrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Store shared by all lifecycle jobs
#[async_trait]
pub trait ContestStore: Send + Sync {
    /// Begin a new unit of work
    async fn begin(&self) -> Result<Box<dyn ContestTransaction>>;
}

/// Competition/User operations within a transaction
#[async_trait]
pub trait ContestTransaction: Transaction {
    /// Competitions in `phase` at `now`, ordered by start date then id
    async fn find_competitions(
        &mut self,
        phase: CompetitionPhase,
        now: DateTime<Utc>,
    ) -> Result<Vec<Competition>>;

    /// Insert a competition (active, no winner)
    async fn insert_competition(&mut self, competition: &NewCompetition) -> Result<Competition>;

    /// Participants in admission order
    async fn list_participants(&mut self, competition_id: CompetitionId) -> Result<Vec<User>>;

    /// Gold, active users with a wedding date and a non-empty URL
    async fn list_admission_candidates(&mut self) -> Result<Vec<User>>;

    /// Append a participant; returns false when already a participant
    async fn add_participant(
        &mut self,
        competition_id: CompetitionId,
        user_id: UserId,
        admitted_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Overwrite likes/views; `None` fields keep their stored value
    async fn update_metrics(&mut self, user_id: UserId, metrics: &VideoMetrics) -> Result<()>;

    /// Persist ranks and winner, then deactivate the competition.
    ///
    /// # Errors
    /// - AppError::InvalidState if the competition is no longer active
    async fn finalize_competition(&mut self, standings: &Standings) -> Result<()>;
}
