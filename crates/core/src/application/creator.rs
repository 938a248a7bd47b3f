// Competition creator job

use crate::application::constants::{CREATE_COMPETITION_JOB, DEFAULT_COMPETITION_DURATION_MONTHS};
use crate::application::scheduler::ScheduledJob;
use crate::application::unit_of_work;
use crate::domain::{Competition, CompetitionPhase, NewCompetition};
use crate::error::Result;
use crate::port::{ContestStore, ContestTransaction, TimeProvider};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// Opens a monthly competition whenever none is accepting registrations
pub struct CompetitionCreator {
    store: Arc<dyn ContestStore>,
    time_provider: Arc<dyn TimeProvider>,
    duration_months: u32,
}

impl CompetitionCreator {
    pub fn new(store: Arc<dyn ContestStore>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            store,
            time_provider,
            duration_months: DEFAULT_COMPETITION_DURATION_MONTHS,
        }
    }

    /// Registration phase length; the scoring phase is as long again
    pub fn with_duration_months(mut self, duration_months: u32) -> Self {
        self.duration_months = duration_months;
        self
    }

    /// Create this month's competition unless one is still open.
    ///
    /// Returns the created competition, or `None` when skipped.
    pub async fn run(&self) -> Result<Option<Competition>> {
        let now = self.time_provider.now();
        let timezone = self.time_provider.timezone();

        let mut tx = self.store.begin().await?;
        let outcome = self.create_if_needed(tx.as_mut(), now, timezone).await;
        let created = unit_of_work::settle(tx, CREATE_COMPETITION_JOB, outcome).await?;

        if let Some(competition) = &created {
            info!(
                job = CREATE_COMPETITION_JOB,
                competition_id = competition.id,
                name = %competition.name,
                start_date = %competition.start_date,
                registration_deadline = %competition.registration_deadline,
                end_date = %competition.end_date,
                "New competition created"
            );
        }
        Ok(created)
    }

    async fn create_if_needed(
        &self,
        tx: &mut dyn ContestTransaction,
        now: DateTime<Utc>,
        timezone: FixedOffset,
    ) -> Result<Option<Competition>> {
        let open = tx
            .find_competitions(CompetitionPhase::AcceptingRegistrations, now)
            .await?;
        if let Some(existing) = open.first() {
            info!(
                job = CREATE_COMPETITION_JOB,
                competition_id = existing.id,
                "Active competition exists, skipping creation"
            );
            return Ok(None);
        }

        let new = NewCompetition::monthly(now, timezone, self.duration_months)?;
        let competition = tx.insert_competition(&new).await?;
        Ok(Some(competition))
    }
}

#[async_trait]
impl ScheduledJob for CompetitionCreator {
    async fn tick(&self) {
        if let Err(e) = self.run().await {
            error!(job = CREATE_COMPETITION_JOB, error = %e, "Error creating competition");
        }
    }
}
