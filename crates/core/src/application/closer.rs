// Competition closer job

use crate::application::constants::CLOSE_COMPETITIONS_JOB;
use crate::application::refresh::{FetchedMetrics, ParticipantRefresher};
use crate::application::scheduler::ScheduledJob;
use crate::application::unit_of_work;
use crate::domain::{CompetitionPhase, Standings, User};
use crate::error::Result;
use crate::port::{ContestStore, ContestTransaction, TimeProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// Finalizes competitions whose window has ended.
///
/// Per competition: final metrics refresh, ranking, winner, deactivation.
/// Participants are read in a short transaction and their metrics fetched
/// outside of it. The writes of every competition of one run then share a
/// single transaction; a failure leaves all of them active so the next tick
/// retries.
pub struct CompetitionCloser {
    store: Arc<dyn ContestStore>,
    time_provider: Arc<dyn TimeProvider>,
    refresher: Arc<ParticipantRefresher>,
}

impl CompetitionCloser {
    pub fn new(
        store: Arc<dyn ContestStore>,
        time_provider: Arc<dyn TimeProvider>,
        refresher: Arc<ParticipantRefresher>,
    ) -> Self {
        Self {
            store,
            time_provider,
            refresher,
        }
    }

    /// Close every closable competition; returns the committed standings
    pub async fn run(&self) -> Result<Vec<Standings>> {
        let now = self.time_provider.now();

        let mut tx = self.store.begin().await?;
        let outcome = closable_participants(tx.as_mut(), now).await;
        let participants = unit_of_work::settle(tx, CLOSE_COMPETITIONS_JOB, outcome).await?;
        let Some(participants) = participants else {
            return Ok(Vec::new());
        };

        let fetched = self.refresher.fetch(&participants).await;

        let mut tx = self.store.begin().await?;
        let outcome = self.close_all(tx.as_mut(), now, &fetched).await;
        let closed = unit_of_work::settle(tx, CLOSE_COMPETITIONS_JOB, outcome).await?;

        if !closed.is_empty() {
            info!(
                job = CLOSE_COMPETITIONS_JOB,
                closed = closed.len(),
                refreshed = fetched.report.updated + fetched.report.partial,
                refresh_failures = fetched.report.failed,
                "Competitions closed and winners determined"
            );
        }
        Ok(closed)
    }

    async fn close_all(
        &self,
        tx: &mut dyn ContestTransaction,
        now: DateTime<Utc>,
        fetched: &FetchedMetrics,
    ) -> Result<Vec<Standings>> {
        // Writing first takes the store's write lock before anything is read
        fetched.apply(tx).await?;

        let competitions = tx
            .find_competitions(CompetitionPhase::Closable, now)
            .await?;

        let mut closed = Vec::with_capacity(competitions.len());
        for competition in &competitions {
            let participants = tx.list_participants(competition.id).await?;
            let standings = Standings::compute(competition.id, &participants);
            tx.finalize_competition(&standings).await?;

            info!(
                job = CLOSE_COMPETITIONS_JOB,
                competition_id = competition.id,
                name = %competition.name,
                participants = standings.ranking.len(),
                winner_id = ?standings.winner_id,
                "Competition finalized"
            );
            closed.push(standings);
        }

        Ok(closed)
    }
}

/// Participants of every closable competition, `None` when nothing is due
async fn closable_participants(
    tx: &mut dyn ContestTransaction,
    now: DateTime<Utc>,
) -> Result<Option<Vec<User>>> {
    let competitions = tx
        .find_competitions(CompetitionPhase::Closable, now)
        .await?;
    if competitions.is_empty() {
        return Ok(None);
    }

    let mut participants = Vec::new();
    for competition in &competitions {
        participants.extend(tx.list_participants(competition.id).await?);
    }
    Ok(Some(participants))
}

#[async_trait]
impl ScheduledJob for CompetitionCloser {
    async fn tick(&self) {
        if let Err(e) = self.run().await {
            error!(job = CLOSE_COMPETITIONS_JOB, error = %e, "Error closing competitions");
        }
    }
}
