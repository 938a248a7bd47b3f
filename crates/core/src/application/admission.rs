// Competition admission job

use crate::application::constants::ADMIT_PARTICIPANTS_JOB;
use crate::application::scheduler::ScheduledJob;
use crate::application::unit_of_work;
use crate::domain::{eligibility, CompetitionId, CompetitionPhase, UserId};
use crate::error::Result;
use crate::port::{ContestStore, ContestTransaction, TimeProvider};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Participants added by one admission run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    pub competitions_examined: usize,
    pub admitted: Vec<(CompetitionId, UserId)>,
}

/// Appends newly eligible users to competitions still admitting.
///
/// Participation is append-only: existing participants are never removed or
/// re-evaluated. A user may only sit in one admitting competition at a time.
pub struct AdmissionService {
    store: Arc<dyn ContestStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl AdmissionService {
    pub fn new(store: Arc<dyn ContestStore>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            store,
            time_provider,
        }
    }

    /// Admit eligible users into every admitting competition, one commit
    pub async fn run(&self) -> Result<AdmissionReport> {
        let now = self.time_provider.now();
        let timezone = self.time_provider.timezone();

        let mut tx = self.store.begin().await?;
        let outcome = admit_all(tx.as_mut(), now, timezone).await;
        let report = unit_of_work::settle(tx, ADMIT_PARTICIPANTS_JOB, outcome).await?;

        info!(
            job = ADMIT_PARTICIPANTS_JOB,
            competitions = report.competitions_examined,
            admitted = report.admitted.len(),
            "Competitions updated with eligible users"
        );
        Ok(report)
    }
}

async fn admit_all(
    tx: &mut dyn ContestTransaction,
    now: DateTime<Utc>,
    timezone: FixedOffset,
) -> Result<AdmissionReport> {
    let competitions = tx
        .find_competitions(CompetitionPhase::Admitting, now)
        .await?;

    let mut report = AdmissionReport {
        competitions_examined: competitions.len(),
        admitted: Vec::new(),
    };
    if competitions.is_empty() {
        return Ok(report);
    }

    // Everyone already sitting in an admitting competition is off the market
    let mut claimed: HashSet<UserId> = HashSet::new();
    for competition in &competitions {
        for participant in tx.list_participants(competition.id).await? {
            claimed.insert(participant.id);
        }
    }

    let candidates = tx.list_admission_candidates().await?;

    for competition in &competitions {
        for user in &candidates {
            if claimed.contains(&user.id) {
                continue;
            }
            if !eligibility::is_eligible(user, competition, now, timezone) {
                continue;
            }

            if tx.add_participant(competition.id, user.id, now).await? {
                claimed.insert(user.id);
                report.admitted.push((competition.id, user.id));
                debug!(
                    competition_id = competition.id,
                    user_id = user.id,
                    qr_code = %user.id_qr_code,
                    "User admitted"
                );
            }
        }
    }

    Ok(report)
}

#[async_trait]
impl ScheduledJob for AdmissionService {
    async fn tick(&self) {
        if let Err(e) = self.run().await {
            error!(job = ADMIT_PARTICIPANTS_JOB, error = %e, "Error updating competitions");
        }
    }
}
