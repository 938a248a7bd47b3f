// Participant metrics refresh

use crate::application::constants::REFRESH_METRICS_JOB;
use crate::application::scheduler::ScheduledJob;
use crate::application::unit_of_work;
use crate::domain::{CompetitionPhase, User, UserId};
use crate::error::Result;
use crate::port::{ContestStore, ContestTransaction, MetricsProvider, TimeProvider, VideoMetrics};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counters of one refresh batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Both counts overwritten
    pub updated: usize,
    /// Only one count overwritten
    pub partial: usize,
    /// Provider failed or returned nothing usable
    pub failed: usize,
    /// No content URL
    pub skipped: usize,
}

/// Provider results of one batch, not yet written
#[derive(Debug, Clone, Default)]
pub struct FetchedMetrics {
    pub report: RefreshReport,
    updates: Vec<(UserId, VideoMetrics)>,
}

impl FetchedMetrics {
    /// Number of users with at least one usable count
    pub fn pending_writes(&self) -> usize {
        self.updates.len()
    }

    /// Stage every usable count in `tx`; the caller owns the commit
    pub async fn apply(&self, tx: &mut dyn ContestTransaction) -> Result<()> {
        for (user_id, metrics) in &self.updates {
            tx.update_metrics(*user_id, metrics).await?;
        }
        Ok(())
    }
}

/// Fetches metrics for participants.
///
/// One participant's failure never aborts the batch. Fetching happens
/// outside any transaction; the writes are applied afterwards in one short
/// unit of work, so no store snapshot is held across provider calls.
pub struct ParticipantRefresher {
    provider: Arc<dyn MetricsProvider>,
    credential: Option<String>,
}

impl ParticipantRefresher {
    /// `credential` is read once at startup; `None` makes every fetch fail
    /// permanently instead of stopping the engine.
    pub fn new(provider: Arc<dyn MetricsProvider>, credential: Option<String>) -> Self {
        Self {
            provider,
            credential,
        }
    }

    /// Query the provider for `participants`; a user listed twice is fetched
    /// once
    pub async fn fetch(&self, participants: &[User]) -> FetchedMetrics {
        let mut fetched = FetchedMetrics::default();
        let mut seen: HashSet<UserId> = HashSet::new();

        for user in participants {
            if !seen.insert(user.id) {
                continue;
            }

            let Some(url) = user.content_url() else {
                info!(user_id = user.id, qr_code = %user.id_qr_code, "User has no content URL, skipping");
                fetched.report.skipped += 1;
                continue;
            };

            match self.provider.fetch(url, self.credential.as_deref()).await {
                Ok(metrics) => {
                    if metrics.likes.is_none() {
                        info!(user_id = user.id, qr_code = %user.id_qr_code, "Invalid like count, keeping previous value");
                    }
                    if metrics.views.is_none() {
                        info!(user_id = user.id, qr_code = %user.id_qr_code, "Invalid view count, keeping previous value");
                    }

                    if metrics.is_complete() {
                        fetched.report.updated += 1;
                    } else if metrics.is_empty() {
                        fetched.report.failed += 1;
                        continue;
                    } else {
                        fetched.report.partial += 1;
                    }
                    fetched.updates.push((user.id, metrics));
                }
                Err(e) => {
                    warn!(
                        user_id = user.id,
                        qr_code = %user.id_qr_code,
                        error = %e,
                        "Error updating metrics, keeping previous values"
                    );
                    fetched.report.failed += 1;
                }
            }
        }

        fetched
    }
}

/// Standalone job refreshing every running competition
pub struct MetricsRefreshJob {
    store: Arc<dyn ContestStore>,
    time_provider: Arc<dyn TimeProvider>,
    refresher: Arc<ParticipantRefresher>,
}

impl MetricsRefreshJob {
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

    /// Refresh participants of all running competitions.
    ///
    /// Reads and writes use separate transactions; all writes of the batch
    /// land in a single commit.
    pub async fn run(&self) -> Result<RefreshReport> {
        let now = self.time_provider.now();

        let mut tx = self.store.begin().await?;
        let outcome = running_participants(tx.as_mut(), now).await;
        let participants = unit_of_work::settle(tx, REFRESH_METRICS_JOB, outcome).await?;

        let fetched = self.refresher.fetch(&participants).await;
        if fetched.pending_writes() > 0 {
            let mut tx = self.store.begin().await?;
            let outcome = fetched.apply(tx.as_mut()).await;
            unit_of_work::settle(tx, REFRESH_METRICS_JOB, outcome).await?;
        }

        let report = fetched.report;
        info!(
            job = REFRESH_METRICS_JOB,
            updated = report.updated,
            partial = report.partial,
            failed = report.failed,
            skipped = report.skipped,
            "Metrics refresh committed"
        );
        Ok(report)
    }
}

async fn running_participants(
    tx: &mut dyn ContestTransaction,
    now: DateTime<Utc>,
) -> Result<Vec<User>> {
    let competitions = tx
        .find_competitions(CompetitionPhase::Running, now)
        .await?;

    let mut participants = Vec::new();
    for competition in &competitions {
        participants.extend(tx.list_participants(competition.id).await?);
    }
    Ok(participants)
}

#[async_trait]
impl ScheduledJob for MetricsRefreshJob {
    async fn tick(&self) {
        if let Err(e) = self.run().await {
            error!(job = REFRESH_METRICS_JOB, error = %e, "Error in metrics refresh");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::unit_of_work::tests::RecordingTransaction;
    use crate::port::metrics_provider::mocks::ScriptedMetricsProvider;
    use crate::port::MetricsError;
    use std::sync::Mutex;

    fn participant(id: UserId, url: Option<&str>) -> User {
        User {
            id,
            id_qr_code: format!("USER{}", id),
            full_name: None,
            is_gold: true,
            is_active: true,
            date_wedding: None,
            url: url.map(str::to_string),
            likes_number: Some(0),
            views_number: Some(0),
            rank: 0,
            is_winner: false,
        }
    }

    #[tokio::test]
    async fn test_refresh_counts_each_outcome() {
        let provider = Arc::new(
            ScriptedMetricsProvider::new()
                .respond("https://fb.watch/v/11111111", Ok(VideoMetrics::new(3, 30)))
                .respond(
                    "https://fb.watch/v/22222222",
                    Ok(VideoMetrics {
                        likes: None,
                        views: Some(5),
                    }),
                )
                .respond(
                    "https://fb.watch/v/33333333",
                    Err(MetricsError::Decode("bad json".to_string())),
                )
                .respond("https://fb.watch/v/44444444", Ok(VideoMetrics::default())),
        );
        let refresher = ParticipantRefresher::new(provider.clone(), Some("token".to_string()));
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tx = RecordingTransaction {
            log: log.clone(),
            fail_commit: false,
        };

        let participants = vec![
            participant(1, Some("https://fb.watch/v/11111111")),
            participant(2, Some("https://fb.watch/v/22222222")),
            participant(3, Some("https://fb.watch/v/33333333")),
            participant(4, Some("https://fb.watch/v/44444444")),
            participant(5, None),
            participant(6, Some("")),
        ];
        let fetched = refresher.fetch(&participants).await;
        fetched.apply(&mut tx).await.unwrap();
        let report = fetched.report;

        assert_eq!(
            report,
            RefreshReport {
                updated: 1,
                partial: 1,
                failed: 2,
                skipped: 2,
            }
        );
        // Only usable results are written
        assert_eq!(*log.lock().unwrap(), vec!["update_metrics", "update_metrics"]);
        assert_eq!(provider.call_count(), 4);
        assert_eq!(provider.credentials_seen()[0], Some("token".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_participants_fetched_once() {
        let provider = Arc::new(ScriptedMetricsProvider::with_fallback(Ok(VideoMetrics::new(
            1, 1,
        ))));
        let refresher = ParticipantRefresher::new(provider.clone(), None);
        let mut tx = RecordingTransaction {
            log: Arc::new(Mutex::new(Vec::new())),
            fail_commit: false,
        };

        let user = participant(1, Some("https://fb.watch/v/11111111"));
        let fetched = refresher.fetch(&[user.clone(), user]).await;
        fetched.apply(&mut tx).await.unwrap();

        assert_eq!(fetched.report.updated, 1);
        assert_eq!(fetched.pending_writes(), 1);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.credentials_seen(), vec![None]);
    }
}
