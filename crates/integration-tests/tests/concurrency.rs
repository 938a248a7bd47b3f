//! Concurrency Integration Tests
//!
//! Jobs sharing a file-backed database: a write committed by one job while
//! another is waiting on the metrics provider must not fail either of them.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{date, refresher, utc, Harness};
use contest_core::port::{MetricsError, MetricsProvider, VideoMetrics};

/// Provider that answers every URL with the same counts after a delay
struct SlowProvider {
    delay: Duration,
    metrics: VideoMetrics,
}

#[async_trait]
impl MetricsProvider for SlowProvider {
    async fn fetch(
        &self,
        _content_url: &str,
        _credential: Option<&str>,
    ) -> Result<VideoMetrics, MetricsError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.metrics)
    }
}

fn slow(delay_ms: u64) -> Arc<SlowProvider> {
    Arc::new(SlowProvider {
        delay: Duration::from_millis(delay_ms),
        metrics: VideoMetrics::new(42, 420),
    })
}

#[tokio::test]
async fn test_admission_commits_while_refresh_waits_on_provider() {
    let h = Harness::on_disk("refresh-overlap", utc(2025, 3, 17, 10)).await;
    let competition = h.creator().run().await.unwrap().unwrap();
    let first = h.couple("A", date(2025, 3, 2), 0).await;
    h.admission().run().await.unwrap();

    let job = Arc::new(h.refresh_job(refresher(slow(400))));
    let refresh = tokio::spawn({
        let job = job.clone();
        async move { job.run().await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = h.couple("B", date(2025, 3, 2), 1).await;
    let admitted = h.admission().run().await.unwrap();
    assert_eq!(admitted.admitted, vec![(competition.id, second)]);

    let report = refresh.await.unwrap().unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, 0);

    let user = h.store.user(first).await.unwrap();
    assert_eq!(user.likes_number, Some(42));
    assert_eq!(user.views_number, Some(420));
    assert_eq!(
        h.store.participants(competition.id).await.unwrap(),
        vec![first, second]
    );
}

#[tokio::test]
async fn test_creator_commits_while_closer_waits_on_provider() {
    let h = Harness::on_disk("close-overlap", utc(2025, 3, 17, 10)).await;
    let competition = h.creator().run().await.unwrap().unwrap();
    let winner = h.couple("A", date(2025, 3, 2), 0).await;
    h.admission().run().await.unwrap();

    h.clock.set(competition.end_date);
    let closer = Arc::new(h.closer(refresher(slow(400))));
    let closing = tokio::spawn({
        let closer = closer.clone();
        async move { closer.run().await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let next = h.creator().run().await.unwrap();
    assert!(next.is_some());

    let closed = closing.await.unwrap().unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].winner_id, Some(winner));

    let competition = h.store.competition(competition.id).await.unwrap();
    assert!(!competition.is_active);
    assert_eq!(competition.winner_id, Some(winner));
    assert_eq!(h.store.user(winner).await.unwrap().likes_number, Some(42));
    assert_eq!(h.store.competitions().await.unwrap().len(), 2);
}
