//! Shared fixtures: in-memory SQLite store, manual clock, scripted provider.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use contest_core::application::{
    AdmissionService, CompetitionCloser, CompetitionCreator, MetricsRefreshJob,
    ParticipantRefresher,
};
use contest_core::domain::{Competition, NewCompetition, UserId};
use contest_core::port::metrics_provider::mocks::ScriptedMetricsProvider;
use contest_core::port::time_provider::mocks::ManualTimeProvider;
use contest_core::port::{MetricsProvider, VideoMetrics};
use contest_infra_sqlite::{create_pool, run_migrations, NewUser, SqliteContestStore};

pub const TOKEN: &str = "test-token";

/// Africa/Tunis
pub fn tunis() -> FixedOffset {
    FixedOffset::east_opt(3600).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn video_url(n: u32) -> String {
    format!("https://www.facebook.com/reel/{}", 100_000_000 + n)
}

pub fn metrics(likes: i64, views: i64) -> VideoMetrics {
    VideoMetrics::new(likes, views)
}

pub struct Harness {
    pub store: Arc<SqliteContestStore>,
    pub clock: Arc<ManualTimeProvider>,
}

impl Harness {
    pub async fn new(now: DateTime<Utc>) -> Self {
        Self::with_database("sqlite::memory:", now).await
    }

    /// Fresh database file under the temp dir, shared by every pool connection
    pub async fn on_disk(name: &str, now: DateTime<Utc>) -> Self {
        let path = std::env::temp_dir().join(format!(
            "contest-{}-{}.db",
            name,
            std::process::id()
        ));
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
        Self::with_database(&format!("sqlite://{}", path.display()), now).await
    }

    pub async fn with_database(url: &str, now: DateTime<Utc>) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self {
            store: Arc::new(SqliteContestStore::new(pool)),
            clock: Arc::new(ManualTimeProvider::new(now, tunis())),
        }
    }

    /// Active gold user with a wedding date and a video
    pub async fn couple(&self, qr_code: &str, wedding: NaiveDate, video: u32) -> UserId {
        self.store
            .insert_user(&NewUser::new(qr_code).wedding(wedding).url(video_url(video)))
            .await
            .unwrap()
    }

    pub async fn competition(
        &self,
        start: DateTime<Utc>,
        deadline: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Competition {
        let new = NewCompetition::new("Competition", start, deadline, end).unwrap();
        self.store.insert_competition(&new).await.unwrap()
    }

    pub fn creator(&self) -> CompetitionCreator {
        CompetitionCreator::new(self.store.clone(), self.clock.clone())
    }

    pub fn admission(&self) -> AdmissionService {
        AdmissionService::new(self.store.clone(), self.clock.clone())
    }

    pub fn refresh_job(&self, refresher: Arc<ParticipantRefresher>) -> MetricsRefreshJob {
        MetricsRefreshJob::new(self.store.clone(), self.clock.clone(), refresher)
    }

    pub fn closer(&self, refresher: Arc<ParticipantRefresher>) -> CompetitionCloser {
        CompetitionCloser::new(self.store.clone(), self.clock.clone(), refresher)
    }
}

pub fn refresher(provider: Arc<dyn MetricsProvider>) -> Arc<ParticipantRefresher> {
    Arc::new(ParticipantRefresher::new(provider, Some(TOKEN.to_string())))
}

pub fn scripted(responses: Vec<(String, VideoMetrics)>) -> Arc<ScriptedMetricsProvider> {
    let provider = responses
        .into_iter()
        .fold(ScriptedMetricsProvider::new(), |provider, (url, metrics)| {
            provider.respond(url, Ok(metrics))
        });
    Arc::new(provider)
}
