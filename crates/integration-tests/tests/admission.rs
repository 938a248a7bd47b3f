//! Admission Integration Tests
//!
//! Idempotence, exclusivity and append-only participation against SQLite.

mod common;

use chrono::Duration;
use common::{date, utc, Harness};

#[tokio::test]
async fn test_admission_is_idempotent() {
    let h = Harness::new(utc(2025, 3, 17, 10)).await;
    let competition = h.creator().run().await.unwrap().unwrap();
    let a = h.couple("A", date(2025, 3, 2), 1).await;
    let b = h.couple("B", date(2025, 3, 16), 2).await;

    let first = h.admission().run().await.unwrap();
    assert_eq!(first.admitted, vec![(competition.id, a), (competition.id, b)]);

    h.clock.advance(Duration::minutes(5));
    let second = h.admission().run().await.unwrap();
    assert!(second.admitted.is_empty());
    assert_eq!(second.competitions_examined, 1);

    assert_eq!(h.store.participants(competition.id).await.unwrap(), vec![a, b]);
    // Admission instant of the first run is kept
    assert_eq!(
        h.store.admitted_at(competition.id, a).await.unwrap(),
        Some(utc(2025, 3, 17, 10).timestamp_millis())
    );
}

#[tokio::test]
async fn test_wedding_window_rules() {
    let h = Harness::new(utc(2025, 3, 17, 10)).await;
    let competition = h.creator().run().await.unwrap().unwrap();

    // First day of the month in local time counts
    let first_day = h.couple("FIRST_DAY", date(2025, 3, 1), 1).await;
    let before_start = h.couple("FEBRUARY", date(2025, 2, 28), 2).await;
    let in_future = h.couple("FUTURE", date(2025, 3, 20), 3).await;

    h.admission().run().await.unwrap();
    assert_eq!(
        h.store.participants(competition.id).await.unwrap(),
        vec![first_day]
    );

    // Future wedding becomes eligible once it has happened
    h.clock.set(utc(2025, 3, 21, 8));
    h.admission().run().await.unwrap();
    assert_eq!(
        h.store.participants(competition.id).await.unwrap(),
        vec![first_day, in_future]
    );
    assert!(h.store.memberships(before_start).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_admission_after_registration_deadline() {
    let h = Harness::new(utc(2025, 3, 17, 10)).await;
    let competition = h.creator().run().await.unwrap().unwrap();

    // Deadline is 2025-04-01 00:00 local
    h.clock.set(competition.registration_deadline);
    let late = h.couple("LATE", date(2025, 3, 30), 1).await;

    let report = h.admission().run().await.unwrap();
    assert_eq!(report.competitions_examined, 0);
    assert!(h.store.memberships(late).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_joins_only_one_admitting_competition() {
    let h = Harness::new(utc(2025, 3, 17, 10)).await;
    let earlier = h
        .competition(utc(2025, 3, 1, 0), utc(2025, 4, 1, 0), utc(2025, 5, 1, 0))
        .await;
    let later = h
        .competition(utc(2025, 3, 10, 0), utc(2025, 4, 10, 0), utc(2025, 5, 10, 0))
        .await;

    let both = h.couple("BOTH", date(2025, 3, 12), 1).await;
    let only_earlier = h.couple("EARLY", date(2025, 3, 5), 2).await;

    let report = h.admission().run().await.unwrap();
    assert_eq!(report.competitions_examined, 2);

    assert_eq!(h.store.memberships(both).await.unwrap(), vec![earlier.id]);
    assert_eq!(
        h.store.memberships(only_earlier).await.unwrap(),
        vec![earlier.id]
    );
    assert!(h.store.participants(later.id).await.unwrap().is_empty());

    // Still exclusive on later runs
    h.clock.advance(Duration::days(1));
    h.admission().run().await.unwrap();
    assert_eq!(h.store.memberships(both).await.unwrap(), vec![earlier.id]);
}

#[tokio::test]
async fn test_participation_is_append_only() {
    let h = Harness::new(utc(2025, 3, 17, 10)).await;
    let competition = h.creator().run().await.unwrap().unwrap();
    let user = h.couple("A", date(2025, 3, 2), 1).await;

    h.admission().run().await.unwrap();
    assert_eq!(
        h.store.participants(competition.id).await.unwrap(),
        vec![user]
    );

    // Losing eligibility later never removes a participant
    h.store.set_user_url(user, None).await.unwrap();
    h.clock.advance(Duration::hours(1));
    h.admission().run().await.unwrap();

    assert_eq!(
        h.store.participants(competition.id).await.unwrap(),
        vec![user]
    );
}

#[tokio::test]
async fn test_admission_without_competitions_is_noop() {
    let h = Harness::new(utc(2025, 3, 17, 10)).await;
    let user = h.couple("A", date(2025, 3, 2), 1).await;

    let report = h.admission().run().await.unwrap();
    assert_eq!(report.competitions_examined, 0);
    assert!(report.admitted.is_empty());
    assert!(h.store.memberships(user).await.unwrap().is_empty());
}
