// Competition Domain Model

use chrono::{DateTime, Datelike, FixedOffset, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::user::UserId;

/// Store identifier of a competition
pub type CompetitionId = i64;

/// One scored contest cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub is_active: bool,
    pub winner_id: Option<UserId>,
}

impl Competition {
    /// Check whether this competition is in the given phase at `now`
    pub fn is_in(&self, phase: CompetitionPhase, now: DateTime<Utc>) -> bool {
        phase.matches(self, now)
    }
}

/// Named selection predicates shared by all lifecycle jobs.
///
/// The SQLite adapter renders the same predicates as SQL; `matches` is the
/// in-memory reference used by tests and re-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompetitionPhase {
    /// `is_active && registration_deadline >= now` (creator guard)
    AcceptingRegistrations,
    /// `is_active && start_date <= now && registration_deadline > now`
    Admitting,
    /// `is_active && start_date <= now <= end_date`
    Running,
    /// `is_active && end_date <= now`
    Closable,
}

impl CompetitionPhase {
    pub fn matches(self, competition: &Competition, now: DateTime<Utc>) -> bool {
        if !competition.is_active {
            return false;
        }
        match self {
            CompetitionPhase::AcceptingRegistrations => competition.registration_deadline >= now,
            CompetitionPhase::Admitting => {
                competition.start_date <= now && competition.registration_deadline > now
            }
            CompetitionPhase::Running => {
                competition.start_date <= now && now <= competition.end_date
            }
            CompetitionPhase::Closable => competition.end_date <= now,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompetitionPhase::AcceptingRegistrations => "ACCEPTING_REGISTRATIONS",
            CompetitionPhase::Admitting => "ADMITTING",
            CompetitionPhase::Running => "RUNNING",
            CompetitionPhase::Closable => "CLOSABLE",
        }
    }
}

impl std::fmt::Display for CompetitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competition that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompetition {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl NewCompetition {
    /// Build a competition, enforcing `start < registration_deadline <= end`
    pub fn new(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        registration_deadline: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self> {
        if !(start_date < registration_deadline && registration_deadline <= end_date) {
            return Err(DomainError::InvalidCompetitionWindow {
                start: start_date.to_rfc3339(),
                deadline: registration_deadline.to_rfc3339(),
                end: end_date.to_rfc3339(),
            });
        }
        Ok(Self {
            name: name.into(),
            start_date,
            registration_deadline,
            end_date,
        })
    }

    /// Window for the calendar month containing `now` in `timezone`.
    ///
    /// Start is the first instant of that month, the registration deadline
    /// `duration_months` later and the end `2 * duration_months` later.
    /// The name is derived from the month, e.g. "Competition March 2025".
    pub fn monthly(
        now: DateTime<Utc>,
        timezone: FixedOffset,
        duration_months: u32,
    ) -> Result<Self> {
        if duration_months == 0 {
            return Err(DomainError::InvalidDuration(duration_months));
        }

        let local_now = now.with_timezone(&timezone);
        let start = timezone
            .with_ymd_and_hms(local_now.year(), local_now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| DomainError::CalendarOverflow(local_now.to_rfc3339()))?;

        let deadline = start
            .checked_add_months(Months::new(duration_months))
            .ok_or_else(|| DomainError::CalendarOverflow(start.to_rfc3339()))?;
        let end = start
            .checked_add_months(Months::new(duration_months * 2))
            .ok_or_else(|| DomainError::CalendarOverflow(start.to_rfc3339()))?;

        Self::new(
            local_now.format("Competition %B %Y").to_string(),
            start.with_timezone(&Utc),
            deadline.with_timezone(&Utc),
            end.with_timezone(&Utc),
        )
    }
}
