// Admission eligibility rules

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use super::competition::Competition;
use super::user::User;

/// Midnight of `date` in `timezone`, as an instant
pub fn wedding_instant(date: NaiveDate, timezone: FixedOffset) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    timezone
        .from_local_datetime(&midnight)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Check the per-user admission rules for one competition.
///
/// A user qualifies when they are gold and active, have a wedding date and a
/// content URL, and the wedding date lies in `[start_date, now]` and strictly
/// before the registration deadline.
///
/// Exclusivity across concurrently open competitions is not checked here;
/// the admission job tracks which users are already claimed.
pub fn is_eligible(
    user: &User,
    competition: &Competition,
    now: DateTime<Utc>,
    timezone: FixedOffset,
) -> bool {
    if !(user.is_gold && user.is_active) {
        return false;
    }
    if user.content_url().is_none() {
        return false;
    }
    let Some(wedding) = user
        .date_wedding
        .and_then(|date| wedding_instant(date, timezone))
    else {
        return false;
    };

    wedding >= competition.start_date
        && wedding <= now
        && wedding < competition.registration_deadline
}
