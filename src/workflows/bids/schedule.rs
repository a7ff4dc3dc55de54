use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Number of weeks of history the scoring pass accumulates over.
pub const LOOKBACK_WEEKS: i64 = 4;

/// Time source consumed by the evaluation job. Weeks run Monday through
/// Sunday; `week_end` is the only calendar arithmetic the job relies on.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    /// The boundary closing the calendar week containing `reference`:
    /// midnight (UTC) on that week's Sunday.
    fn week_end(&self, reference: DateTime<Utc>) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn week_end(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        closing_sunday(reference)
    }
}

/// Midnight on the Sunday of the week containing `reference`.
pub fn closing_sunday(reference: DateTime<Utc>) -> DateTime<Utc> {
    let date = reference.date_naive();
    let to_sunday = 7 - i64::from(date.weekday().number_from_monday());
    (date + Duration::days(to_sunday))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Start of the scoring window: `LOOKBACK_WEEKS` before the week boundary.
pub fn lookback_start(week_end: DateTime<Utc>) -> DateTime<Utc> {
    week_end - Duration::weeks(LOOKBACK_WEEKS)
}
