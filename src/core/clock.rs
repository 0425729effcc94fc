//! Pure day/month boundary math. Every function is deterministic given its
//! inputs; `now` is pinned once per request by the handler and passed down so
//! that all window computations inside one request agree.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};

/// Half-open `[start_of_day, start_of_next_day)` at UTC midnight.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = (date + Days::new(1)).and_time(NaiveTime::MIN).and_utc();
    (start, end)
}

/// Late iff the time-of-day is strictly past work start plus the grace
/// window; 09:00 start with the default 30-minute window yields the 09:30
/// cutoff.
pub fn is_late(check_in: DateTime<Utc>, working_start: NaiveTime, grace_minutes: i64) -> bool {
    let cutoff = working_start + Duration::minutes(grace_minutes);
    check_in.time() > cutoff
}

/// Half-open `[first_of_month, first_of_next_month)`; `None` for a month
/// outside 1..=12.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((
        first.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// An explicit end date is widened to the last representable instant of that
/// day, so a `[2026-01-01, 2026-01-31]` filter covers the whole final day.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap())
        .and_utc()
}

/// Resolved aggregation window. Bounds stay optional so that a caller
/// providing only one side constrains only that side; the `period_*`
/// accessors give the concrete envelope reports display.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

impl Window {
    /// Both bounds absent -> the last 30 days ending at `now`.
    pub fn resolve(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Self {
        match (start_date, end_date) {
            (None, None) => Window {
                start: Some(now - Duration::days(30)),
                end: None,
                now,
            },
            _ => Window {
                start: start_date.map(|d| day_bounds(d).0),
                end: end_date.map(end_of_day),
                now,
            },
        }
    }

    pub fn period_start(&self) -> DateTime<Utc> {
        self.start.unwrap_or(self.now - Duration::days(30))
    }

    pub fn period_end(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hms(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, h, m, s).unwrap()
    }

    #[test]
    fn day_bounds_are_half_open_at_midnight() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn lateness_cutoff_is_start_plus_grace() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(!is_late(hms(9, 29, 0), start, 30));
        assert!(!is_late(hms(9, 30, 0), start, 30));
        assert!(is_late(hms(9, 30, 1), start, 30));
        assert!(is_late(hms(9, 31, 0), start, 30));
    }

    #[test]
    fn month_bounds_roll_over_the_year() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(month_bounds(2026, 0).is_none());
        assert!(month_bounds(2026, 13).is_none());
    }

    #[test]
    fn window_defaults_to_last_thirty_days() {
        let now = hms(12, 0, 0);
        let window = Window::resolve(None, None, now);
        assert_eq!(window.start, Some(now - Duration::days(30)));
        assert_eq!(window.end, None);
        assert_eq!(window.period_end(), now);
    }

    #[test]
    fn explicit_end_date_is_widened_to_end_of_day() {
        let now = hms(12, 0, 0);
        let end = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        let window = Window::resolve(None, Some(end), now);
        assert_eq!(window.start, None);
        assert_eq!(
            window.end.unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 4, 23, 59, 59)
                .unwrap()
                .checked_add_signed(Duration::milliseconds(999))
                .unwrap()
        );
    }

    #[test]
    fn single_sided_window_keeps_the_other_bound_open() {
        let now = hms(12, 0, 0);
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let window = Window::resolve(Some(start), None, now);
        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(window.end, None);
        assert_eq!(window.period_end(), now);
    }
}
