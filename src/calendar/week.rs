use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, TimeZone};

// No timezone skips more than a day
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Sunday 00:00:00.000 through Saturday 23:59:59.999 of one week
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// The week containing `now`, in `now`'s timezone.
pub fn week_window<Tz: TimeZone>(now: &DateTime<Tz>) -> WeekWindow {
    let tz = now.timezone();
    let days_since_sunday = i64::from(now.weekday().num_days_from_sunday());
    let sunday = now.date_naive() - Duration::days(days_since_sunday);

    let start_naive = sunday.and_time(NaiveTime::MIN);
    let end_naive = start_naive + Duration::days(7) - Duration::milliseconds(1);

    // Local midnight can fall in a DST gap (America/Santiago); the week
    // then starts at the first instant after it, still on Sunday.
    let start = resolve_local(&tz, start_naive, Duration::minutes(1), true);
    let end = resolve_local(&tz, end_naive, Duration::minutes(-1), false);

    WeekWindow {
        start: start.fixed_offset(),
        end: end.fixed_offset(),
    }
}

/// Map a wall-clock time to an instant, moving by `step` until it
/// leaves a DST gap. Ambiguous times take the earliest or latest
/// instant.
fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    step: Duration,
    earliest: bool,
) -> DateTime<Tz> {
    (0..=MAX_GAP_MINUTES)
        .find_map(|n| {
            let local = tz.from_local_datetime(&(naive + step * n as i32));
            if earliest {
                local.earliest()
            } else {
                local.latest()
            }
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike, Utc, Weekday};
    use chrono_tz::America::New_York;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn it_starts_on_sunday_midnight() {
        // Wednesday
        let window = week_window(&utc(2024, 6, 5, 14, 30));
        assert_eq!(window.start.weekday(), Weekday::Sun);
        assert_eq!(
            window.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
        assert_eq!(window.start.time(), NaiveTime::MIN);
    }

    #[test]
    fn it_ends_on_saturday_last_millisecond() {
        let window = week_window(&utc(2024, 6, 5, 14, 30));
        assert_eq!(window.end.weekday(), Weekday::Sat);
        assert_eq!(
            window.end.date_naive(),
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
        );
        assert_eq!(window.end.hour(), 23);
        assert_eq!(window.end.minute(), 59);
        assert_eq!(window.end.second(), 59);
        assert_eq!(window.end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn it_spans_six_days_and_a_day_minus_a_millisecond() {
        let expected = Duration::days(6)
            + Duration::hours(23)
            + Duration::minutes(59)
            + Duration::seconds(59)
            + Duration::milliseconds(999);
        // Every day of two consecutive weeks, at both ends of the day
        for day in 1..=14 {
            for (h, m) in [(0, 0), (23, 59)] {
                let window = week_window(&utc(2024, 6, day, h, m));
                assert_eq!(window.start.weekday(), Weekday::Sun);
                assert_eq!(window.start.time(), NaiveTime::MIN);
                assert_eq!(window.end - window.start, expected);
            }
        }
    }

    #[test]
    fn it_keeps_sunday_in_its_own_week() {
        let window = week_window(&utc(2024, 6, 9, 0, 0));
        assert_eq!(
            window.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
        );
    }

    #[test]
    fn it_crosses_month_and_year_boundaries() {
        // Tuesday 2024-12-31
        let window = week_window(&utc(2024, 12, 31, 9, 0));
        assert_eq!(
            window.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 12, 29).unwrap()
        );
        assert_eq!(
            window.end.date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
    }

    #[test]
    fn it_uses_the_given_timezone() {
        // Sunday 02:00 UTC is still Saturday evening in New York
        let now = utc(2024, 6, 9, 2, 0).with_timezone(&New_York);
        let window = week_window(&now);
        assert_eq!(
            window.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
        assert_eq!(window.start.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn it_handles_weeks_spanning_dst_changes() {
        // US DST started 2024-03-10, a Sunday
        let now = utc(2024, 3, 13, 12, 0).with_timezone(&New_York);
        let window = week_window(&now);
        assert_eq!(window.start.time(), NaiveTime::MIN);
        assert_eq!(window.start.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(window.end.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn it_starts_after_a_dst_gap_at_midnight() {
        // Santiago skipped from 2024-09-08 00:00 to 01:00
        let now = utc(2024, 9, 11, 16, 0).with_timezone(&chrono_tz::America::Santiago);
        let window = week_window(&now);
        assert_eq!(window.start.weekday(), Weekday::Sun);
        assert_eq!(
            window.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 9, 8).unwrap()
        );
        assert_eq!(window.start.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(window.start.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(window.end.weekday(), Weekday::Sat);
        assert_eq!(
            window.end.date_naive(),
            NaiveDate::from_ymd_opt(2024, 9, 14).unwrap()
        );
        assert_eq!(window.end.timestamp_subsec_millis(), 999);
    }
}
