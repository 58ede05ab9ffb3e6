//! Time-Window Resolver
//!
//! Maps a named range token or an explicit custom pair to a concrete
//! `[start, end)` millisecond window on `created_at`. One implementation
//! shared by list, metrics, charts and export paths.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Resolve a window. An explicit custom pair wins over the named token;
/// `all`, unknown tokens or nothing at all mean "no time filter".
///
/// Named windows are trailing windows ending now, starting at UTC
/// start-of-day: `day` = today, `week` = 6 days back, `month` = 29 days
/// back, `year` = one calendar year back.
pub fn resolve_window(
    range: Option<&str>,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
    now_ms: i64,
) -> Option<(i64, i64)> {
    if let (Some(s), Some(e)) = (custom_start, custom_end)
        && let (Some(start), Some(end)) = (parse_instant(s, false), parse_instant(e, true))
    {
        return Some((start, end));
    }

    let now = Utc.timestamp_millis_opt(now_ms).single()?;
    let today = now.date_naive();

    let start_date = match range? {
        "day" => today,
        "week" => today - Duration::days(6),
        "month" => today - Duration::days(29),
        "year" => one_year_back(today),
        _ => return None, // "all" and anything unrecognized
    };

    Some((day_start_millis(start_date), now_ms))
}

fn one_year_back(date: NaiveDate) -> NaiveDate {
    // Feb 29 has no previous-year counterpart
    date.with_year(date.year() - 1)
        .unwrap_or(date - Duration::days(365))
}

fn day_start_millis(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
        .timestamp_millis()
}

/// Accepts RFC 3339 instants or bare `YYYY-MM-DD` dates. A bare end date
/// is widened to the start of the following day so the window stays
/// exclusive at the top.
fn parse_instant(s: &str, is_end: bool) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    if is_end {
        Some(day_start_millis(date + Duration::days(1)))
    } else {
        Some(day_start_millis(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 24 * 3_600_000;

    // 2024-06-15T12:00:00Z
    const NOW: i64 = 1_718_452_800_000;

    #[test]
    fn day_window_starts_at_midnight() {
        let (start, end) = resolve_window(Some("day"), None, None, NOW).unwrap();
        assert_eq!(end, NOW);
        assert_eq!(start, NOW - 12 * 3_600_000);
    }

    #[test]
    fn week_window_spans_seven_calendar_days() {
        let (start, end) = resolve_window(Some("week"), None, None, NOW).unwrap();
        assert_eq!(end, NOW);
        assert_eq!(start, NOW - 12 * 3_600_000 - 6 * DAY_MS);
    }

    #[test]
    fn all_and_unknown_mean_no_filter() {
        assert_eq!(resolve_window(Some("all"), None, None, NOW), None);
        assert_eq!(resolve_window(Some("fortnight"), None, None, NOW), None);
        assert_eq!(resolve_window(None, None, None, NOW), None);
    }

    #[test]
    fn custom_pair_wins_over_named_range() {
        let window = resolve_window(
            Some("day"),
            Some("2024-06-01"),
            Some("2024-06-10"),
            NOW,
        )
        .unwrap();
        let expected_start = day_start_millis(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        // bare end date is exclusive at the start of the next day
        let expected_end = day_start_millis(NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
        assert_eq!(window, (expected_start, expected_end));
    }

    #[test]
    fn custom_accepts_rfc3339() {
        let (start, _) = resolve_window(
            None,
            Some("2024-06-01T06:30:00Z"),
            Some("2024-06-02T00:00:00Z"),
            NOW,
        )
        .unwrap();
        let expected = day_start_millis(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            + 6 * 3_600_000
            + 30 * 60_000;
        assert_eq!(start, expected);
    }

    #[test]
    fn year_window_handles_leap_day() {
        // 2024-02-29T00:00:00Z
        let leap_noon = Utc
            .with_ymd_and_hms(2024, 2, 29, 12, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert!(resolve_window(Some("year"), None, None, leap_noon).is_some());
    }
}
