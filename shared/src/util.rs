/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one hour, as f64 for pending-hours arithmetic.
pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Convert a millisecond span to hours.
pub fn millis_to_hours(millis: i64) -> f64 {
    millis as f64 / MILLIS_PER_HOUR
}

/// Round to one decimal place (pending-hours display convention).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_to_hours_converts() {
        assert_eq!(millis_to_hours(3_600_000), 1.0);
        assert_eq!(millis_to_hours(1_800_000), 0.5);
    }

    #[test]
    fn round1_keeps_one_decimal() {
        assert_eq!(round1(5.04), 5.0);
        assert_eq!(round1(5.05), 5.1);
        assert_eq!(round1(29.97), 30.0);
    }
}
