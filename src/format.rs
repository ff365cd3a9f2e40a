use chrono::{DateTime, Utc};

/// One decimal place, halves rounded away from zero (`1.25` becomes `"1.3"`).
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// Success percentage with one decimal. No attempts counts as fully healthy.
pub fn success_rate(successful: u64, total: u64) -> String {
    if total == 0 {
        return "100".to_string();
    }
    one_decimal(successful as f64 / total as f64 * 100.0)
}

pub fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{}s", one_decimal(ms as f64 / 1_000.0))
    } else {
        format!("{}m", one_decimal(ms as f64 / 60_000.0))
    }
}

/// Coarse age of `timestamp` relative to `now`, e.g. `"5m ago"`.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_elapsed(timestamp, now, "Just now")
}

/// Like [`format_relative_time`] with a caller-chosen label for the first minute.
pub fn format_elapsed(timestamp: DateTime<Utc>, now: DateTime<Utc>, under_a_minute: &str) -> String {
    let minutes = (now - timestamp).num_milliseconds().div_euclid(60_000);
    if minutes < 1 {
        return under_a_minute.to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %H:%M:%S").to_string()
}

/// `"decryption_failed"` becomes `"Decryption Failed"`.
pub fn title_case(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut at_word_start = true;

    for ch in raw.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            output.extend(ch.to_uppercase());
        } else {
            output.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }

    output
}

/// Thousands-separated integer, `12847` becomes `"12,847"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap()
    }

    #[test]
    fn success_rate_defaults_to_healthy() {
        assert_eq!(success_rate(0, 0), "100");
        assert_eq!(success_rate(19, 20), "95.0");
        assert_eq!(success_rate(1, 3), "33.3");
        assert_eq!(success_rate(0, 4), "0.0");
    }

    #[test]
    fn duration_thresholds() {
        assert_eq!(format_duration(0), "0ms");
        assert_eq!(format_duration(999), "999ms");
        assert_eq!(format_duration(1_000), "1.0s");
        assert_eq!(format_duration(1_500), "1.5s");
        assert_eq!(format_duration(59_999), "60.0s");
        assert_eq!(format_duration(60_000), "1.0m");
        assert_eq!(format_duration(90_000), "1.5m");
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(format_duration(1_250), "1.3s");
        assert_eq!(format_duration(1_050), "1.1s");
        assert_eq!(format_duration(150_000), "2.5m");
        assert_eq!(format_duration(93_000), "1.6m");
        assert_eq!(success_rate(1, 400), "0.3");
        assert_eq!(success_rate(399, 400), "99.8");
    }

    #[test]
    fn relative_time_boundaries() {
        let now = now();
        let ago = |d: Duration| format_relative_time(now - d, now);

        assert_eq!(ago(Duration::seconds(59)), "Just now");
        assert_eq!(ago(Duration::seconds(60)), "1m ago");
        assert_eq!(ago(Duration::minutes(59)), "59m ago");
        assert_eq!(ago(Duration::minutes(60)), "1h ago");
        assert_eq!(ago(Duration::minutes(60 * 24 - 1)), "23h ago");
        assert_eq!(ago(Duration::hours(24)), "1d ago");
        assert_eq!(ago(Duration::hours(71)), "2d ago");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = now();
        assert_eq!(format_relative_time(now + Duration::minutes(5), now), "Just now");
        assert_eq!(format_elapsed(now, now, "Just started"), "Just started");
    }

    #[test]
    fn title_case_matches_label_style() {
        assert_eq!(title_case("rate_limit"), "Rate Limit");
        assert_eq!(title_case("auth_expired"), "Auth Expired");
        assert_eq!(title_case("unknown"), "Unknown");
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(12_847), "12,847");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn timestamps_use_short_month() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 5, 9, 4, 7).unwrap();
        assert_eq!(format_timestamp(ts), "Jan 5, 09:04:07");
    }
}
