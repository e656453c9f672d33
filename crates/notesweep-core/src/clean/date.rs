use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digits only; `\d` would also accept other Unicode digits.
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})").expect("date pattern is valid")
});

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Extract the first `YYYY-MM-DD` date embedded anywhere in `identifier`.
///
/// Returns `None` when there is no such substring or when it does not name a
/// real calendar day (e.g. `2024-02-30`).
pub fn extract_date(identifier: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(identifier)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Fractional days elapsed between midnight of `date` and `now`.
/// Negative when `date` lies in the future.
pub fn days_since(date: NaiveDate, now: NaiveDateTime) -> f64 {
    let elapsed = now - date.and_time(NaiveTime::MIN);
    elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Whether the note named `identifier` is at least `threshold_days` old.
/// Identifiers without a valid date are never eligible.
pub fn is_eligible(identifier: &str, threshold_days: u32, now: NaiveDateTime) -> bool {
    match extract_date(identifier) {
        Some(date) => days_since(date, now) >= f64::from(threshold_days),
        None => false,
    }
}
