use chrono::{DateTime, Utc};

use crate::listing::TimeValue;

/// Ordering key for sorting listings by urgency at `now`.
///
/// Lower keys sort first; listings without a deadline get the maximum key
/// and land after every timed listing. Already-ended listings floor at zero
/// instead of going negative.
pub fn ordering_key(time: &TimeValue, now: DateTime<Utc>) -> u64 {
    match time {
        TimeValue::NoDeadline => u64::MAX,
        TimeValue::Deadline(end) => seconds_left(*end, now),
        TimeValue::Legacy(seconds) => *seconds,
    }
}

fn seconds_left(end: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (end - now).num_seconds().max(0) as u64
}

/// Compact remaining-time label for display. Never affects sort order.
///
/// Days dominate once remaining time reaches a full day; below that hours
/// and minutes; below an hour minutes only. No-deadline listings render as
/// the literal `"N/A"`.
pub fn format_time_left(time: &TimeValue, now: DateTime<Utc>) -> String {
    let seconds = match time {
        TimeValue::NoDeadline => return "N/A".to_string(),
        TimeValue::Deadline(end) => seconds_left(*end, now),
        TimeValue::Legacy(seconds) => *seconds,
    };

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days >= 1 {
        format!("{days} day{}", if days > 1 { "s" } else { "" })
    } else if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hms: (u32, u32, u32)) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, hms.0, hms.1, hms.2).unwrap()
    }

    #[test]
    fn no_deadline_sorts_after_any_timed_listing() {
        let now = at((12, 0, 0));
        let far_out = TimeValue::Deadline(Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap());
        assert!(ordering_key(&TimeValue::NoDeadline, now) > ordering_key(&far_out, now));
        assert_eq!(ordering_key(&TimeValue::NoDeadline, now), u64::MAX);
    }

    #[test]
    fn ended_listings_floor_at_zero() {
        let now = at((12, 0, 0));
        let ended = TimeValue::Deadline(at((11, 0, 0)));
        assert_eq!(ordering_key(&ended, now), 0);
    }

    #[test]
    fn format_picks_the_dominant_unit() {
        let now = at((0, 0, 0));
        let in_3_days = TimeValue::Deadline(Utc.with_ymd_and_hms(2026, 8, 26, 5, 0, 0).unwrap());
        let in_1_day = TimeValue::Deadline(Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 1).unwrap());
        let in_4h = TimeValue::Deadline(at((4, 5, 0)));
        let in_12m = TimeValue::Deadline(at((0, 12, 30)));

        assert_eq!(format_time_left(&in_3_days, now), "3 days");
        assert_eq!(format_time_left(&in_1_day, now), "1 day");
        assert_eq!(format_time_left(&in_4h, now), "4h 5m");
        assert_eq!(format_time_left(&in_12m, now), "12m");
        assert_eq!(format_time_left(&TimeValue::Deadline(now), now), "0m");
    }

    #[test]
    fn no_deadline_formats_as_the_literal_token() {
        assert_eq!(format_time_left(&TimeValue::NoDeadline, at((12, 0, 0))), "N/A");
    }

    #[test]
    fn formatting_is_idempotent_over_legacy_values() {
        let now = at((9, 30, 0));
        let legacy = TimeValue::Legacy(14_700);
        assert_eq!(format_time_left(&legacy, now), "4h 5m");
        // Round-tripping the rendered label yields the same label.
        let reparsed = TimeValue::parse(&format_time_left(&legacy, now));
        assert_eq!(format_time_left(&reparsed, now), "4h 5m");
    }
}
