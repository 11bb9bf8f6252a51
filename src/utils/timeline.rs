// utils/timeline.rs
use chrono::{DateTime, Datelike, Utc};

/// True when a date divider belongs before the current message: always for
/// the first message, otherwise whenever the calendar date changed.
pub fn needs_date_divider(
    previous: Option<DateTime<Utc>>,
    current: DateTime<Utc>,
) -> bool {
    match previous {
        None => true,
        Some(previous) => previous.date_naive() != current.date_naive(),
    }
}

/// Divider text, e.g. "4 Dec".
pub fn divider_label(timestamp: DateTime<Utc>) -> String {
    format!("{} {}", timestamp.day(), timestamp.format("%b"))
}

/// Compact "last activity" label for chat lists:
/// today -> HH:mm, one day ago -> "Yesterday", same ISO week -> weekday
/// name, anything older -> dd.MM.yy.
pub fn last_activity_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let date = timestamp.date_naive();
    let today = now.date_naive();

    if date == today {
        timestamp.format("%H:%M").to_string()
    } else if today.signed_duration_since(date).num_days() == 1 {
        // Date arithmetic, so the year boundary works
        "Yesterday".to_string()
    } else if date.iso_week() == today.iso_week() {
        timestamp.format("%A").to_string()
    } else {
        timestamp.format("%d.%m.%y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn divider_appears_on_calendar_date_change() {
        let late = at(2024, 1, 1, 23, 59);
        let early_next = at(2024, 1, 2, 0, 1);

        assert!(needs_date_divider(Some(late), early_next));
        assert!(!needs_date_divider(Some(late), at(2024, 1, 1, 23, 59)));
        assert!(!needs_date_divider(
            Some(at(2024, 1, 1, 0, 0)),
            at(2024, 1, 1, 23, 59)
        ));
    }

    #[test]
    fn first_message_always_starts_a_group() {
        assert!(needs_date_divider(None, at(2024, 1, 1, 12, 0)));
    }

    #[test]
    fn divider_label_is_day_and_month() {
        assert_eq!(divider_label(at(2023, 12, 4, 10, 0)), "4 Dec");
    }

    #[test]
    fn same_day_renders_as_time() {
        let now = at(2024, 5, 15, 18, 0);
        assert_eq!(last_activity_label(at(2024, 5, 15, 9, 5), now), "09:05");
    }

    #[test]
    fn previous_day_renders_as_yesterday() {
        let now = at(2024, 5, 15, 8, 0);
        assert_eq!(
            last_activity_label(at(2024, 5, 14, 23, 30), now),
            "Yesterday"
        );
    }

    #[test]
    fn yesterday_works_across_the_year_boundary() {
        let now = at(2024, 1, 1, 8, 0);
        assert_eq!(
            last_activity_label(at(2023, 12, 31, 22, 0), now),
            "Yesterday"
        );
    }

    #[test]
    fn same_iso_week_renders_as_weekday_name() {
        // 2024-05-15 is a Wednesday; the 13th is the Monday of that week
        let now = at(2024, 5, 15, 8, 0);
        assert_eq!(last_activity_label(at(2024, 5, 13, 10, 0), now), "Monday");
    }

    #[test]
    fn older_dates_render_as_short_date() {
        let now = at(2024, 5, 15, 8, 0);
        assert_eq!(last_activity_label(at(2024, 4, 2, 10, 0), now), "02.04.24");
    }
}
