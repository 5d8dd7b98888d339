//! Start days of multi-day composites

use chrono::{Datelike, Duration, NaiveDate};

use crate::mosaic::DayId;

/// Day-of-year numbers on which composite windows start
///
/// The first window starts on the first Sunday of the year; each following
/// one starts `days - 1` days later, so neighbouring windows share a day.
/// Windows are started as long as the start day is within the year.
pub fn composite_start_days(year: i32, days: usize) -> Vec<u32> {
    let Some(first_of_year) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };

    let to_sunday = 6 - first_of_year.weekday().num_days_from_monday() as i64;
    let step = Duration::days(days.saturating_sub(1).max(1) as i64);

    let mut start_days = Vec::new();
    let mut current = first_of_year + Duration::days(to_sunday);
    while current.year() == year {
        start_days.push(current.ordinal());
        current += step;
    }

    start_days
}

/// Days covered by the window starting at `start`
pub fn window_days(start: DayId, days: usize) -> impl Iterator<Item = DayId> {
    (0..days as u32).map(move |offset| start.plus(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_window_starts_on_the_first_sunday() {
        // 2020-01-05 and 2017-01-01 are Sundays
        assert_eq!(composite_start_days(2020, 8)[0], 5);
        assert_eq!(composite_start_days(2017, 8)[0], 1);
    }

    #[test]
    fn windows_advance_by_one_week() {
        let days = composite_start_days(2020, 8);
        assert_eq!(&days[..4], &[5, 12, 19, 26]);
        assert_eq!(days.last(), Some(&362));
        assert_eq!(days.len(), 52);
    }

    #[test]
    fn window_covers_consecutive_days() {
        let days: Vec<String> = window_days(DayId::new(2020, 362), 8).map(|day| day.to_string()).collect();
        assert_eq!(days, vec!["2020362", "2020363", "2020364", "2020365", "2020366", "2020367", "2020368", "2020369"]);
    }
}
