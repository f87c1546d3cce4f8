//! Fetch window math.
//!
//! The local window always spans three weeks: one week before the start
//! of the viewed week through one week after its end. Weeks start on
//! Monday.

use chrono::{DateTime, Datelike, Duration, Utc};

/// Time span requested from the data source for a viewed date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl FetchWindow {
    /// Window around `date`: `startOfWeek - 1w` .. `endOfWeek + 1w`.
    pub fn around(date: DateTime<Utc>) -> Self {
        let days_from_monday = date.weekday().num_days_from_monday() as i64;
        let monday = date.date_naive() - Duration::days(days_from_monday);
        let sunday = monday + Duration::days(6);

        FetchWindow {
            time_min: (monday - Duration::weeks(1))
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
            time_max: (sunday + Duration::weeks(1))
                .and_hms_opt(23, 59, 59)
                .unwrap()
                .and_utc(),
        }
    }

    pub fn time_min_rfc3339(&self) -> String {
        self.time_min.to_rfc3339()
    }

    pub fn time_max_rfc3339(&self) -> String {
        self.time_max.to_rfc3339()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.time_min && instant <= self.time_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_around_midweek_date() {
        // 2024-06-12 is a Wednesday; its week is Mon 06-10 .. Sun 06-16.
        let view = Utc.with_ymd_and_hms(2024, 6, 12, 14, 30, 0).unwrap();
        let window = FetchWindow::around(view);
        assert_eq!(
            window.time_min,
            Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()
        );
        assert_eq!(
            window.time_max,
            Utc.with_ymd_and_hms(2024, 6, 23, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_window_around_monday_and_sunday() {
        let monday = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2024, 6, 16, 23, 0, 0).unwrap();
        // Both fall in the same viewed week and yield the same window.
        assert_eq!(FetchWindow::around(monday), FetchWindow::around(sunday));
    }

    #[test]
    fn test_window_spans_three_weeks() {
        let window = FetchWindow::around(Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap());
        let span = window.time_max - window.time_min;
        assert_eq!(span, Duration::days(21) - Duration::seconds(1));
    }
}
