//! Weekly tracking window arithmetic.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Date layout of the window label.
pub const WINDOW_DATE_FORMAT: &str = "%d.%m.%Y";

/// Weekday and hour at which a tracking window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct WeeklyAnchor {
    /// Day of the week
    weekday: Weekday,
    /// Hour of the day, 0 to 23
    hour: u32,
}

impl Default for WeeklyAnchor {
    fn default() -> Self {
        Self::new(Weekday::Thu, 10)
    }
}

/// One seven-day tracking window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct TrackingWindow {
    /// Anchor instant that opens the window
    start: NaiveDateTime,
    /// Start plus seven days
    end: NaiveDateTime,
}

impl TrackingWindow {
    /// Label such as `09.01.2025 - 16.01.2025`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(WINDOW_DATE_FORMAT),
            self.end.format(WINDOW_DATE_FORMAT)
        )
    }
}

impl std::fmt::Display for TrackingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// The window labelled for `now`.
///
/// Weeks run Monday to Sunday. Take the upcoming anchor day (today when
/// `now` falls on the anchor weekday). Once the anchor weekday has passed
/// this week, or on the anchor day before the anchor hour, the window ends
/// at that anchor. Otherwise it starts there, so days before the anchor
/// weekday already show the coming window. An hour above 23 is clamped
/// to 23.
pub fn tracking_window(now: NaiveDateTime, anchor: WeeklyAnchor) -> TrackingWindow {
    let anchor_time = NaiveTime::from_hms_opt(anchor.hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);

    let today = now.weekday().num_days_from_monday();
    let anchor_day = anchor.weekday.num_days_from_monday();
    let days_ahead = (7 + anchor_day - today) % 7;
    let upcoming = (now.date() + Duration::days(i64::from(days_ahead))).and_time(anchor_time);

    let closing = today > anchor_day || (today == anchor_day && now.time() < anchor_time);
    let start = if closing {
        upcoming - Duration::days(7)
    } else {
        upcoming
    };

    TrackingWindow {
        start,
        end: start + Duration::days(7),
    }
}
