//! Weather overlay synthesis.
//!
//! Turns forecast data into synthetic half-hour background events that
//! substitute for the real event window while the overlay is active.
//! Overlay events are never persisted and never sent to the provider;
//! they carry no id.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::DEFAULT_COLOR_ID;
use crate::event::{DisplayMode, EventRecord, EventTime};

pub const DAY_WEATHER_COLOR: &str = "#fdf6c3ff";
pub const NIGHT_WEATHER_COLOR: &str = "#2f3b52ff";

/// Extended-props key carrying the day/night hex color for a slot.
pub const OVERLAY_COLOR_PROP: &str = "overlayColor";

/// One forecast sample covering a full hour (rendered as two half-hour
/// slots: a labeled one and a blank filler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub temperature: f64,
    pub condition: String,
}

/// Forecast for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub hourly: Vec<HourlySample>,
}

/// Build the synthetic overlay window from daily forecasts.
///
/// Slots start at midnight of each forecast day and advance in
/// 30-minute steps, two per hourly sample. A slot at or before sunrise,
/// or at or after sunset, gets the night color.
pub fn build_overlay_events(days: &[DailyForecast]) -> Vec<EventRecord> {
    let mut events = Vec::new();

    for day in days {
        let mut cursor = day.date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let sunrise = day.date.and_time(day.sunrise).and_utc();
        let sunset = day.date.and_time(day.sunset).and_utc();

        for sample in &day.hourly {
            let title = sample_label(sample);

            for slot_title in [title.as_str(), ""] {
                let is_at_night = cursor <= sunrise || cursor >= sunset;
                let color = if is_at_night {
                    NIGHT_WEATHER_COLOR
                } else {
                    DAY_WEATHER_COLOR
                };

                let mut extended_props = BTreeMap::new();
                extended_props.insert(
                    OVERLAY_COLOR_PROP.to_string(),
                    serde_json::Value::String(color.to_string()),
                );

                events.push(EventRecord {
                    id: None,
                    title: slot_title.to_string(),
                    start: EventTime::DateTime(cursor),
                    end: EventTime::DateTime(cursor + Duration::minutes(30)),
                    all_day: false,
                    color_id: DEFAULT_COLOR_ID,
                    description: sample.condition.clone(),
                    display: DisplayMode::Background,
                    extended_props,
                });

                cursor += Duration::minutes(30);
            }
        }
    }

    events
}

/// "18°C Partly cloudy"; the forecast provider's "nearby" qualifier is
/// dropped from the label.
fn sample_label(sample: &HourlySample) -> String {
    let label = format!("{}°C {}", sample.temperature.round(), sample.condition);
    label.replace("nearby", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast(hourly: Vec<HourlySample>) -> DailyForecast {
        DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            sunrise: NaiveTime::from_hms_opt(5, 30, 0).unwrap(),
            sunset: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            hourly,
        }
    }

    fn sample(temp: f64, condition: &str) -> HourlySample {
        HourlySample {
            temperature: temp,
            condition: condition.to_string(),
        }
    }

    #[test]
    fn test_two_slots_per_sample() {
        let events = build_overlay_events(&[forecast(vec![
            sample(17.6, "Sunny"),
            sample(18.2, "Cloudy"),
        ])]);
        assert_eq!(events.len(), 4);

        // Labeled slot then blank filler, contiguous half hours.
        assert_eq!(events[0].title, "18°C Sunny");
        assert_eq!(events[1].title, "");
        assert_eq!(events[0].end, events[1].start);
        assert_eq!(events[2].title, "18°C Cloudy");
        for e in &events {
            assert_eq!(e.duration_minutes(), 30);
            assert_eq!(e.display, DisplayMode::Background);
            assert_eq!(e.id, None);
        }
    }

    #[test]
    fn test_night_slots_before_sunrise() {
        // First slot of the day starts at 00:00, well before sunrise.
        let events = build_overlay_events(&[forecast(vec![sample(12.0, "Clear")])]);
        assert_eq!(
            events[0].extended_props[OVERLAY_COLOR_PROP],
            serde_json::Value::String(NIGHT_WEATHER_COLOR.to_string())
        );
    }

    #[test]
    fn test_day_slots_between_sunrise_and_sunset() {
        // 12 samples cover 00:00-12:00; the last slots are past sunrise.
        let hourly: Vec<_> = (0..12).map(|_| sample(20.0, "Sunny")).collect();
        let events = build_overlay_events(&[forecast(hourly)]);
        let last = events.last().unwrap();
        assert_eq!(
            last.extended_props[OVERLAY_COLOR_PROP],
            serde_json::Value::String(DAY_WEATHER_COLOR.to_string())
        );
    }

    #[test]
    fn test_nearby_is_stripped_from_label() {
        let events = build_overlay_events(&[forecast(vec![sample(
            9.0,
            "Patchy rain nearby",
        )])]);
        assert_eq!(events[0].title, "9°C Patchy rain ");
        // The description keeps the raw condition text.
        assert_eq!(events[0].description, "Patchy rain nearby");
    }
}
