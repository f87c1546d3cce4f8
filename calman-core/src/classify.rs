//! Foreground/background event classification.
//!
//! Timed events whose title starts with a configured phase name
//! ("Arbeitszeit", "Unizeit", ...) render as full-bleed background
//! blocks. The edit-mode toggle unlocks them by classifying everything
//! as foreground, with no remote call involved.

use crate::event::{DisplayMode, EventRecord};

/// Decide how an event should be displayed.
///
/// Pure function of the event and the settings; it does not look at the
/// event's current `display` value, so reclassifying is idempotent.
pub fn classify(event: &EventRecord, phase_names: &[String], bg_edit_mode: bool) -> DisplayMode {
    classify_title(&event.title, event.all_day, phase_names, bg_edit_mode)
}

/// Classification on the raw fields, for callers that have no full
/// record yet (wire converters).
pub fn classify_title(
    title: &str,
    all_day: bool,
    phase_names: &[String],
    bg_edit_mode: bool,
) -> DisplayMode {
    // Case-sensitive prefix match, first match wins.
    let eligible = !all_day && phase_names.iter().any(|p| title.starts_with(p.as_str()));
    if eligible && !bg_edit_mode {
        DisplayMode::Background
    } else {
        DisplayMode::Auto
    }
}

/// Recompute `display` for every record in the window.
pub fn reclassify_all(events: &mut [EventRecord], phase_names: &[String], bg_edit_mode: bool) {
    for event in events.iter_mut() {
        event.display = classify(event, phase_names, bg_edit_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn phases() -> Vec<String> {
        vec!["Arbeitszeit".to_string(), "Unizeit".to_string()]
    }

    fn make_event(title: &str, all_day: bool) -> EventRecord {
        EventRecord {
            id: Some("e1".to_string()),
            title: title.to_string(),
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 12, 8, 0, 0).unwrap()),
            end: EventTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap()),
            all_day,
            color_id: 0,
            description: String::new(),
            display: DisplayMode::Auto,
            extended_props: BTreeMap::new(),
        }
    }

    #[test]
    fn test_phase_prefix_is_background() {
        let e = make_event("Arbeitszeit: gym", false);
        assert_eq!(classify(&e, &phases(), false), DisplayMode::Background);
    }

    #[test]
    fn test_edit_mode_unlocks_phase_blocks() {
        let e = make_event("Arbeitszeit: gym", false);
        assert_eq!(classify(&e, &phases(), true), DisplayMode::Auto);
    }

    #[test]
    fn test_non_phase_title_is_auto() {
        let e = make_event("Dentist", false);
        assert_eq!(classify(&e, &phases(), false), DisplayMode::Auto);
        assert_eq!(classify(&e, &phases(), true), DisplayMode::Auto);
    }

    #[test]
    fn test_all_day_is_never_background() {
        let e = make_event("Arbeitszeit: offsite", true);
        assert_eq!(classify(&e, &phases(), false), DisplayMode::Auto);
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let e = make_event("arbeitszeit: gym", false);
        assert_eq!(classify(&e, &phases(), false), DisplayMode::Auto);
    }

    #[test]
    fn test_classification_ignores_prior_display() {
        let mut e = make_event("Arbeitszeit: gym", false);
        e.display = classify(&e, &phases(), false);
        let again = classify(&e, &phases(), false);
        assert_eq!(again, e.display);
    }

    #[test]
    fn test_reclassify_all_updates_every_record() {
        let mut events = vec![
            make_event("Arbeitszeit: gym", false),
            make_event("Dentist", false),
        ];
        reclassify_all(&mut events, &phases(), false);
        assert_eq!(events[0].display, DisplayMode::Background);
        assert_eq!(events[1].display, DisplayMode::Auto);

        reclassify_all(&mut events, &phases(), true);
        assert_eq!(events[0].display, DisplayMode::Auto);
    }
}
