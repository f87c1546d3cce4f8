//! Fixed event color palette.
//!
//! Maps palette colors to small integer ids and back. The palette is
//! modeled on the Google Calendar event colors; the last slot is a
//! sentinel reserved for "out of range" and is never handed out.

use tracing::warn;

/// Ordered palette. Index is the color id.
pub const COLOR_MAP: [&str; 13] = [
    "#b74f4f",
    "#7986cbff",
    "#33b679",
    "#8e24aaff",
    "#e67c73ff",
    "#f6bf26ff",
    "#f4511eff",
    "#039be5",
    "#616161",
    "#3f51b5",
    "#0b8043",
    "#d50000ff",
    "#000000",
];

/// Id handed out when a color is unknown or unset.
pub const DEFAULT_COLOR_ID: i64 = 0;

/// First invalid id; the last palette slot is the out-of-range sentinel.
pub const OUT_OF_RANGE_COLOR_ID: i64 = COLOR_MAP.len() as i64 - 2;

pub const DEFAULT_EVENT_COLOR: &str = COLOR_MAP[DEFAULT_COLOR_ID as usize];

/// Look up the id for a palette color string.
///
/// Unknown colors map to [`DEFAULT_COLOR_ID`]; this never fails.
pub fn color_id_from_color(color: &str) -> i64 {
    COLOR_MAP
        .iter()
        .position(|c| *c == color)
        .map(|i| i as i64)
        .unwrap_or(DEFAULT_COLOR_ID)
}

/// Look up the palette color for an id.
///
/// Ids outside `[0, OUT_OF_RANGE_COLOR_ID)` log a warning and fall back
/// to the default color.
pub fn color_from_color_id(color_id: i64) -> &'static str {
    if color_id < 0 || color_id >= OUT_OF_RANGE_COLOR_ID {
        warn!(color_id, "color id out of range, using default color");
        return COLOR_MAP[DEFAULT_COLOR_ID as usize];
    }
    COLOR_MAP[color_id as usize]
}
