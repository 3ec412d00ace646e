//! WMO weather interpretation codes as returned in `weather_code`.
//!
//! This is the only code table in the crate; plain labels and display icons
//! are both read from it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherCodeInfo {
    pub description: &'static str,
    pub icon: &'static str,
}

pub const UNKNOWN: WeatherCodeInfo = WeatherCodeInfo {
    description: "Unknown",
    icon: "🌍",
};

const fn entry(description: &'static str, icon: &'static str) -> WeatherCodeInfo {
    WeatherCodeInfo { description, icon }
}

/// Sorted by code so lookups can binary-search.
const TABLE: &[(i32, WeatherCodeInfo)] = &[
    (0, entry("Clear sky", "☀️")),
    (1, entry("Mainly clear", "🌤️")),
    (2, entry("Partly cloudy", "⛅")),
    (3, entry("Overcast", "☁️")),
    (45, entry("Foggy", "🌫️")),
    (48, entry("Depositing rime fog", "🌫️")),
    (51, entry("Light drizzle", "🌦️")),
    (53, entry("Moderate drizzle", "🌦️")),
    (55, entry("Dense drizzle", "🌧️")),
    (61, entry("Slight rain", "🌧️")),
    (63, entry("Moderate rain", "🌧️")),
    (65, entry("Heavy rain", "⛈️")),
    (71, entry("Slight snow", "🌨️")),
    (73, entry("Moderate snow", "🌨️")),
    (75, entry("Heavy snow", "❄️")),
    (77, entry("Snow grains", "🌨️")),
    (80, entry("Slight rain showers", "🌦️")),
    (81, entry("Moderate rain showers", "🌧️")),
    (82, entry("Violent rain showers", "⛈️")),
    (85, entry("Slight snow showers", "🌨️")),
    (86, entry("Heavy snow showers", "❄️")),
    (95, entry("Thunderstorm", "⛈️")),
    (96, entry("Thunderstorm with slight hail", "⛈️")),
    (99, entry("Thunderstorm with heavy hail", "⛈️")),
];

/// Full entry for `code`, or [`UNKNOWN`] for codes the table does not list.
pub fn lookup(code: i32) -> WeatherCodeInfo {
    TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .map(|idx| TABLE[idx].1)
        .unwrap_or(UNKNOWN)
}

pub fn describe(code: i32) -> &'static str {
    lookup(code).description
}

pub fn icon(code: i32) -> &'static str {
    lookup(code).icon
}

/// Every known code in ascending order.
pub fn known_codes() -> impl Iterator<Item = i32> {
    TABLE.iter().map(|(code, _)| *code)
}
