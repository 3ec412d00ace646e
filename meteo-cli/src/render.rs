//! Plain-text weather card.

use std::fmt;

use meteo_core::{GeocodingResult, WeatherResponse, weather_code};

const DAILY_ROWS: usize = 7;
const HOURLY_ROWS: usize = 24;

/// "Paris, Île-de-France, France (48.8566, 2.3522)"
pub fn place_line(place: &GeocodingResult) -> String {
    format!("{} ({})", place.label(), place.coordinates())
}

/// Current conditions, then up to a week of daily rows and optionally the
/// next 24 hours. Missing samples print as `--`.
pub struct WeatherCard<'a> {
    weather: &'a WeatherResponse,
    hourly: bool,
}

impl<'a> WeatherCard<'a> {
    pub fn new(weather: &'a WeatherResponse, hourly: bool) -> Self {
        Self { weather, hourly }
    }
}

impl fmt::Display for WeatherCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weather = self.weather;

        match &weather.current {
            Some(current) => {
                let info = weather_code::lookup(current.weather_code);
                writeln!(
                    f,
                    "{}  {}°C  {}",
                    info.icon,
                    rounded(current.temperature_2m),
                    info.description
                )?;
                writeln!(
                    f,
                    "Wind {} km/h from {}°",
                    rounded(current.wind_speed_10m),
                    rounded(current.wind_direction_10m)
                )?;
            }
            None => writeln!(f, "No current conditions reported")?,
        }
        writeln!(f, "Timezone {}", weather.timezone)?;

        if let Some(daily) = weather.daily.as_ref().filter(|d| !d.is_empty()) {
            writeln!(f, "\n{}-Day Forecast", daily.len().min(DAILY_ROWS))?;
            for day in daily.samples().take(DAILY_ROWS) {
                let label = day
                    .date()
                    .map(|d| d.format("%a, %b %-d").to_string())
                    .unwrap_or_else(|| day.time.to_string());
                writeln!(
                    f,
                    "{:<12} {}  {}° / {}°",
                    label,
                    icon(day.weather_code),
                    Sample(day.temperature_2m_max.map(rounded)),
                    Sample(day.temperature_2m_min.map(rounded))
                )?;
            }
        }

        let series = weather.hourly.as_ref().filter(|h| self.hourly && !h.is_empty());
        if let Some(series) = series {
            writeln!(f, "\nNext 24 Hours")?;
            for hour in series.samples().take(HOURLY_ROWS) {
                let clock = hour.time.split_once('T').map_or(hour.time, |(_, t)| t);
                writeln!(
                    f,
                    "{:<5} {}  {:>3}°C  {:>3}%  {} mm  {} km/h",
                    clock,
                    icon(hour.weather_code),
                    Sample(hour.temperature_2m.map(rounded)),
                    Sample(hour.relative_humidity_2m.map(rounded)),
                    Sample(hour.precipitation.map(|mm| format!("{mm:.1}"))),
                    Sample(hour.wind_speed_10m.map(rounded))
                )?;
            }
        }

        Ok(())
    }
}

/// A series value, or `--` where the API had none. Honors width and alignment.
struct Sample<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for Sample<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => f.pad(&value.to_string()),
            None => f.pad("--"),
        }
    }
}

fn icon(code: Option<i32>) -> &'static str {
    code.map_or(weather_code::UNKNOWN.icon, weather_code::icon)
}

/// Half-away-from-zero, as shown on the card.
fn rounded(value: f64) -> i64 {
    value.round() as i64
}
