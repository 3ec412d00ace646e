use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point on the globe; the key for every forecast lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Body of `GET /forecast`. Each section is only present when it was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentWeather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyWeather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailyWeather>,
}

impl WeatherResponse {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Check the parallel-array invariant of every present section.
    pub fn check_aligned(&self) -> Result<()> {
        if let Some(hourly) = &self.hourly {
            hourly.check_aligned()?;
        }
        if let Some(daily) = &self.daily {
            daily.check_aligned()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub time: String,
    pub temperature_2m: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    /// 1 during daylight, 0 at night.
    pub is_day: u8,
}

impl CurrentWeather {
    pub fn is_daytime(&self) -> bool {
        self.is_day != 0
    }
}

/// Hourly series; index `i` of every vector describes the same hour.
///
/// The API reports a missing sample as `null`, which lands here as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample<'a> {
    pub time: &'a str,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_10m: Option<f64>,
}

impl HourlyWeather {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn check_aligned(&self) -> Result<()> {
        check_lengths(
            "hourly",
            self.time.len(),
            &[
                ("temperature_2m", self.temperature_2m.len()),
                ("relative_humidity_2m", self.relative_humidity_2m.len()),
                ("precipitation", self.precipitation.len()),
                ("weather_code", self.weather_code.len()),
                ("wind_speed_10m", self.wind_speed_10m.len()),
            ],
        )
    }

    /// Row view over the series. Stops at the shortest vector, so it is safe
    /// even on unchecked data.
    pub fn samples(&self) -> impl Iterator<Item = HourlySample<'_>> {
        self.time
            .iter()
            .zip(&self.temperature_2m)
            .zip(&self.relative_humidity_2m)
            .zip(&self.precipitation)
            .zip(&self.weather_code)
            .zip(&self.wind_speed_10m)
            .map(
                |(((((time, temp), humidity), precipitation), code), wind)| HourlySample {
                    time,
                    temperature_2m: *temp,
                    relative_humidity_2m: *humidity,
                    precipitation: *precipitation,
                    weather_code: *code,
                    wind_speed_10m: *wind,
                },
            )
    }
}

/// Daily series; index `i` of every vector describes the same day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySample<'a> {
    pub time: &'a str,
    pub weather_code: Option<i32>,
    pub temperature_2m_max: Option<f64>,
    pub temperature_2m_min: Option<f64>,
    /// Absent during polar day or night.
    pub sunrise: Option<&'a str>,
    pub sunset: Option<&'a str>,
    pub precipitation_sum: Option<f64>,
    pub wind_speed_10m_max: Option<f64>,
}

impl DailySample<'_> {
    /// The `YYYY-MM-DD` day this row describes.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.time, "%Y-%m-%d").ok()
    }
}

impl DailyWeather {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn check_aligned(&self) -> Result<()> {
        check_lengths(
            "daily",
            self.time.len(),
            &[
                ("weather_code", self.weather_code.len()),
                ("temperature_2m_max", self.temperature_2m_max.len()),
                ("temperature_2m_min", self.temperature_2m_min.len()),
                ("sunrise", self.sunrise.len()),
                ("sunset", self.sunset.len()),
                ("precipitation_sum", self.precipitation_sum.len()),
                ("wind_speed_10m_max", self.wind_speed_10m_max.len()),
            ],
        )
    }

    pub fn samples(&self) -> impl Iterator<Item = DailySample<'_>> {
        (0..self.min_len()).map(move |i| DailySample {
            time: &self.time[i],
            weather_code: self.weather_code[i],
            temperature_2m_max: self.temperature_2m_max[i],
            temperature_2m_min: self.temperature_2m_min[i],
            sunrise: self.sunrise[i].as_deref(),
            sunset: self.sunset[i].as_deref(),
            precipitation_sum: self.precipitation_sum[i],
            wind_speed_10m_max: self.wind_speed_10m_max[i],
        })
    }

    fn min_len(&self) -> usize {
        [
            self.time.len(),
            self.weather_code.len(),
            self.temperature_2m_max.len(),
            self.temperature_2m_min.len(),
            self.sunrise.len(),
            self.sunset.len(),
            self.precipitation_sum.len(),
            self.wind_speed_10m_max.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

fn check_lengths(
    section: &'static str,
    expected: usize,
    fields: &[(&'static str, usize)],
) -> Result<()> {
    match fields.iter().find(|(_, len)| *len != expected) {
        Some(&(field, actual)) => Err(Error::MisalignedSeries {
            section,
            field,
            expected,
            actual,
        }),
        None => Ok(()),
    }
}

/// One hit from the geocoding endpoint. `id` is only unique within a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin2: Option<String>,
}

impl GeocodingResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "Name, Admin1, Country", skipping the region when unknown.
    pub fn label(&self) -> String {
        match &self.admin1 {
            Some(admin1) => format!("{}, {}, {}", self.name, admin1, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Body of the geocoding search. The API omits `results` entirely when nothing matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<GeocodingResult>>,
}

impl GeocodingResponse {
    pub fn into_results(self) -> Vec<GeocodingResult> {
        self.results.unwrap_or_default()
    }

    pub fn first(&self) -> Option<&GeocodingResult> {
        self.results.as_ref().and_then(|r| r.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_json() -> &'static str {
        r#"{
            "time": ["2024-01-15", "2024-01-16"],
            "weather_code": [3, 61],
            "temperature_2m_max": [8.0, 6.0],
            "temperature_2m_min": [2.0, 1.0],
            "sunrise": ["2024-01-15T07:15", "2024-01-16T07:14"],
            "sunset": ["2024-01-15T16:30", "2024-01-16T16:32"],
            "precipitation_sum": [0.0, 5.5],
            "wind_speed_10m_max": [15.0, 20.0]
        }"#
    }

    #[test]
    fn parses_partial_weather_response() {
        let json = r#"{
            "latitude": 48.86,
            "longitude": 2.35,
            "timezone": "Europe/Paris",
            "current": {
                "time": "2024-01-15T12:00",
                "interval": 900,
                "temperature_2m": 5.5,
                "weather_code": 0,
                "wind_speed_10m": 12.5,
                "wind_direction_10m": 225,
                "is_day": 1
            }
        }"#;

        let parsed: WeatherResponse = serde_json::from_str(json).unwrap();
        let current = parsed.current.as_ref().unwrap();
        assert_eq!(current.temperature_2m, 5.5);
        assert_eq!(current.wind_direction_10m, 225.0);
        assert!(current.is_daytime());
        assert!(parsed.hourly.is_none());
        assert!(parsed.daily.is_none());
        assert_eq!(parsed.coordinates(), Coordinates::new(48.86, 2.35));
    }

    #[test]
    fn daily_samples_follow_index() {
        let daily: DailyWeather = serde_json::from_str(daily_json()).unwrap();
        daily.check_aligned().unwrap();

        let rows: Vec<_> = daily.samples().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].time, "2024-01-16");
        assert_eq!(rows[1].weather_code, Some(61));
        assert_eq!(rows[1].precipitation_sum, Some(5.5));
        assert_eq!(rows[0].sunrise, Some("2024-01-15T07:15"));
        assert_eq!(rows[0].date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn misaligned_daily_is_rejected() {
        let mut daily: DailyWeather = serde_json::from_str(daily_json()).unwrap();
        daily.sunset.pop();

        let err = daily.check_aligned().unwrap_err();
        match err {
            Error::MisalignedSeries {
                section,
                field,
                expected,
                actual,
            } => {
                assert_eq!(section, "daily");
                assert_eq!(field, "sunset");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Rows never read past the shortest series.
        assert_eq!(daily.samples().count(), 1);
    }

    #[test]
    fn misaligned_hourly_is_rejected_through_response() {
        let response = WeatherResponse {
            latitude: 0.0,
            longitude: 0.0,
            timezone: "GMT".into(),
            timezone_abbreviation: None,
            utc_offset_seconds: None,
            elevation: None,
            current: None,
            hourly: Some(HourlyWeather {
                time: vec!["2024-01-15T00:00".into(), "2024-01-15T01:00".into()],
                temperature_2m: vec![Some(1.0), Some(2.0)],
                relative_humidity_2m: vec![Some(80.0), Some(81.0)],
                precipitation: vec![Some(0.0)],
                weather_code: vec![Some(0), Some(1)],
                wind_speed_10m: vec![Some(3.0), Some(4.0)],
            }),
            daily: None,
        };

        assert!(matches!(
            response.check_aligned(),
            Err(Error::MisalignedSeries { field: "precipitation", .. })
        ));
    }

    #[test]
    fn null_samples_decode_as_gaps() {
        let json = r#"{
            "time": ["2024-06-21", "2024-06-22"],
            "weather_code": [0, null],
            "temperature_2m_max": [null, 14.0],
            "temperature_2m_min": [4.0, 5.0],
            "sunrise": [null, null],
            "sunset": [null, null],
            "precipitation_sum": [0.0, 0.2],
            "wind_speed_10m_max": [9.0, null]
        }"#;

        let daily: DailyWeather = serde_json::from_str(json).unwrap();
        daily.check_aligned().unwrap();

        let rows: Vec<_> = daily.samples().collect();
        assert_eq!(rows[0].temperature_2m_max, None);
        assert_eq!(rows[0].temperature_2m_min, Some(4.0));
        assert_eq!(rows[1].weather_code, None);
        assert_eq!(rows[1].sunrise, None);
    }

    #[test]
    fn missing_results_means_no_matches() {
        let parsed: GeocodingResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.5}"#).unwrap();
        assert!(parsed.first().is_none());
        assert!(parsed.into_results().is_empty());
    }

    #[test]
    fn label_skips_missing_region() {
        let mut paris = GeocodingResult {
            id: 2988507,
            name: "Paris".into(),
            latitude: 48.8566,
            longitude: 2.3522,
            country: "France".into(),
            admin1: Some("Île-de-France".into()),
            admin2: None,
        };
        assert_eq!(paris.label(), "Paris, Île-de-France, France");

        paris.admin1 = None;
        assert_eq!(paris.label(), "Paris, France");
    }
}
