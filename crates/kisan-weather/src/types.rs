use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kisan_core::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather condition categories mapped from provider condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert a WeatherAPI.com condition code to a WeatherCondition
    /// See: https://www.weatherapi.com/docs/weather_conditions.json
    pub fn from_provider_code(code: i32) -> Self {
        match code {
            1000 => Self::Clear,
            1003 => Self::PartlyCloudy,
            1006 | 1009 => Self::Cloudy,
            1030 | 1135 | 1147 => Self::Fog,
            1150 | 1153 => Self::Drizzle,
            1072 | 1168 | 1171 => Self::Sleet, // Freezing drizzle
            1063 | 1180 | 1183 | 1186 | 1189 | 1240 => Self::Rain,
            1192 | 1195 | 1243 | 1246 => Self::HeavyRain,
            1069 | 1198 | 1201 | 1204 | 1207 | 1249 | 1252 => Self::Sleet,
            1066 | 1114 | 1117 | 1210..=1225 | 1237 | 1255 | 1258 | 1261 | 1264 => Self::Snow,
            1087 | 1273 | 1276 | 1279 | 1282 => Self::Thunderstorm,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Emoji icon for compact displays; clear and partly cloudy skies show a
    /// moon at night.
    pub fn icon(&self, is_day: bool) -> &'static str {
        match self {
            Self::Clear | Self::PartlyCloudy if !is_day => "🌙",
            Self::Clear => "☀️",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁️",
            Self::Fog => "🌫️",
            Self::Drizzle => "🌦️",
            Self::Rain | Self::HeavyRain => "🌧️",
            Self::Snow | Self::Sleet => "🌨️",
            Self::Thunderstorm => "⛈️",
        }
    }
}

/// What to fetch a forecast for: a free-text place or a coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationQuery {
    Named(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    /// Non-empty text, or coordinates inside the valid ranges.
    pub fn validate(&self) -> Result<(), FetchError> {
        match self {
            LocationQuery::Named(name) if name.trim().is_empty() => {
                Err(FetchError::invalid_query("Location query (q) is required"))
            }
            LocationQuery::Named(_) => Ok(()),
            LocationQuery::Coordinates { latitude, longitude } => {
                if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
                    Err(FetchError::invalid_query(format!(
                        "Coordinates out of range: {},{}",
                        latitude, longitude
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Value of the provider's `q` parameter.
    pub fn as_param(&self) -> String {
        match self {
            LocationQuery::Named(name) => name.trim().to_string(),
            LocationQuery::Coordinates { latitude, longitude } => {
                format!("{},{}", latitude, longitude)
            }
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}

/// A named point the dashboard can show weather for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn query(&self) -> LocationQuery {
        LocationQuery::Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Same place, ignoring name casing.
    pub fn same_as(&self, other: &Place) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
            && self.latitude == other.latitude
            && self.longitude == other.longitude
    }
}

impl From<&kisan_core::DefaultLocation> for Place {
    fn from(loc: &kisan_core::DefaultLocation) -> Self {
        Place::new(loc.name.clone(), loc.latitude, loc.longitude)
    }
}

/// A user-saved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub added_at: DateTime<Utc>,
}

impl FavoriteLocation {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            added_at: Utc::now(),
        }
    }

    pub fn place(&self) -> Place {
        Place::new(self.name.clone(), self.latitude, self.longitude)
    }
}

/// A search hit, from geocoding or from the favorites list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl LocationCandidate {
    /// "Name, Region" when a region is known.
    pub fn display_name(&self) -> String {
        match self.admin1.as_deref() {
            Some(region) if !region.is_empty() && region != self.name => {
                format!("{}, {}", self.name, region)
            }
            _ => self.name.clone(),
        }
    }

    pub fn place(&self) -> Place {
        Place::new(self.name.clone(), self.latitude, self.longitude)
    }
}

impl From<&FavoriteLocation> for LocationCandidate {
    fn from(fav: &FavoriteLocation) -> Self {
        Self {
            name: fav.name.clone(),
            latitude: fav.latitude,
            longitude: fav.longitude,
            admin1: None,
            country: None,
        }
    }
}

/// Current conditions at capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub uv_index: f64,
    pub visibility_km: f64,
    pub condition_text: String,
    pub condition: WeatherCondition,
    pub is_day: bool,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub precipitation_chance_pct: u8,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub condition_text: String,
    pub condition: WeatherCondition,
}

/// One complete, normalized forecast.
///
/// Never edited in place: each refresh produces a new snapshot that replaces
/// the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
    pub current: CurrentConditions,
    pub daily_forecast: Vec<DailyForecast>,
}

impl ForecastSnapshot {
    /// The upcoming forecast day (the first daily entry).
    pub fn next_day(&self) -> Option<&DailyForecast> {
        self.daily_forecast.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_code_clear() {
        assert_eq!(WeatherCondition::from_provider_code(1000), WeatherCondition::Clear);
    }

    #[test]
    fn test_provider_code_clouds_and_fog() {
        assert_eq!(WeatherCondition::from_provider_code(1003), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_provider_code(1009), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_provider_code(1135), WeatherCondition::Fog);
    }

    #[test]
    fn test_provider_code_rain() {
        assert_eq!(WeatherCondition::from_provider_code(1063), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_provider_code(1189), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_provider_code(1195), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_provider_code(1246), WeatherCondition::HeavyRain);
    }

    #[test]
    fn test_provider_code_frozen() {
        assert_eq!(WeatherCondition::from_provider_code(1171), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_provider_code(1204), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_provider_code(1213), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_provider_code(1258), WeatherCondition::Snow);
    }

    #[test]
    fn test_provider_code_thunderstorm() {
        assert_eq!(WeatherCondition::from_provider_code(1087), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_provider_code(1276), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_unknown_code_defaults_to_clear() {
        assert_eq!(WeatherCondition::from_provider_code(9999), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_provider_code(-1), WeatherCondition::Clear);
    }

    #[test]
    fn test_night_icon() {
        assert_eq!(WeatherCondition::Clear.icon(false), "🌙");
        assert_eq!(WeatherCondition::Clear.icon(true), "☀️");
        assert_eq!(WeatherCondition::Rain.icon(false), "🌧️");
    }

    #[test]
    fn test_query_validation() {
        assert!(LocationQuery::Named("Pune".into()).validate().is_ok());
        assert!(LocationQuery::Named("  ".into()).validate().is_err());
        assert!(LocationQuery::Coordinates {
            latitude: 91.0,
            longitude: 0.0
        }
        .validate()
        .is_err());
        assert!(LocationQuery::Coordinates {
            latitude: 18.52,
            longitude: 73.85
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_query_param() {
        let q = LocationQuery::Coordinates {
            latitude: 28.6139,
            longitude: 77.209,
        };
        assert_eq!(q.as_param(), "28.6139,77.209");
        assert_eq!(LocationQuery::Named(" Nagpur ".into()).as_param(), "Nagpur");
    }

    #[test]
    fn test_candidate_display_name() {
        let c = LocationCandidate {
            name: "Nashik".into(),
            latitude: 19.99,
            longitude: 73.79,
            admin1: Some("Maharashtra".into()),
            country: Some("India".into()),
        };
        assert_eq!(c.display_name(), "Nashik, Maharashtra");
    }
}
