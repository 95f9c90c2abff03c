//! Mapping from the provider's `forecast.json` document to `ForecastSnapshot`.
//!
//! Every field listed in the raw structs below is required. A document that
//! lacks any of them is rejected as a whole; no partial snapshot is built.

use chrono::{DateTime, NaiveDate, NaiveTime};
use kisan_core::FetchError;
use serde::Deserialize;

use crate::types::{CurrentConditions, DailyForecast, ForecastSnapshot, WeatherCondition};

#[derive(Debug, Deserialize)]
struct RawForecastDocument {
    location: RawLocation,
    current: RawCurrent,
    forecast: RawForecast,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: String,
    #[serde(default)]
    region: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    text: String,
    code: i32,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    last_updated_epoch: i64,
    temp_c: f64,
    feelslike_c: f64,
    humidity: f64,
    wind_kph: f64,
    uv: f64,
    vis_km: f64,
    is_day: u8,
    condition: RawCondition,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    forecastday: Vec<RawForecastDay>,
}

#[derive(Debug, Deserialize)]
struct RawForecastDay {
    date: String,
    day: RawDay,
    astro: RawAstro,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    daily_chance_of_rain: f64,
    condition: RawCondition,
}

#[derive(Debug, Deserialize)]
struct RawAstro {
    sunrise: String,
    sunset: String,
}

/// Normalize a provider document, keeping at most `days` daily entries.
pub fn normalize_forecast(
    document: serde_json::Value,
    days: u8,
) -> Result<ForecastSnapshot, FetchError> {
    let raw: RawForecastDocument = serde_json::from_value(document)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    let captured_at = DateTime::from_timestamp(raw.current.last_updated_epoch, 0)
        .ok_or_else(|| {
            FetchError::MalformedResponse(format!(
                "invalid last_updated_epoch {}",
                raw.current.last_updated_epoch
            ))
        })?;

    let daily_forecast = raw
        .forecast
        .forecastday
        .into_iter()
        .take(usize::from(days))
        .map(normalize_day)
        .collect::<Result<Vec<_>, _>>()?;

    if daily_forecast.is_empty() {
        return Err(FetchError::MalformedResponse(
            "forecast contains no days".to_string(),
        ));
    }

    let location_name = match raw.location.region.as_deref() {
        Some(region) if !region.is_empty() && region != raw.location.name => {
            format!("{}, {}", raw.location.name, region)
        }
        _ => raw.location.name,
    };

    Ok(ForecastSnapshot {
        location_name,
        latitude: raw.location.lat,
        longitude: raw.location.lon,
        captured_at,
        current: CurrentConditions {
            temperature_c: raw.current.temp_c,
            feels_like_c: raw.current.feelslike_c,
            humidity_pct: percent(raw.current.humidity),
            wind_kph: raw.current.wind_kph,
            uv_index: raw.current.uv,
            visibility_km: raw.current.vis_km,
            condition: WeatherCondition::from_provider_code(raw.current.condition.code),
            condition_text: raw.current.condition.text,
            is_day: raw.current.is_day == 1,
        },
        daily_forecast,
    })
}

fn normalize_day(raw: RawForecastDay) -> Result<DailyForecast, FetchError> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .map_err(|e| FetchError::MalformedResponse(format!("date '{}': {}", raw.date, e)))?;

    Ok(DailyForecast {
        date,
        min_temp_c: raw.day.mintemp_c,
        max_temp_c: raw.day.maxtemp_c,
        precipitation_chance_pct: percent(raw.day.daily_chance_of_rain),
        sunrise: clock_time(&raw.astro.sunrise)?,
        sunset: clock_time(&raw.astro.sunset)?,
        condition: WeatherCondition::from_provider_code(raw.day.condition.code),
        condition_text: raw.day.condition.text,
    })
}

/// Provider astro times look like "06:45 AM".
fn clock_time(value: &str) -> Result<NaiveTime, FetchError> {
    NaiveTime::parse_from_str(value.trim(), "%I:%M %p")
        .map_err(|e| FetchError::MalformedResponse(format!("time '{}': {}", value, e)))
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
