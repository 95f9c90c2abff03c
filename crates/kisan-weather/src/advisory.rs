//! Advisory rule engine.
//!
//! Maps a forecast snapshot onto farming advisories using the configured
//! thresholds. Everything here is a pure function of its inputs.

use std::collections::BTreeSet;

use kisan_core::{AdvisoryThresholds, IrrigationRule};
use serde::{Deserialize, Serialize};

use crate::language::{Label, Language};
use crate::types::ForecastSnapshot;

/// A farming recommendation derived from the forecast.
///
/// `None` is what presentation shows for an empty set; the engine itself
/// never inserts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryFlag {
    IrrigationRecommended,
    PestRiskHigh,
    SprayCautionWindy,
    HeatStressWarning,
    None,
}

impl AdvisoryFlag {
    pub fn label(&self, language: Language) -> &'static str {
        match self {
            AdvisoryFlag::IrrigationRecommended => language.label(Label::WaterToday),
            AdvisoryFlag::PestRiskHigh => language.label(Label::PestRisk),
            AdvisoryFlag::SprayCautionWindy => language.label(Label::SprayCaution),
            AdvisoryFlag::HeatStressWarning => language.label(Label::HeatStress),
            AdvisoryFlag::None => language.label(Label::NoPestRisk),
        }
    }
}

/// Flags to display for a derived set, with `None` standing in for empty.
pub fn display_flags(advisories: &BTreeSet<AdvisoryFlag>) -> Vec<AdvisoryFlag> {
    if advisories.is_empty() {
        vec![AdvisoryFlag::None]
    } else {
        advisories.iter().copied().collect()
    }
}

/// Derive the advisory set for a snapshot.
///
/// Irrigation and heat look at the next forecast day; a snapshot without
/// daily entries simply cannot raise them.
pub fn derive_advisories(
    snapshot: &ForecastSnapshot,
    thresholds: &AdvisoryThresholds,
) -> BTreeSet<AdvisoryFlag> {
    let current = &snapshot.current;
    let next_day = snapshot.next_day();
    let mut flags = BTreeSet::new();

    let dry_forecast = next_day
        .is_some_and(|day| day.precipitation_chance_pct < thresholds.irrigation_max_rain_chance);
    let dry_air = current.humidity_pct < thresholds.irrigation_max_humidity;
    let irrigate = match thresholds.irrigation_rule {
        IrrigationRule::Any => dry_forecast || dry_air,
        IrrigationRule::All => dry_forecast && dry_air,
    };
    if irrigate {
        flags.insert(AdvisoryFlag::IrrigationRecommended);
    }

    let pest_band = thresholds.pest_min_temp_c..=thresholds.pest_max_temp_c;
    if current.humidity_pct > thresholds.pest_min_humidity
        && pest_band.contains(&current.temperature_c)
    {
        flags.insert(AdvisoryFlag::PestRiskHigh);
    }

    if current.wind_kph > thresholds.spray_max_wind_kph {
        flags.insert(AdvisoryFlag::SprayCautionWindy);
    }

    if next_day.is_some_and(|day| day.max_temp_c > thresholds.heat_max_temp_c) {
        flags.insert(AdvisoryFlag::HeatStressWarning);
    }

    flags
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumidityLevel {
    Low,
    Moderate,
    Good,
    High,
}

impl HumidityLevel {
    /// Below 30 is low and above 80 high; 50-70 is the comfortable band for
    /// most crops, anything else in between is moderate.
    pub fn classify(humidity_pct: u8) -> Self {
        match humidity_pct {
            0..=29 => HumidityLevel::Low,
            50..=70 => HumidityLevel::Good,
            81..=u8::MAX => HumidityLevel::High,
            _ => HumidityLevel::Moderate,
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match self {
            HumidityLevel::Low => language.label(Label::LowHumidity),
            HumidityLevel::Moderate => language.label(Label::ModerateHumidity),
            HumidityLevel::Good => language.label(Label::GoodHumidity),
            HumidityLevel::High => language.label(Label::HighHumidity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl UvLevel {
    pub fn classify(uv_index: f64) -> Self {
        if uv_index <= 2.0 {
            UvLevel::Low
        } else if uv_index <= 5.0 {
            UvLevel::Moderate
        } else if uv_index <= 7.0 {
            UvLevel::High
        } else {
            UvLevel::VeryHigh
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match self {
            UvLevel::Low => language.label(Label::LowUv),
            UvLevel::Moderate => language.label(Label::ModerateUv),
            UvLevel::High => language.label(Label::HighUv),
            UvLevel::VeryHigh => language.label(Label::VeryHighUv),
        }
    }
}
