//! Dashboard languages and the handful of translated labels the advisory
//! panel needs. Labels missing for a language fall back to English.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Ta,
    Te,
    Bn,
    Mr,
}

/// Translatable label keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    WaterToday,
    PestRisk,
    NoPestRisk,
    SprayCaution,
    HeatStress,
    LowHumidity,
    ModerateHumidity,
    GoodHumidity,
    HighHumidity,
    LowUv,
    ModerateUv,
    HighUv,
    VeryHighUv,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Hi,
        Language::Ta,
        Language::Te,
        Language::Bn,
        Language::Mr,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Ta => "ta",
            Language::Te => "te",
            Language::Bn => "bn",
            Language::Mr => "mr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Name of the language in its own script
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिंदी",
            Language::Ta => "தமிழ்",
            Language::Te => "తెలుగు",
            Language::Bn => "বাংলা",
            Language::Mr => "मराठी",
        }
    }

    pub fn label(&self, label: Label) -> &'static str {
        self.translated(label)
            .unwrap_or_else(|| english(label))
    }

    fn translated(&self, label: Label) -> Option<&'static str> {
        use Label::*;
        let text = match (self, label) {
            (Language::En, l) => english(l),

            (Language::Hi, WaterToday) => "आज फसलों को पानी दें",
            (Language::Hi, PestRisk) => "कीट का खतरा",
            (Language::Hi, NoPestRisk) => "कीट का खतरा कम",
            (Language::Hi, SprayCaution) => "तेज़ हवा - छिड़काव न करें",
            (Language::Hi, HeatStress) => "लू का खतरा",
            (Language::Hi, LowHumidity) => "कम - सिंचाई करें",
            (Language::Hi, ModerateHumidity) => "सामान्य",
            (Language::Hi, GoodHumidity) => "फसलों के लिए अच्छा",
            (Language::Hi, HighHumidity) => "अधिक - रोग का खतरा",
            (Language::Hi, LowUv) => "कम यूवी",
            (Language::Hi, ModerateUv) => "मध्यम यूवी",
            (Language::Hi, HighUv) => "उच्च यूवी",
            (Language::Hi, VeryHighUv) => "बहुत उच्च यूवी",

            (Language::Ta, WaterToday) => "நீர் ஊற்றுங்கள்",
            (Language::Ta, PestRisk) => "பூச்சி ஆபத்து",
            (Language::Ta, NoPestRisk) => "குறைவு",
            (Language::Ta, LowHumidity) => "குறைவு",
            (Language::Ta, ModerateHumidity) => "மிதமான",
            (Language::Ta, GoodHumidity) => "நல்லது",
            (Language::Ta, HighHumidity) => "அதிகம்",
            (Language::Ta, LowUv) => "குறைந்த யூவி",
            (Language::Ta, ModerateUv) => "மிதமான யூவி",
            (Language::Ta, HighUv) => "உயர் யூவி",
            (Language::Ta, VeryHighUv) => "மிக உயர் யூவி",

            (Language::Te, WaterToday) => "నీరు పెట్టండి",
            (Language::Te, PestRisk) => "తెగుళ్ళ ప్రమాదం",
            (Language::Te, NoPestRisk) => "తక్కువ ప్రమాదం",
            (Language::Te, LowHumidity) => "తక్కువ",
            (Language::Te, ModerateHumidity) => "మధ్యస్థం",
            (Language::Te, GoodHumidity) => "మంచిది",
            (Language::Te, HighHumidity) => "ఎక్కువ",
            (Language::Te, LowUv) => "తక్కువ యువి",
            (Language::Te, ModerateUv) => "మధ్యస్థ యువి",
            (Language::Te, HighUv) => "అధిక యువి",
            (Language::Te, VeryHighUv) => "చాలా అధిక",

            (Language::Bn, WaterToday) => "জল দিন",
            (Language::Bn, PestRisk) => "কীট ঝুঁকি",
            (Language::Bn, NoPestRisk) => "কম ঝুঁকি",
            (Language::Bn, LowHumidity) => "কম",
            (Language::Bn, ModerateHumidity) => "মাঝারি",
            (Language::Bn, GoodHumidity) => "ভালো",
            (Language::Bn, HighHumidity) => "বেশি",
            (Language::Bn, LowUv) => "কম ইউভি",
            (Language::Bn, ModerateUv) => "মাঝারি ইউভি",
            (Language::Bn, HighUv) => "উচ্চ ইউভি",
            (Language::Bn, VeryHighUv) => "অত্যন্ত উচ্চ",

            (Language::Mr, WaterToday) => "पाणी द्या",
            (Language::Mr, PestRisk) => "कीड धोका",
            (Language::Mr, NoPestRisk) => "कमी धोका",
            (Language::Mr, LowHumidity) => "कमी",
            (Language::Mr, ModerateHumidity) => "मध्यम",
            (Language::Mr, GoodHumidity) => "चांगले",
            (Language::Mr, HighHumidity) => "जास्त",
            (Language::Mr, LowUv) => "कमी यूवी",
            (Language::Mr, ModerateUv) => "मध्यम यूवी",
            (Language::Mr, HighUv) => "उच्च यूवी",
            (Language::Mr, VeryHighUv) => "अत्यंत उच्च",

            _ => return None,
        };
        Some(text)
    }
}

fn english(label: Label) -> &'static str {
    match label {
        Label::WaterToday => "Water your crops today",
        Label::PestRisk => "High pest risk",
        Label::NoPestRisk => "Low pest risk",
        Label::SprayCaution => "Windy - postpone spraying",
        Label::HeatStress => "Heat stress warning",
        Label::LowHumidity => "Low - irrigate",
        Label::ModerateHumidity => "Moderate",
        Label::GoodHumidity => "Good for crops",
        Label::HighHumidity => "High - disease risk",
        Label::LowUv => "Low UV",
        Label::ModerateUv => "Moderate UV",
        Label::HighUv => "High UV",
        Label::VeryHighUv => "Very High UV",
    }
}
