//! Typed preferences on top of `PreferenceStore`.
//!
//! Each preference has an explicit `load_*` returning `Result` and a lenient
//! accessor that logs and falls back to the default.

use std::sync::Arc;

use kisan_core::StorageError;
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::storage::{PreferenceStore, LANGUAGE_KEY, LAST_LOCATION_KEY, MODEL_SETTINGS_KEY};
use crate::types::Place;

/// AI backend used by the companion features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Gemini,
    Groq,
}

/// Which model provider each assistant feature uses.
///
/// Stored documents may omit fields; missing ones take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    pub disease_detection: ModelProvider,
    pub chatbot: ModelProvider,
}

#[derive(Debug, Clone)]
pub struct Preferences {
    store: Arc<PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn load_language(&self) -> Result<Language, StorageError> {
        Ok(self.store.load(LANGUAGE_KEY)?.unwrap_or_default())
    }

    pub fn language(&self) -> Language {
        lenient(LANGUAGE_KEY, self.load_language())
    }

    pub fn save_language(&self, language: Language) -> Result<(), StorageError> {
        self.store.save(LANGUAGE_KEY, &language)
    }

    pub fn load_model_config(&self) -> Result<ModelConfig, StorageError> {
        Ok(self.store.load(MODEL_SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn model_config(&self) -> ModelConfig {
        lenient(MODEL_SETTINGS_KEY, self.load_model_config())
    }

    pub fn save_model_config(&self, config: &ModelConfig) -> Result<(), StorageError> {
        self.store.save(MODEL_SETTINGS_KEY, config)
    }

    /// The location the dashboard showed last, if any was recorded.
    pub fn last_location(&self) -> Option<Place> {
        match self.store.load(LAST_LOCATION_KEY) {
            Ok(place) => place,
            Err(e) => {
                tracing::warn!("Ignoring stored last location: {}", e);
                None
            }
        }
    }

    pub fn set_last_location(&self, place: &Place) -> Result<(), StorageError> {
        self.store.save(LAST_LOCATION_KEY, place)
    }
}

fn lenient<T: Default>(key: &str, result: Result<T, StorageError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("Falling back to default for '{}': {}", key, e);
        T::default()
    })
}
