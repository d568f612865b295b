use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::db::{keys, load_json, save_json, BlobStore};
use crate::models::Difficulty;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum VibrationIntensity {
    Light,
    #[default]
    Medium,
    Strong,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub vibration_enabled: bool,
    pub vibration_intensity: VibrationIntensity,
    pub sound_enabled: bool,
    pub show_countdown: bool,
    pub auto_next_round: bool,
    pub selected_difficulty: Difficulty,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            vibration_enabled: true,
            vibration_intensity: VibrationIntensity::Medium,
            sound_enabled: true,
            show_countdown: true,
            auto_next_round: true,
            selected_difficulty: Difficulty::Medium,
        }
    }
}

pub struct SettingsStore {
    store: Arc<dyn BlobStore>,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let data = load_json(store.as_ref(), keys::SETTINGS).unwrap_or_default();
        Self {
            store,
            data: RwLock::new(data),
        }
    }

    pub fn get(&self) -> AppSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: AppSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        save_json(self.store.as_ref(), keys::SETTINGS, data)
    }
}
