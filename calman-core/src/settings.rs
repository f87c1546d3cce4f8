//! User settings and bulk import/export.
//!
//! Each setting lives under its own key in the key/value store and is
//! written back on every mutation. Missing keys are seeded with their
//! defaults on first load. The import/export document bundles the
//! settings with the template collection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalmanError, CalmanResult};
use crate::store::KvStore;
use crate::template::{Template, TemplateStore};

pub const DEFAULT_BG_COLOR: &str = "#ebf1e4ff";
pub const DEFAULT_ROUNDING_VALUE: i64 = 5;
pub const DEFAULT_ROUND_SPLITS: bool = false;

const BG_COLOR_KEY: &str = "bgColor";
const ROUNDING_VALUE_KEY: &str = "roundingValue";
const ROUND_SPLITS_KEY: &str = "roundSplits";
const AVAILABLE_PHASES_KEY: &str = "availablePhases";

pub fn default_phases() -> Vec<String> {
    vec![
        "Arbeitszeit".to_string(),
        "Unizeit".to_string(),
        "Freizeit".to_string(),
    ]
}

/// Persistent user settings.
pub struct Settings<K: KvStore> {
    store: K,
    background_color: String,
    rounding_value: i64,
    round_splits: bool,
    available_phases: Vec<String>,
}

impl<K: KvStore> Settings<K> {
    /// Load settings, seeding any missing key with its default.
    pub fn load(mut store: K) -> CalmanResult<Self> {
        let background_color = match store.get(BG_COLOR_KEY)? {
            Some(Value::String(s)) => s,
            _ => {
                store.set(BG_COLOR_KEY, Value::String(DEFAULT_BG_COLOR.to_string()))?;
                DEFAULT_BG_COLOR.to_string()
            }
        };
        let rounding_value = match store.get(ROUNDING_VALUE_KEY)?.and_then(|v| v.as_i64()) {
            Some(v) => v,
            None => {
                store.set(ROUNDING_VALUE_KEY, Value::from(DEFAULT_ROUNDING_VALUE))?;
                DEFAULT_ROUNDING_VALUE
            }
        };
        let round_splits = match store.get(ROUND_SPLITS_KEY)?.and_then(|v| v.as_bool()) {
            Some(v) => v,
            None => {
                store.set(ROUND_SPLITS_KEY, Value::Bool(DEFAULT_ROUND_SPLITS))?;
                DEFAULT_ROUND_SPLITS
            }
        };
        let available_phases = match store.get(AVAILABLE_PHASES_KEY)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| CalmanError::Serialization(e.to_string()))?,
            None => {
                let defaults = default_phases();
                store.set(
                    AVAILABLE_PHASES_KEY,
                    serde_json::to_value(&defaults)
                        .map_err(|e| CalmanError::Serialization(e.to_string()))?,
                )?;
                defaults
            }
        };

        Ok(Settings {
            store,
            background_color,
            rounding_value,
            round_splits,
            available_phases,
        })
    }

    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    pub fn rounding_value(&self) -> i64 {
        self.rounding_value
    }

    pub fn round_splits(&self) -> bool {
        self.round_splits
    }

    pub fn available_phases(&self) -> &[String] {
        &self.available_phases
    }

    pub fn set_background_color(&mut self, color: impl Into<String>) -> CalmanResult<()> {
        self.background_color = color.into();
        self.store
            .set(BG_COLOR_KEY, Value::String(self.background_color.clone()))
    }

    pub fn set_rounding_value(&mut self, value: i64) -> CalmanResult<()> {
        self.rounding_value = value;
        self.store.set(ROUNDING_VALUE_KEY, Value::from(value))
    }

    pub fn set_round_splits(&mut self, on: bool) -> CalmanResult<()> {
        self.round_splits = on;
        self.store.set(ROUND_SPLITS_KEY, Value::Bool(on))
    }

    pub fn set_available_phases(&mut self, phases: Vec<String>) -> CalmanResult<()> {
        self.available_phases = phases;
        self.persist_phases()
    }

    pub fn add_phase(&mut self, phase: impl Into<String>) -> CalmanResult<()> {
        self.available_phases.push(phase.into());
        self.persist_phases()
    }

    pub fn remove_phase(&mut self, phase: &str) -> CalmanResult<()> {
        self.available_phases.retain(|p| p != phase);
        self.persist_phases()
    }

    fn persist_phases(&mut self) -> CalmanResult<()> {
        let value = serde_json::to_value(&self.available_phases)
            .map_err(|e| CalmanError::Serialization(e.to_string()))?;
        self.store.set(AVAILABLE_PHASES_KEY, value)
    }
}

/// Bulk import/export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub background_color: String,
    pub rounding_value: i64,
    pub round_splits: bool,
    pub available_phases: Vec<String>,
    pub templates: Vec<Template>,
}

/// Serialize current settings and templates verbatim.
pub fn export_data<K: KvStore>(settings: &Settings<K>, templates: &[Template]) -> DataExport {
    DataExport {
        background_color: settings.background_color.clone(),
        rounding_value: settings.rounding_value,
        round_splits: settings.round_splits,
        available_phases: settings.available_phases.clone(),
        templates: templates.to_vec(),
    }
}

/// Apply an imported document: settings fields overwrite the current
/// values; templates are appended unless an exact duplicate (same
/// title, start, end, all-day flag) already exists.
pub fn import_data<K: KvStore, T: KvStore>(
    data: DataExport,
    settings: &mut Settings<K>,
    templates: &mut TemplateStore<T>,
) -> CalmanResult<usize> {
    settings.set_background_color(data.background_color)?;
    settings.set_rounding_value(data.rounding_value)?;
    settings.set_round_splits(data.round_splits)?;
    settings.set_available_phases(data.available_phases)?;

    let mut imported = 0;
    for template in data.templates {
        let exists = templates
            .templates()
            .iter()
            .any(|t| t.is_duplicate_of(&template));
        if !exists {
            templates.add_template(template)?;
            imported += 1;
        }
    }
    Ok(imported)
}
