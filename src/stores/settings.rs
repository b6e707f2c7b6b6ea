//! Research settings: model choices and search breadth/depth knobs, persisted
//! as one JSON document under the `setting` key.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::persist::KeyValueStorage;

pub const SETTINGS_KEY: &str = "setting";

pub const DEFAULT_MODEL_LIST: [&str; 5] = [
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub core_model: String,
    pub task_model: String,
    pub thinking_budget: i64,
    pub depth: i64,
    pub wide: i64,
    pub parallel_search: i64,
    pub report_tone: String,
    pub min_words: i64,
    pub model_list: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            core_model: "gemini-2.5-pro".to_string(),
            task_model: "gemini-2.5-flash".to_string(),
            thinking_budget: 2048,
            depth: 3,
            wide: 7,
            parallel_search: 3,
            report_tone: "journalist-tone".to_string(),
            min_words: 6000,
            model_list: DEFAULT_MODEL_LIST.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Every numeric knob must be positive.
    pub fn is_valid(&self) -> bool {
        [
            self.thinking_budget,
            self.depth,
            self.wide,
            self.parallel_search,
            self.min_words,
        ]
        .iter()
        .all(|v| *v > 0)
    }
}

/// Fields to overwrite; `None` leaves the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub core_model: Option<String>,
    pub task_model: Option<String>,
    pub thinking_budget: Option<i64>,
    pub depth: Option<i64>,
    pub wide: Option<i64>,
    pub parallel_search: Option<i64>,
    pub report_tone: Option<String>,
    pub min_words: Option<i64>,
    pub model_list: Option<Vec<String>>,
}

impl SettingsPatch {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.core_model {
            settings.core_model = v;
        }
        if let Some(v) = self.task_model {
            settings.task_model = v;
        }
        if let Some(v) = self.thinking_budget {
            settings.thinking_budget = v;
        }
        if let Some(v) = self.depth {
            settings.depth = v;
        }
        if let Some(v) = self.wide {
            settings.wide = v;
        }
        if let Some(v) = self.parallel_search {
            settings.parallel_search = v;
        }
        if let Some(v) = self.report_tone {
            settings.report_tone = v;
        }
        if let Some(v) = self.min_words {
            settings.min_words = v;
        }
        if let Some(v) = self.model_list {
            settings.model_list = v;
        }
    }
}

pub struct SettingStore<S> {
    settings: Settings,
    storage: S,
}

impl<S: KeyValueStorage> SettingStore<S> {
    /// Restore persisted settings over the defaults. Keys missing from the
    /// stored document keep their defaults; an unreadable document is ignored.
    pub fn load(storage: S) -> Self {
        let settings = match storage.get_item(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored settings are unreadable, using defaults");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored settings, using defaults");
                Settings::default()
            }
        };
        Self { settings, storage }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update(&mut self, patch: SettingsPatch) -> Result<()> {
        patch.apply(&mut self.settings);
        self.persist()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();
        self.persist()
    }

    pub fn validate_settings(&self) -> bool {
        self.settings.is_valid()
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.settings)?;
        self.storage.set_item(SETTINGS_KEY, &raw)
    }
}
