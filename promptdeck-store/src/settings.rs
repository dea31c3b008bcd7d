//! Per-provider settings.

use dashmap::DashMap;
use promptdeck_core::ports::SettingsStore;
use serde_json::Value;

/// Settings store keyed by provider id
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: DashMap<String, Value>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a provider's settings
    pub fn set(&self, provider_id: impl Into<String>, settings: Value) {
        self.settings.insert(provider_id.into(), settings);
    }

    /// Shallow-merge object keys into a provider's settings.
    ///
    /// Non-object values replace whatever was stored.
    pub fn merge(&self, provider_id: impl Into<String>, patch: Value) {
        let mut entry = self.settings.entry(provider_id.into()).or_insert(Value::Null);

        match (entry.value_mut(), patch) {
            (Value::Object(current), Value::Object(patch)) => current.extend(patch),
            (current, patch) => *current = patch,
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn global_settings(&self, provider_id: &str) -> Value {
        self.settings
            .get(provider_id)
            .map(|entry| entry.value().clone())
            .unwrap_or(Value::Null)
    }
}
