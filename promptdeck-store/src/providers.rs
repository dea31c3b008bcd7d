//! Provider registry.

use dashmap::DashMap;
use promptdeck_core::ports::ProviderRegistry;
use promptdeck_core::provider::PromptProvider;
use std::sync::Arc;

/// Provider registry keyed by provider id
#[derive(Default)]
pub struct InMemoryProviderRegistry {
    providers: DashMap<String, Arc<dyn PromptProvider>>,
}

impl InMemoryProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider with the same id
    pub fn register<P: PromptProvider>(&self, provider_id: impl Into<String>, provider: P) {
        let provider_id = provider_id.into();
        tracing::debug!(provider_id = %provider_id, "registering provider");
        self.providers.insert(provider_id, Arc::new(provider));
    }

    /// Remove a provider; conversations bound to it become no-ops
    pub fn remove(&self, provider_id: &str) -> Option<Arc<dyn PromptProvider>> {
        self.providers.remove(provider_id).map(|(_, provider)| provider)
    }

    /// Ids of all registered providers
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl ProviderRegistry for InMemoryProviderRegistry {
    fn lookup(&self, provider_id: &str) -> Option<Arc<dyn PromptProvider>> {
        self.providers
            .get(provider_id)
            .map(|entry| Arc::clone(entry.value()))
    }
}

impl std::fmt::Debug for InMemoryProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProviderRegistry")
            .field("providers", &self.provider_ids())
            .finish()
    }
}
