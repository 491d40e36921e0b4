//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::db::repository::AnalyticsRepository;
use crate::services::{AdaptiveMapService, SuggestionGenerator, SuggestionStore, SuggestionTrigger};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn AnalyticsRepository>,
    pub config: Arc<AnalysisConfig>,
    /// Generates suggestions into the shared store.
    pub generator: SuggestionGenerator,
    /// Cached dataset-wide maps.
    pub adaptive_maps: AdaptiveMapService,
    /// Debounced regeneration; absent until [`AppState::with_debounced_generation`].
    pub trigger: Option<Arc<SuggestionTrigger>>,
}

impl AppState {
    pub fn new(repository: Arc<dyn AnalyticsRepository>, config: AnalysisConfig) -> Self {
        let generator = SuggestionGenerator::new(config.suggestions.clone(), SuggestionStore::new());
        let adaptive_maps = AdaptiveMapService::new(repository.clone(), config.density.clone());
        Self {
            repository,
            config: Arc::new(config),
            generator,
            adaptive_maps,
            trigger: None,
        }
    }

    /// Start the debounced regeneration task. Requires a tokio runtime.
    pub fn with_debounced_generation(mut self) -> Self {
        let trigger = SuggestionTrigger::spawn(
            self.generator.clone(),
            self.repository.clone(),
            self.config.suggestions.debounce(),
        );
        self.trigger = Some(Arc::new(trigger));
        self
    }

    pub fn store(&self) -> &SuggestionStore {
        self.generator.store()
    }
}
