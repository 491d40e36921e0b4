//! In-memory suggestion store.
//!
//! Holds the suggestions of the latest generation run in generation order
//! and tracks the user's review decisions on them.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::{Suggestion, SuggestionData, SuggestionId, SuggestionKind, SuggestionStatus};

/// Errors from review operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestionError {
    #[error("Suggestion not found: {0}")]
    NotFound(SuggestionId),

    #[error("Cannot replace a {expected:?} suggestion with {found:?} data")]
    KindMismatch {
        expected: SuggestionKind,
        found: SuggestionKind,
    },
}

/// Thread-safe, cloneable suggestion store.
#[derive(Clone)]
pub struct SuggestionStore {
    suggestions: Arc<RwLock<Vec<Suggestion>>>,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self {
            suggestions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replace every stored suggestion with `suggestions`.
    pub fn replace_all(&self, suggestions: Vec<Suggestion>) {
        let mut stored = self.suggestions.write();
        log::debug!("replacing {} suggestions with {}", stored.len(), suggestions.len());
        *stored = suggestions;
    }

    /// All suggestions in generation order.
    pub fn list(&self) -> Vec<Suggestion> {
        self.suggestions.read().clone()
    }

    pub fn get(&self, id: &SuggestionId) -> Option<Suggestion> {
        self.suggestions.read().iter().find(|s| &s.id == id).cloned()
    }

    pub fn accept(&self, id: &SuggestionId) -> Result<Suggestion, SuggestionError> {
        self.update(id, |s| s.status = SuggestionStatus::Accepted)
    }

    pub fn reject(&self, id: &SuggestionId) -> Result<Suggestion, SuggestionError> {
        self.update(id, |s| s.status = SuggestionStatus::Rejected)
    }

    /// Replace the payload of a suggestion and mark it modified.
    ///
    /// The payload must be of the same kind as the stored one.
    pub fn modify(&self, id: &SuggestionId, data: SuggestionData) -> Result<Suggestion, SuggestionError> {
        let mut stored = self.suggestions.write();
        let suggestion = stored
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| SuggestionError::NotFound(id.clone()))?;

        if suggestion.kind() != data.kind() {
            return Err(SuggestionError::KindMismatch {
                expected: suggestion.kind(),
                found: data.kind(),
            });
        }

        suggestion.confidence = data.confidence();
        suggestion.data = data;
        suggestion.status = SuggestionStatus::Modified;
        Ok(suggestion.clone())
    }

    pub fn clear(&self) {
        self.suggestions.write().clear();
    }

    pub fn pending_count(&self) -> usize {
        self.suggestions
            .read()
            .iter()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .count()
    }

    pub fn len(&self) -> usize {
        self.suggestions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(
        &self,
        id: &SuggestionId,
        apply: impl FnOnce(&mut Suggestion),
    ) -> Result<Suggestion, SuggestionError> {
        let mut stored = self.suggestions.write();
        let suggestion = stored
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| SuggestionError::NotFound(id.clone()))?;
        apply(suggestion);
        Ok(suggestion.clone())
    }
}

impl Default for SuggestionStore {
    fn default() -> Self {
        Self::new()
    }
}
