//! Service layer for orchestration and stateful workflows.
//!
//! Services sit between the pure algorithms and the HTTP layer. They own the
//! state the algorithms deliberately do not: the current suggestion set, the
//! live drag session, in-flight density passes and cached global maps.

pub mod adaptive_maps;
pub mod debounce;
pub mod density_worker;
pub mod drag;
pub mod suggestion_store;
pub mod suggestions;

pub use adaptive_maps::{AdaptiveMapService, GlobalAdaptiveMaps};
pub use debounce::SuggestionTrigger;
pub use density_worker::{DensityClient, DensityResponse, DensityWorker, DensityWorkerError};
pub use drag::{DragController, DragOutcome, DragTooltip, DragUpdate, PointerEvent, SnapState};
pub use suggestion_store::{SuggestionError, SuggestionStore};
pub use suggestions::{generate_suggestions, generate_suggestions_in, GenerationParams, SuggestionGenerator};
