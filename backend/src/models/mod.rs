//! Domain models shared by the analysis engine, services and HTTP layer.
//!
//! - [`time`]: time domains, epoch-unit handling and `[0,100]` normalization
//! - [`crime`]: the read-only event record consumed by the core
//! - [`suggestion`]: warp profile / interval boundary suggestions and their lifecycle
//! - [`slice`]: timeline slices and boundary-adjustment types

#[macro_use]
pub mod macros;

pub mod crime;
pub mod slice;
pub mod suggestion;
pub mod time;


pub use crime::{timestamps_of, CrimeRecord};
pub use slice::{
    AdjustmentHandle, AdjustmentResult, LimitCue, SliceBoundary, SliceId, SnapCandidate,
    SnapConfig, SnapMode, SnapSource,
};
pub use suggestion::{
    BoundaryMetadata, BoundaryMethod, IntervalBoundarySuggestion, Sensitivity, SnapUnit,
    Suggestion, SuggestionData, SuggestionId, SuggestionKind, SuggestionStatus, WarpEmphasis,
    WarpInterval, WarpProfile,
};
pub use time::{
    detect_epoch_unit, format_boundary_label, normalized_to_sec, sec_to_normalized,
    to_epoch_seconds, EpochUnit, TimeDomain,
};
