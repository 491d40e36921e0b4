//! Suggestion data model.
//!
//! A generation pass produces a batch of [`Suggestion`]s, each wrapping either a
//! [`WarpProfile`] or an [`IntervalBoundarySuggestion`]. On the wire a
//! suggestion looks like:
//!
//! ```json
//! {
//!   "id": "6f1c...",
//!   "type": "warp-profile",
//!   "data": { "name": "Uniform Balance", "intervals": [...], ... },
//!   "confidence": 72,
//!   "status": "pending",
//!   "createdAt": "2024-01-01T00:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

crate::define_id_type!(Uuid, SuggestionId);

impl SuggestionId {
    pub fn random() -> Self {
        SuggestionId(Uuid::new_v4())
    }
}

/// Emphasis of a warp profile variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarpEmphasis {
    Aggressive,
    Balanced,
    Conservative,
}

impl WarpEmphasis {
    pub const ALL: [WarpEmphasis; 3] = [
        WarpEmphasis::Aggressive,
        WarpEmphasis::Balanced,
        WarpEmphasis::Conservative,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WarpEmphasis::Aggressive => "High Density Focus",
            WarpEmphasis::Balanced => "Uniform Balance",
            WarpEmphasis::Conservative => "Gentle Compression",
        }
    }

    /// `(min, max)` warp strength for the variant.
    pub fn strength_range(&self) -> (f64, f64) {
        match self {
            WarpEmphasis::Aggressive => (0.5, 2.0),
            WarpEmphasis::Balanced => (0.7, 1.5),
            WarpEmphasis::Conservative => (0.8, 1.3),
        }
    }

    /// Number of intervals the variant uses for a given target count.
    pub fn interval_count(&self, target: usize) -> usize {
        match self {
            WarpEmphasis::Aggressive => (target + 2).min(12),
            WarpEmphasis::Balanced => target,
            WarpEmphasis::Conservative => target.saturating_sub(2).max(3),
        }
    }

    pub fn confidence_multiplier(&self) -> f64 {
        match self {
            WarpEmphasis::Aggressive => 0.9,
            WarpEmphasis::Balanced => 1.0,
            WarpEmphasis::Conservative => 1.1,
        }
    }
}

/// One warped section of the timeline, expressed in percent of the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpInterval {
    pub start_percent: f64,
    pub end_percent: f64,
    /// Warp factor; sparse sections get stronger warp.
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpProfile {
    pub name: String,
    pub intervals: Vec<WarpInterval>,
    pub confidence: u8,
    pub emphasis: WarpEmphasis,
}

/// How interval boundaries are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryMethod {
    #[default]
    Peak,
    ChangePoint,
    RuleBased,
}

impl fmt::Display for BoundaryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoundaryMethod::Peak => "peak",
            BoundaryMethod::ChangePoint => "change-point",
            BoundaryMethod::RuleBased => "rule-based",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BoundaryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "peak" => Ok(BoundaryMethod::Peak),
            "change-point" | "changepoint" => Ok(BoundaryMethod::ChangePoint),
            "rule-based" | "rulebased" => Ok(BoundaryMethod::RuleBased),
            other => Err(format!("Unknown boundary method: {}", other)),
        }
    }
}

/// Detection sensitivity for peak and change-point methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

/// Calendar unit boundaries can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapUnit {
    #[default]
    None,
    Hour,
    Day,
}

/// Per-method epochs recorded while detecting boundaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_points: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_based_boundaries: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBoundarySuggestion {
    /// Ascending epoch seconds.
    pub boundaries: Vec<f64>,
    pub method: BoundaryMethod,
    pub confidence: u8,
    #[serde(default)]
    pub metadata: BoundaryMetadata,
}

impl IntervalBoundarySuggestion {
    pub fn empty(method: BoundaryMethod) -> Self {
        Self {
            boundaries: Vec::new(),
            method,
            confidence: 0,
            metadata: BoundaryMetadata::default(),
        }
    }
}

/// Discriminant of [`SuggestionData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    WarpProfile,
    IntervalBoundary,
}

/// Payload of a suggestion, tagged by `type` with the body under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum SuggestionData {
    WarpProfile(WarpProfile),
    IntervalBoundary(IntervalBoundarySuggestion),
}

impl SuggestionData {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            SuggestionData::WarpProfile(_) => SuggestionKind::WarpProfile,
            SuggestionData::IntervalBoundary(_) => SuggestionKind::IntervalBoundary,
        }
    }

    pub fn confidence(&self) -> u8 {
        match self {
            SuggestionData::WarpProfile(p) => p.confidence,
            SuggestionData::IntervalBoundary(b) => b.confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: SuggestionId,
    #[serde(flatten)]
    pub data: SuggestionData,
    pub confidence: u8,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
}

impl Suggestion {
    /// Create a pending suggestion; confidence is taken from the payload.
    pub fn new(data: SuggestionData) -> Self {
        Self {
            id: SuggestionId::random(),
            confidence: data.confidence(),
            data,
            status: SuggestionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> SuggestionKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_interval_counts() {
        assert_eq!(WarpEmphasis::Aggressive.interval_count(5), 7);
        assert_eq!(WarpEmphasis::Aggressive.interval_count(11), 12);
        assert_eq!(WarpEmphasis::Balanced.interval_count(5), 5);
        assert_eq!(WarpEmphasis::Conservative.interval_count(5), 3);
        assert_eq!(WarpEmphasis::Conservative.interval_count(3), 3);
    }

    #[test]
    fn test_boundary_method_parsing() {
        assert_eq!("peak".parse::<BoundaryMethod>().unwrap(), BoundaryMethod::Peak);
        assert_eq!(
            "change-point".parse::<BoundaryMethod>().unwrap(),
            BoundaryMethod::ChangePoint
        );
        assert_eq!(BoundaryMethod::RuleBased.to_string(), "rule-based");
        assert!("bogus".parse::<BoundaryMethod>().is_err());
    }

    #[test]
    fn test_suggestion_wire_shape() {
        let suggestion = Suggestion::new(SuggestionData::IntervalBoundary(
            IntervalBoundarySuggestion {
                boundaries: vec![10.0, 20.0],
                method: BoundaryMethod::ChangePoint,
                confidence: 64,
                metadata: BoundaryMetadata::default(),
            },
        ));

        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["type"], "interval-boundary");
        assert_eq!(json["confidence"], 64);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["data"]["method"], "change-point");
        assert_eq!(json["data"]["boundaries"][1], 20.0);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_suggestion_data_deserializes_from_tagged_json() {
        let json = r#"{
            "type": "warp-profile",
            "data": {
                "name": "Custom",
                "intervals": [{"startPercent": 0, "endPercent": 100, "strength": 1.2}],
                "confidence": 50,
                "emphasis": "balanced"
            }
        }"#;
        let data: SuggestionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.kind(), SuggestionKind::WarpProfile);
        assert_eq!(data.confidence(), 50);
    }
}
