//! Crime event records.
//!
//! Only `timestamp` is read by the analysis core. Any other attribute of the
//! upstream record (type, district, coordinates, ...) is carried through
//! untouched in `attributes`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single crime event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeRecord {
    /// Event time in epoch seconds.
    pub timestamp: f64,
    #[serde(flatten, default)]
    pub attributes: Map<String, Value>,
}

impl CrimeRecord {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl From<f64> for CrimeRecord {
    fn from(timestamp: f64) -> Self {
        CrimeRecord::new(timestamp)
    }
}

/// Extract the timestamp column of a record slice.
pub fn timestamps_of(records: &[CrimeRecord]) -> Vec<f64> {
    records.iter().map(|r| r.timestamp).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_extra_attributes() {
        let json = r#"{"timestamp": 1700000000, "type": "THEFT", "district": 7}"#;
        let record: CrimeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.timestamp, 1_700_000_000.0);
        assert_eq!(record.attributes["type"], "THEFT");
        assert_eq!(record.attributes["district"], 7);
    }

    #[test]
    fn test_timestamps_of() {
        let records = vec![CrimeRecord::new(3.0), CrimeRecord::new(1.0).with_attribute("k", "v")];
        assert_eq!(timestamps_of(&records), vec![3.0, 1.0]);
    }
}
