use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Values at or above this magnitude are treated as epoch milliseconds.
pub const EPOCH_MS_THRESHOLD: f64 = 1e11;

const NORMALIZED_MIN: f64 = 0.0;
const NORMALIZED_MAX: f64 = 100.0;

/// Closed time interval `[start, end]` in epoch seconds.
///
/// `end <= start` is tolerated everywhere and treated as a zero-span domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDomain {
    pub start: f64,
    pub end: f64,
}

impl TimeDomain {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Build a domain from two bounds in either order.
    pub fn ordered(a: f64, b: f64) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    /// Smallest domain covering every finite value, or `None` when there is none.
    pub fn covering(values: &[f64]) -> Option<Self> {
        let mut iter = values.iter().copied().filter(|v| v.is_finite());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self::new(min, max))
    }

    /// Width of the domain, never negative.
    pub fn span(&self) -> f64 {
        let span = self.end - self.start;
        if span.is_finite() && span > 0.0 {
            span
        } else {
            0.0
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() <= 0.0
    }

    pub fn contains(&self, sec: f64) -> bool {
        sec >= self.start && sec <= self.end
    }

    /// Clamp a value into the domain. Degenerate domains collapse onto `start`.
    pub fn clamp(&self, sec: f64) -> f64 {
        if self.is_degenerate() {
            return self.start;
        }
        sec.clamp(self.start, self.end)
    }
}

/// Unit of a raw epoch value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochUnit {
    Seconds,
    Milliseconds,
}

/// Guess the unit of an epoch value from its magnitude.
pub fn detect_epoch_unit(value: f64) -> EpochUnit {
    if value.abs() >= EPOCH_MS_THRESHOLD {
        EpochUnit::Milliseconds
    } else {
        EpochUnit::Seconds
    }
}

/// Convert an epoch value of unknown unit into seconds.
pub fn to_epoch_seconds(value: f64) -> f64 {
    match detect_epoch_unit(value) {
        EpochUnit::Milliseconds => value / 1000.0,
        EpochUnit::Seconds => value,
    }
}

/// Map `sec` into `[0, 100]` relative to the domain.
///
/// Bounds may be given in either order. A zero-span domain maps everything to 0.
pub fn sec_to_normalized(sec: f64, domain_start: f64, domain_end: f64) -> f64 {
    let domain = TimeDomain::ordered(domain_start, domain_end);
    let span = domain.span();
    if span == 0.0 {
        return NORMALIZED_MIN;
    }
    let ratio = (sec - domain.start) / span;
    (ratio * NORMALIZED_MAX).clamp(NORMALIZED_MIN, NORMALIZED_MAX)
}

/// Inverse of [`sec_to_normalized`]; the input is clamped to `[0, 100]` first.
pub fn normalized_to_sec(normalized: f64, domain_start: f64, domain_end: f64) -> f64 {
    let domain = TimeDomain::ordered(domain_start, domain_end);
    let span = domain.span();
    let normalized = normalized.clamp(NORMALIZED_MIN, NORMALIZED_MAX);
    if span == 0.0 {
        return domain.start;
    }
    domain.start + (normalized / NORMALIZED_MAX) * span
}

/// Convert fractional epoch seconds into a UTC datetime.
pub fn epoch_to_datetime(sec: f64) -> DateTime<Utc> {
    if !sec.is_finite() {
        return DateTime::UNIX_EPOCH;
    }
    let whole = sec.floor();
    let nanos = ((sec - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Short human label for a boundary, e.g. `Mar 4, 13:05`.
pub fn format_boundary_label(sec: f64) -> String {
    epoch_to_datetime(sec).format("%b %-d, %H:%M").to_string()
}
