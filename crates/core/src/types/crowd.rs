//! Crowd level buckets.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// How busy a shop is, as reported by votes or derived from their mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
}

/// A vote level outside `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("level must be between 1 and 3 (got {0})")]
pub struct InvalidCrowdLevel(pub i64);

impl CrowdLevel {
    /// Numeric level (1-3) as voted by clients and stored in the database.
    #[must_use]
    pub const fn level(self) -> i16 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Traffic-light icon shown on the map marker.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🔴",
        }
    }

    /// Bucket an average vote level: `<= 1.5` is low, `<= 2.5` medium, else high.
    #[must_use]
    pub const fn from_mean(mean: f64) -> Self {
        if mean <= 1.5 {
            Self::Low
        } else if mean <= 2.5 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl TryFrom<i64> for CrowdLevel {
    type Error = InvalidCrowdLevel;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(InvalidCrowdLevel(other)),
        }
    }
}

impl TryFrom<i16> for CrowdLevel {
    type Error = InvalidCrowdLevel;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

/// Serializes as `{ "level": 1, "icon": "🟢", "label": "Low" }`.
impl Serialize for CrowdLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CrowdLevel", 3)?;
        state.serialize_field("level", &self.level())?;
        state.serialize_field("icon", self.icon())?;
        state.serialize_field("label", self.label())?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mean_boundaries() {
        assert_eq!(CrowdLevel::from_mean(1.0), CrowdLevel::Low);
        assert_eq!(CrowdLevel::from_mean(1.5), CrowdLevel::Low);
        assert_eq!(CrowdLevel::from_mean(1.51), CrowdLevel::Medium);
        assert_eq!(CrowdLevel::from_mean(2.5), CrowdLevel::Medium);
        assert_eq!(CrowdLevel::from_mean(2.51), CrowdLevel::High);
        assert_eq!(CrowdLevel::from_mean(3.0), CrowdLevel::High);
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(CrowdLevel::try_from(0_i64), Err(InvalidCrowdLevel(0)));
        assert_eq!(CrowdLevel::try_from(4_i64), Err(InvalidCrowdLevel(4)));
        assert_eq!(CrowdLevel::try_from(-1_i64), Err(InvalidCrowdLevel(-1)));
        assert_eq!(CrowdLevel::try_from(2_i64), Ok(CrowdLevel::Medium));
    }

    #[test]
    fn test_serializes_as_object() {
        let value = serde_json::to_value(CrowdLevel::High).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "level": 3, "icon": "🔴", "label": "High" })
        );
    }
}
