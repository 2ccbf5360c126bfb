//! Routing profiles.

use serde::{Deserialize, Serialize};

/// Travel mode for route requests, named after the OSRM profile it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Foot,
    Car,
}

impl TravelMode {
    /// Interpret a client-supplied mode. Only `car` selects driving; anything
    /// else, including an absent value, falls back to walking.
    #[must_use]
    pub fn from_query(mode: Option<&str>) -> Self {
        match mode {
            Some("car") => Self::Car,
            _ => Self::Foot,
        }
    }

    /// OSRM profile path segment.
    #[must_use]
    pub const fn profile(self) -> &'static str {
        match self {
            Self::Foot => "foot",
            Self::Car => "car",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query() {
        assert_eq!(TravelMode::from_query(Some("car")), TravelMode::Car);
        assert_eq!(TravelMode::from_query(Some("foot")), TravelMode::Foot);
        assert_eq!(TravelMode::from_query(Some("bicycle")), TravelMode::Foot);
        assert_eq!(TravelMode::from_query(None), TravelMode::Foot);
    }
}
