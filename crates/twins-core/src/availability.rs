//! Remote service availability.

use serde::{Deserialize, Serialize};

/// Tri-state health of the generation service.
///
/// Starts as `Unknown` until the first probe resolves. Only the
/// availability monitor writes it; everything else reads a snapshot.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySignal {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

impl AvailabilitySignal {
    pub fn from_health(healthy: bool) -> Self {
        if healthy {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn is_unavailable(self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl std::fmt::Display for AvailabilitySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(AvailabilitySignal::default(), AvailabilitySignal::Unknown);
        assert!(!AvailabilitySignal::Unknown.is_unavailable());
    }

    #[test]
    fn test_from_health() {
        assert_eq!(AvailabilitySignal::from_health(true), AvailabilitySignal::Available);
        assert!(AvailabilitySignal::from_health(false).is_unavailable());
    }
}
