use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position sample in decimal degrees.
///
/// Samples are replaced wholesale; nothing accumulates across them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and within lat ∈ [-90, 90], lng ∈ [-180, 180].
    ///
    /// NaN fails both range checks, so it is rejected here as well.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// The latest known position together with the instant it arrived.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub position: Position,
    pub received_at: DateTime<Utc>,
}

impl PositionFix {
    pub fn now(position: Position) -> Self {
        Self {
            position,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_validation() {
        assert!(Position::new(22.5671, 88.3712).is_valid());
        assert!(Position::new(-90.0, 180.0).is_valid());
        assert!(!Position::new(90.5, 0.0).is_valid());
        assert!(!Position::new(0.0, -180.1).is_valid());
        assert!(!Position::new(f64::NAN, 0.0).is_valid());
        assert!(!Position::new(0.0, f64::INFINITY).is_valid());
    }
}
