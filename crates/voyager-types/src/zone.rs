use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::ZoneId;
use crate::position::Position;

/// Category of a danger zone.
///
/// Informational only: breach evaluation treats every kind the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Transit hubs and their approaches
    TransitPerimeter,
    /// High crowd density sectors
    CrowdSector,
    /// Areas closed to travelers
    Restricted,
    #[default]
    Other,
}

/// A circular risk perimeter, loaded from static configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DangerZone {
    pub id: ZoneId,
    pub name: String,
    pub center: Position,
    pub radius_meters: f64,
    #[serde(default)]
    pub kind: ZoneKind,
}

/// Reasons a zone definition is rejected at load time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    #[error("zone {0}: radius must be finite and > 0, got {1}")]
    InvalidRadius(ZoneId, f64),

    #[error("zone {0}: center {1} is out of range")]
    InvalidCenter(ZoneId, Position),
}

impl DangerZone {
    pub fn new(
        id: impl Into<ZoneId>,
        name: impl Into<String>,
        center: Position,
        radius_meters: f64,
        kind: ZoneKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            center,
            radius_meters,
            kind,
        }
    }

    pub fn validate(&self) -> Result<(), ZoneError> {
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(ZoneError::InvalidRadius(self.id.clone(), self.radius_meters));
        }
        if !self.center.is_valid() {
            return Err(ZoneError::InvalidCenter(self.id.clone(), self.center));
        }
        Ok(())
    }

    /// The zones shipped with the Kolkata pilot.
    pub fn kolkata_defaults() -> Vec<DangerZone> {
        vec![
            DangerZone::new(
                "1",
                "Sealdah Transit Perimeter",
                Position::new(22.5671, 88.3712),
                400.0,
                ZoneKind::TransitPerimeter,
            ),
            DangerZone::new(
                "2",
                "Park Circus Sector",
                Position::new(22.5392, 88.3662),
                500.0,
                ZoneKind::CrowdSector,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        for zone in DangerZone::kolkata_defaults() {
            assert!(zone.validate().is_ok(), "{} should be valid", zone.name);
        }
    }

    #[test]
    fn rejects_bad_radius_and_center() {
        let mut zone = DangerZone::kolkata_defaults().remove(0);
        zone.radius_meters = 0.0;
        assert!(matches!(zone.validate(), Err(ZoneError::InvalidRadius(..))));

        zone.radius_meters = f64::NAN;
        assert!(matches!(zone.validate(), Err(ZoneError::InvalidRadius(..))));

        zone.radius_meters = 100.0;
        zone.center = Position::new(91.0, 0.0);
        assert!(matches!(zone.validate(), Err(ZoneError::InvalidCenter(..))));
    }

    #[test]
    fn kind_defaults_when_absent() {
        let json = r#"{
            "id": "z",
            "name": "Ghat",
            "center": { "latitude": 22.58, "longitude": 88.35 },
            "radius_meters": 120.0
        }"#;
        let zone: DangerZone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.kind, ZoneKind::Other);
    }
}
