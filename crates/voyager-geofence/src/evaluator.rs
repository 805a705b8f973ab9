use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use voyager_types::{DangerZone, Position};

use crate::distance::haversine_distance;

/// Outcome of evaluating one position sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeofenceVerdict {
    /// Strictly inside at least one zone.
    pub breach: bool,
    /// The sample was out of range and was treated as "no breach".
    pub invalid_position: bool,
}

impl GeofenceVerdict {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn breached() -> Self {
        Self {
            breach: true,
            invalid_position: false,
        }
    }

    pub fn invalid() -> Self {
        Self {
            breach: false,
            invalid_position: true,
        }
    }
}

/// Is `position` strictly inside at least one of `zones`?
///
/// Out-of-range positions evaluate to `false`. Short-circuits on the first
/// breached zone.
pub fn evaluate(position: &Position, zones: &[DangerZone]) -> bool {
    position.is_valid() && zones.iter().any(|zone| is_breached(position, zone))
}

fn is_breached(position: &Position, zone: &DangerZone) -> bool {
    haversine_distance(position, &zone.center) < zone.radius_meters
}

/// Holds the static zone set loaded at startup.
#[derive(Clone, Debug, Default)]
pub struct GeofenceEvaluator {
    zones: Vec<DangerZone>,
}

impl GeofenceEvaluator {
    /// Build an evaluator, dropping zones that fail validation.
    pub fn new(zones: impl IntoIterator<Item = DangerZone>) -> Self {
        let zones = zones
            .into_iter()
            .filter(|zone| match zone.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Dropping invalid danger zone");
                    false
                }
            })
            .collect::<Vec<_>>();

        debug!(zone_count = zones.len(), "Geofence evaluator ready");
        Self { zones }
    }

    pub fn zones(&self) -> &[DangerZone] {
        &self.zones
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Evaluate a sample, reporting out-of-range input as a data-quality
    /// signal rather than an error.
    pub fn check(&self, position: &Position) -> GeofenceVerdict {
        if !position.is_valid() {
            warn!(
                latitude = position.latitude,
                longitude = position.longitude,
                "Out-of-range position treated as no breach"
            );
            return GeofenceVerdict::invalid();
        }

        if evaluate(position, &self.zones) {
            GeofenceVerdict::breached()
        } else {
            GeofenceVerdict::clear()
        }
    }

    pub fn evaluate(&self, position: &Position) -> bool {
        evaluate(position, &self.zones)
    }

    /// Every zone the position is strictly inside, in configuration order.
    pub fn breached_zones(&self, position: &Position) -> Vec<&DangerZone> {
        if !position.is_valid() {
            return Vec::new();
        }
        self.zones
            .iter()
            .filter(|zone| is_breached(position, zone))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::haversine_distance;
    use proptest::prelude::*;
    use voyager_types::ZoneKind;

    fn sealdah() -> DangerZone {
        DangerZone::new(
            "1",
            "Sealdah Transit Perimeter",
            Position::new(22.5671, 88.3712),
            400.0,
            ZoneKind::TransitPerimeter,
        )
    }

    #[test]
    fn nearby_position_breaches() {
        let zones = vec![sealdah()];
        assert!(evaluate(&Position::new(22.5675, 88.3712), &zones));
        assert!(!evaluate(&Position::new(22.60, 88.40), &zones));
    }

    #[test]
    fn boundary_is_not_a_breach() {
        let position = Position::new(22.5675, 88.3712);
        let mut zone = sealdah();
        zone.radius_meters = haversine_distance(&position, &zone.center);
        assert!(!evaluate(&position, &[zone.clone()]));

        zone.radius_meters += 1e-6;
        assert!(evaluate(&position, &[zone]));
    }

    #[test]
    fn empty_zone_set_never_breaches() {
        assert!(!evaluate(&Position::new(22.5671, 88.3712), &[]));
    }

    #[test]
    fn invalid_positions_are_flagged_not_breached() {
        let evaluator = GeofenceEvaluator::new(vec![sealdah()]);
        let verdict = evaluator.check(&Position::new(f64::NAN, 88.3712));
        assert_eq!(verdict, GeofenceVerdict::invalid());

        let verdict = evaluator.check(&Position::new(122.5671, 88.3712));
        assert!(!verdict.breach);
        assert!(verdict.invalid_position);
        assert!(evaluator.breached_zones(&Position::new(0.0, 200.0)).is_empty());
    }

    #[test]
    fn invalid_zones_are_dropped() {
        let mut broken = sealdah();
        broken.id = "broken".into();
        broken.radius_meters = -5.0;

        let evaluator = GeofenceEvaluator::new(vec![sealdah(), broken]);
        assert_eq!(evaluator.zone_count(), 1);
    }

    #[test]
    fn overlapping_zones_are_all_reported() {
        let mut wide = sealdah();
        wide.id = "wide".into();
        wide.radius_meters = 5_000.0;

        let evaluator = GeofenceEvaluator::new(vec![sealdah(), wide]);
        let hits = evaluator.breached_zones(&Position::new(22.5675, 88.3712));
        assert_eq!(hits.len(), 2);

        let far_inside_wide = evaluator.breached_zones(&Position::new(22.58, 88.3712));
        assert_eq!(far_inside_wide.len(), 1);
        assert_eq!(far_inside_wide[0].id.as_str(), "wide");
    }

    fn position() -> impl Strategy<Value = Position> {
        (22.40f64..22.70, 88.20f64..88.50).prop_map(|(lat, lng)| Position::new(lat, lng))
    }

    fn zones() -> impl Strategy<Value = Vec<DangerZone>> {
        proptest::collection::vec((position(), 1.0f64..5_000.0), 0..8).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (center, radius))| {
                    DangerZone::new(i.to_string(), format!("zone-{i}"), center, radius, ZoneKind::Other)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn zone_order_does_not_matter(p in position(), zs in zones()) {
            let mut reversed = zs.clone();
            reversed.reverse();
            prop_assert_eq!(evaluate(&p, &zs), evaluate(&p, &reversed));
        }

        #[test]
        fn shrinking_a_radius_never_adds_a_breach(
            p in position(),
            zs in zones(),
            index in any::<prop::sample::Index>(),
            factor in 0.0f64..1.0,
        ) {
            prop_assume!(!zs.is_empty());
            let before = evaluate(&p, &zs);

            let mut shrunk = zs.clone();
            let i = index.index(shrunk.len());
            shrunk[i].radius_meters *= factor;

            let after = evaluate(&p, &shrunk);
            prop_assert!(!after || before);
        }

        #[test]
        fn evaluation_is_deterministic(p in position(), zs in zones()) {
            prop_assert_eq!(evaluate(&p, &zs), evaluate(&p, &zs));
        }
    }
}
