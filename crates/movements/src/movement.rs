use core::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{Entity, LocationId, MovementId, ProductId, Quantity};
use stockledger_events::Event;

/// How a movement crosses the boundary of the tracked system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// No origin: stock enters the system.
    Inflow,
    /// No destination: stock leaves the system.
    Outflow,
    /// Both ends known: stock moves between two locations.
    Transfer,
}

/// An immutable ledger record.
///
/// `qty` is always positive (`Quantity` enforces it). Direction is not
/// guaranteed by the type: [`crate::RecordMovement::validate`] checks it, and
/// the movement log re-checks it on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub movement_id: MovementId,
    pub timestamp: DateTime<Utc>,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub product_id: ProductId,
    pub qty: Quantity,
}

impl Movement {
    pub fn kind(&self) -> MovementKind {
        match (&self.from_location, &self.to_location) {
            (None, _) => MovementKind::Inflow,
            (Some(_), None) => MovementKind::Outflow,
            (Some(_), Some(_)) => MovementKind::Transfer,
        }
    }

    pub fn is_inflow(&self) -> bool {
        self.from_location.is_none()
    }

    pub fn is_outflow(&self) -> bool {
        self.to_location.is_none()
    }

    /// Canonical log order: timestamp ascending, then movement id (ordinal).
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.movement_id.cmp(&other.movement_id))
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}

impl Event for Movement {
    fn event_type(&self) -> &'static str {
        "stock.movement.recorded"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Sort movements into canonical log order.
pub fn sort_canonical(movements: &mut [Movement]) {
    movements.sort_by(Movement::canonical_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn movement(id: &str, secs: i64, from: Option<&str>, to: Option<&str>) -> Movement {
        Movement {
            movement_id: MovementId::new(id).unwrap(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            from_location: from.map(|s| LocationId::new(s).unwrap()),
            to_location: to.map(|s| LocationId::new(s).unwrap()),
            product_id: ProductId::new("P1").unwrap(),
            qty: Quantity::new(1).unwrap(),
        }
    }

    #[test]
    fn kind_follows_present_locations() {
        assert_eq!(movement("M1", 0, None, Some("L1")).kind(), MovementKind::Inflow);
        assert_eq!(movement("M2", 0, Some("L1"), None).kind(), MovementKind::Outflow);
        assert_eq!(
            movement("M3", 0, Some("L1"), Some("L2")).kind(),
            MovementKind::Transfer
        );
    }

    #[test]
    fn canonical_order_breaks_timestamp_ties_by_id() {
        let mut moves = vec![
            movement("M2", 10, None, Some("L1")),
            movement("M9", 5, None, Some("L1")),
            movement("M10", 10, None, Some("L1")),
        ];
        sort_canonical(&mut moves);
        let ids: Vec<_> = moves.iter().map(|m| m.movement_id.as_str()).collect();
        // "M10" < "M2" ordinally.
        assert_eq!(ids, vec!["M9", "M10", "M2"]);
    }

    #[test]
    fn movement_is_an_event_at_its_timestamp() {
        let m = movement("M1", 42, None, Some("L1"));
        assert_eq!(m.event_type(), "stock.movement.recorded");
        assert_eq!(m.occurred_at(), Utc.timestamp_opt(42, 0).unwrap());
    }
}
