use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use stockledger_core::{
    optional_location, DomainError, DomainResult, LocationId, MovementId, ProductId, Quantity,
};

use crate::movement::Movement;
use crate::timestamp::resolve_timestamp;

/// Caller input for recording a movement.
///
/// Identifiers are already typed; `qty` and `timestamp` stay raw so that
/// [`RecordMovement::validate`] can report `InvalidQuantity` and apply the
/// timestamp fallback in one place. Blank location strings deserialize as
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub movement_id: MovementId,
    pub product_id: ProductId,
    pub qty: i64,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub from_location: Option<LocationId>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub to_location: Option<LocationId>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl RecordMovement {
    pub fn new(movement_id: MovementId, product_id: ProductId, qty: i64) -> Self {
        Self {
            movement_id,
            product_id,
            qty,
            from_location: None,
            to_location: None,
            timestamp: None,
        }
    }

    pub fn from_location(mut self, location: LocationId) -> Self {
        self.from_location = Some(location);
        self
    }

    pub fn to_location(mut self, location: LocationId) -> Self {
        self.to_location = Some(location);
        self
    }

    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Validate the intrinsic invariants and produce the movement to append.
    ///
    /// Checks quantity, then direction. Product existence and id uniqueness
    /// need shared state and are checked by the log.
    pub fn validate(self, now: DateTime<Utc>) -> DomainResult<Movement> {
        let qty = Quantity::new(self.qty)?;

        if self.from_location.is_none() && self.to_location.is_none() {
            return Err(DomainError::AmbiguousDirection);
        }

        let timestamp = resolve_timestamp(self.timestamp.as_deref(), now);

        Ok(Movement {
            movement_id: self.movement_id,
            timestamp,
            from_location: self.from_location,
            to_location: self.to_location,
            product_id: self.product_id,
            qty,
        })
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<LocationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(optional_location(raw.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap()
    }

    fn base(qty: i64) -> RecordMovement {
        RecordMovement::new(
            MovementId::new("M1").unwrap(),
            ProductId::new("P1").unwrap(),
            qty,
        )
    }

    fn lid(s: &str) -> LocationId {
        LocationId::new(s).unwrap()
    }

    #[test]
    fn inflow_validates() {
        let m = base(10).to_location(lid("L1")).validate(now()).unwrap();
        assert_eq!(m.qty.get(), 10);
        assert!(m.is_inflow());
        assert_eq!(m.timestamp, now());
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let err = base(0).to_location(lid("L1")).validate(now()).unwrap_err();
        assert_eq!(err, DomainError::InvalidQuantity(0));
    }

    #[test]
    fn quantity_is_checked_before_direction() {
        let err = base(-1).validate(now()).unwrap_err();
        assert_eq!(err, DomainError::InvalidQuantity(-1));
    }

    #[test]
    fn missing_both_locations_is_ambiguous() {
        let err = base(5).validate(now()).unwrap_err();
        assert_eq!(err, DomainError::AmbiguousDirection);
    }

    #[test]
    fn explicit_timestamp_is_used() {
        let m = base(1)
            .from_location(lid("L1"))
            .at("2024-01-02T03:04:05Z")
            .validate(now())
            .unwrap();
        assert_eq!(m.timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn unparseable_timestamp_defaults_to_now() {
        let m = base(1)
            .from_location(lid("L1"))
            .at("not a date")
            .validate(now())
            .unwrap();
        assert_eq!(m.timestamp, now());
    }

    #[test]
    fn blank_locations_deserialize_as_absent() {
        let input: RecordMovement = serde_json::from_str(
            r#"{"movement_id":"M1","product_id":"P1","qty":3,"from_location":"","to_location":"L2"}"#,
        )
        .unwrap();
        assert_eq!(input.from_location, None);
        assert_eq!(input.to_location, Some(lid("L2")));
        assert_eq!(input.timestamp, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: non-positive quantities never validate, whatever the direction.
        #[test]
        fn non_positive_quantities_never_validate(
            qty in i64::MIN..=0i64,
            from in proptest::option::of("[A-Z][0-9]{1,3}"),
            to in proptest::option::of("[A-Z][0-9]{1,3}"),
        ) {
            let mut input = base(qty);
            input.from_location = from.map(|s| lid(&s));
            input.to_location = to.map(|s| lid(&s));
            prop_assert_eq!(input.validate(now()), Err(DomainError::InvalidQuantity(qty)));
        }
    }
}
