use serde::{Deserialize, Serialize};

use stockledger_core::{DomainResult, Entity, LocationId};

use crate::product::{optional_text, required_name};

/// A place stock can sit in (warehouse, store, shelf).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(
        location_id: LocationId,
        name: impl AsRef<str>,
        address: Option<&str>,
    ) -> DomainResult<Self> {
        Ok(Self {
            location_id,
            name: required_name(name.as_ref())?,
            address: optional_text(address),
        })
    }

    pub fn rename(&mut self, name: impl AsRef<str>, address: Option<&str>) -> DomainResult<()> {
        self.name = required_name(name.as_ref())?;
        self.address = optional_text(address);
        Ok(())
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.location_id
    }
}
