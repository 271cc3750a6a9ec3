use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, ProductId};

/// A stock-keeping unit tracked by the ledger.
///
/// Identity is immutable; `name` and `description` may be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Build a product, trimming inputs. An empty name is rejected and a blank
    /// description is stored as `None`.
    pub fn new(
        product_id: ProductId,
        name: impl AsRef<str>,
        description: Option<&str>,
    ) -> DomainResult<Self> {
        Ok(Self {
            product_id,
            name: required_name(name.as_ref())?,
            description: optional_text(description),
        })
    }

    /// Replace the mutable attributes.
    pub fn rename(&mut self, name: impl AsRef<str>, description: Option<&str>) -> DomainResult<()> {
        self.name = required_name(name.as_ref())?;
        self.description = optional_text(description);
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

pub(crate) fn required_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

pub(crate) fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
