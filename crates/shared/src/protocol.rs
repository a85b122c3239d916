use serde::{Deserialize, Serialize};

use crate::domain::{EntityId, ViewModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductViewModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ViewModel for ProductViewModel {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
