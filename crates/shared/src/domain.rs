use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A persisted record the store hands out and takes back.
pub trait Entity: Send + Sync + 'static {
    /// Resource name used in error messages, e.g. `"product"`.
    const KIND: &'static str;

    fn id(&self) -> EntityId;
}

/// Client-facing representation of an [`Entity`].
///
/// The identifier is optional because clients omit it when creating.
pub trait ViewModel: Send + Sync + 'static {
    fn id(&self) -> Option<EntityId>;
}
