use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Opaque reference to a catalog card. The core never interprets this
/// beyond identity and membership checks — rarity, aspect, and art are
/// the card catalog's concern, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CardId(pub String);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        CardId(value.to_string())
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        CardId(value)
    }
}
