//! Strongly-typed identifiers used across the catalog.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Identifier of a catalog item (wood plank).
///
/// Opaque to callers; assigned by the store when an item is created and never
/// changed afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlankId(Uuid);

impl PlankId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlankId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PlankId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PlankId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PlankId> for Uuid {
    fn from(value: PlankId) -> Self {
        value.0
    }
}

impl FromStr for PlankId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s.trim())
            .map_err(|e| ValidationError::new("id", format!("not a valid identifier: {e}")))?;
        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_its_own_display_output() {
        let id = PlankId::new();
        let parsed: PlankId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_garbage_with_field_name() {
        let err = "not-a-uuid".parse::<PlankId>().unwrap_err();
        assert_eq!(err.field, "id");
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = PlankId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
