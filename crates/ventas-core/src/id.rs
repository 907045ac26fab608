//! Document identities.
//!
//! Every stored document is keyed by a UUID v4. Identities arrive from the
//! outside world as strings (path segments), so parsing is the well-formedness
//! check: an id that doesn't parse can never match a stored document and is
//! answered as "not found" without touching the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Opaque identity of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generates a fresh identity for a new document.
    pub fn generate() -> Self {
        DocumentId(Uuid::new_v4())
    }

    /// Parses an identity string.
    ///
    /// ## Example
    /// ```rust
    /// use ventas_core::DocumentId;
    ///
    /// assert!(DocumentId::parse("550e8400-e29b-41d4-a716-446655440000").is_ok());
    /// assert!(DocumentId::parse("not-an-id").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::required("id"));
        }

        Uuid::parse_str(raw)
            .map(DocumentId)
            .map_err(|_| ValidationError::invalid_format("id", "must be a valid UUID"))
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        let id = DocumentId::generate();
        let parsed = DocumentId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(DocumentId::parse("").is_err());
        assert!(DocumentId::parse("   ").is_err());
        assert!(DocumentId::parse("123").is_err());
        // 24-hex object ids from the legacy store are not identities here
        assert!(DocumentId::parse("507f1f77bcf86cd799439011").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = DocumentId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
    }
}
