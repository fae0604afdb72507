//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Shortest accepted prefix length
const MIN_PREFIX_LEN: usize = 2;

/// Longest accepted prefix length
const MAX_PREFIX_LEN: usize = 8;

/// Entity type prefix (e.g. "ORD", "ART", "TAG")
///
/// Prefixes are 2-8 ASCII letters and are always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityPrefix(String);

impl EntityPrefix {
    /// Validate and normalize a prefix
    pub fn new(s: &str) -> Result<Self, IdParseError> {
        let valid = (MIN_PREFIX_LEN..=MAX_PREFIX_LEN).contains(&s.len())
            && s.chars().all(|c| c.is_ascii_alphabetic());
        if !valid {
            return Err(IdParseError::InvalidPrefix(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name used for entity files of this type
    pub fn dir_name(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Get the entity prefix
    pub fn prefix(&self) -> &EntityPrefix {
        &self.prefix
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (expected 2-8 ASCII letters)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(s: &str) -> EntityPrefix {
        EntityPrefix::new(s).unwrap()
    }

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(prefix("ORD"));
        assert!(id.to_string().starts_with("ORD-"));
        assert_eq!(id.to_string().len(), 30); // ORD- (4) + ULID (26)
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let original = EntityId::new(prefix("ART"));
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.prefix().as_str(), "ART");
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_prefix_is_normalized_to_uppercase() {
        assert_eq!(prefix("tag").as_str(), "TAG");
        assert_eq!(prefix("Tag").dir_name(), "tag");
    }

    #[test]
    fn test_prefix_rejects_bad_input() {
        assert!(EntityPrefix::new("X").is_err());
        assert!(EntityPrefix::new("TOOLONGPREFIX").is_err());
        assert!(EntityPrefix::new("OR1").is_err());
        assert!(EntityPrefix::new("").is_err());
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("X-01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("ORD01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("ORD-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_entity_id_serde_as_string() {
        let id = EntityId::new(prefix("ITM"));
        let yaml = serde_yml::to_string(&id).unwrap();
        assert_eq!(yaml.trim(), id.to_string());
        let back: EntityId = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back, id);
    }
}
