//! Record identity handling.
//!
//! A record id is either `Remote` (assigned by the remote store) or `Local`
//! (generated on this device while offline, not yet confirmed). Local ids
//! render as `offline-<uuid>` so they survive storage and display without a
//! separate flag; parsing restores the variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// String prefix marking ids that have no remote counterpart yet.
pub const LOCAL_ID_PREFIX: &str = "offline-";

/// Errors that can occur when parsing a record id.
#[derive(Error, Debug)]
pub enum RecordIdError {
    #[error("record id is empty")]
    Empty,

    #[error("invalid local id token in '{0}': expected a UUID after the prefix")]
    InvalidLocalToken(String),
}

/// Identity of a cached record.
///
/// `Remote` ids are valid targets for remote update/delete calls. `Local`
/// ids exist only on this device; sending one to the remote store as an
/// update/delete target is never meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    Remote(String),
    Local(Uuid),
}

impl RecordId {
    /// Generates a fresh local id for a record created while offline.
    pub fn local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Wraps an id assigned by the remote store.
    pub fn remote(id: impl Into<String>) -> Self {
        Self::Remote(id.into())
    }

    /// Returns true if the remote store has not assigned this id yet.
    pub fn is_local(&self) -> bool {
        matches!(self, RecordId::Local(_))
    }

    /// The remote-store id, if this record has one.
    pub fn as_remote(&self) -> Option<&str> {
        match self {
            RecordId::Remote(id) => Some(id),
            RecordId::Local(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Remote(id) => write!(f, "{}", id),
            RecordId::Local(token) => write!(f, "{}{}", LOCAL_ID_PREFIX, token),
        }
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(RecordIdError::Empty);
        }
        match s.strip_prefix(LOCAL_ID_PREFIX) {
            Some(token) => {
                let token = Uuid::parse_str(token)
                    .map_err(|_| RecordIdError::InvalidLocalToken(s.to_string()))?;
                Ok(RecordId::Local(token))
            }
            None => Ok(RecordId::Remote(s.to_string())),
        }
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
