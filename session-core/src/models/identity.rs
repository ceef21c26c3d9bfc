//! Identity as issued by the external identity provider.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key the sign-up flow stores the display name under.
pub const METADATA_FULL_NAME: &str = "full_name";

/// An authenticated identity. Owned by the identity provider; immutable
/// from the core's point of view except across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque provider-issued identifier.
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry (builder style, used mostly by tests).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `full_name` the provider captured at sign-up, if any.
    pub fn full_name(&self) -> Option<&str> {
        self.metadata
            .get(METADATA_FULL_NAME)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// The part of the email before `@`, if non-empty.
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .split('@')
            .next()
            .filter(|part| !part.is_empty())
    }
}
