//! Company (tenant) record - exactly one per registered company user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Company entity. `user_id` carries a UNIQUE constraint in the store;
/// the provisioning protocol depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    /// Owning identity's provider-issued id.
    pub user_id: String,
    pub name: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Create a new unverified company for a user.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            verified: false,
            created_at: Utc::now(),
        }
    }
}
