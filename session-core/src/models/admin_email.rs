//! Admin allowlist entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One email granted the platform administrator role. Read-only from this
/// core; the allowlist is managed by the excluded admin CRUD surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AdminEmail {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl AdminEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}
