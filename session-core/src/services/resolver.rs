//! Admin role resolution against the allowlist.

use std::sync::Arc;

use crate::error::ResolutionError;
use crate::models::Role;
use crate::store::RecordStore;

/// Resolves an email to a role by case-insensitive exact match against the
/// `admin_emails` allowlist.
///
/// No caching across sessions: a grant may be revoked between sessions, so
/// the session manager re-resolves on every fresh authentication.
#[derive(Clone)]
pub struct AdminRoleResolver {
    store: Arc<dyn RecordStore>,
}

impl AdminRoleResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, email: &str) -> Result<Role, ResolutionError> {
        let entry = self.store.find_admin_email(email).await?;
        Ok(match entry {
            Some(_) => Role::Admin,
            None => Role::Tenant,
        })
    }
}
