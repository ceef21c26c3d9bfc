//! Get-or-create company provisioning.

use std::sync::Arc;

use crate::error::{ProvisioningError, StoreError};
use crate::models::{Company, Identity};
use crate::store::RecordStore;

/// Guarantees exactly one company record per authenticated user, tolerating
/// concurrent callers from other tabs or processes.
///
/// Callers are not ordered relative to each other; correctness relies on
/// the store's UNIQUE constraint on `user_id`, not on sequencing.
#[derive(Clone)]
pub struct TenantProvisioner {
    store: Arc<dyn RecordStore>,
    fallback_name: String,
}

impl TenantProvisioner {
    pub fn new(store: Arc<dyn RecordStore>, fallback_name: impl Into<String>) -> Self {
        Self {
            store,
            fallback_name: fallback_name.into(),
        }
    }

    /// Return the user's company, creating it on first use.
    ///
    /// Protocol: select, then conditional insert, then on a uniqueness
    /// conflict one re-select of the winner's row. The conflict path is the
    /// only retried failure and it retries exactly once; a conflict
    /// followed by an empty re-read is surfaced as fatal rather than
    /// looped on.
    pub async fn get_or_create(&self, identity: &Identity) -> Result<Company, ProvisioningError> {
        if let Some(existing) = self
            .store
            .find_company_by_user(&identity.id)
            .await
            .map_err(ProvisioningError::Store)?
        {
            return Ok(existing);
        }

        let company = Company::new(identity.id.clone(), self.default_name(identity));
        match self.store.insert_company(&company).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %identity.id,
                    company_id = %company.id,
                    name = %company.name,
                    "Provisioned company"
                );
                Ok(company)
            }
            Err(StoreError::UniqueViolation) => {
                // A concurrent caller won the race; their row is ours too.
                tracing::debug!(user_id = %identity.id, "Lost provisioning race, re-reading winner");
                self.store
                    .find_company_by_user(&identity.id)
                    .await
                    .map_err(ProvisioningError::Store)?
                    .ok_or_else(|| ProvisioningError::RepeatedConflict {
                        user_id: identity.id.clone(),
                    })
            }
            Err(e) => Err(ProvisioningError::Store(e)),
        }
    }

    /// Name precedence: sign-up `full_name`, else the email's local part,
    /// else the configured fallback.
    fn default_name(&self, identity: &Identity) -> String {
        identity
            .full_name()
            .or_else(|| identity.email_local_part())
            .unwrap_or(&self.fallback_name)
            .to_string()
    }
}
