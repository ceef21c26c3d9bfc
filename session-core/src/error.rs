//! Error taxonomy for the session and tenant-access core.
//!
//! One enum per failure family: authentication, provisioning, role
//! resolution, the record store, and configuration. Callers decide what is
//! retryable; the core only decides what fails closed.

use std::time::Duration;

use thiserror::Error;

/// Failures of the identity provider surface.
///
/// These are user-visible and retryable; they never move an anonymous
/// session away from anonymous.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("credential expired")]
    CredentialExpired,

    #[error("authentication call timed out after {0:?}")]
    Timeout(Duration),

    #[error("identity provider error: {0}")]
    Provider(#[from] anyhow::Error),
}

impl AuthError {
    /// Whether the caller should offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Timeout(_) | AuthError::Provider(_))
    }
}

/// Failures of the record store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional insert hit a uniqueness constraint. The only store
    /// error the provisioning protocol recovers from.
    #[error("unique constraint violation")]
    UniqueViolation,

    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("record store error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Failures while guaranteeing the one-company-per-user invariant.
///
/// A provisioning failure leaves the session authenticated but tenant-less;
/// screens that need a tenant must render an explicit retry state.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("company lookup or insert failed: {0}")]
    Store(#[source] StoreError),

    /// The insert conflicted but the re-read found no row. A second
    /// violation of the invariant is unexpected and is never retried.
    #[error("company row missing after uniqueness conflict for user {user_id}")]
    RepeatedConflict { user_id: String },
}

/// Failures while looking up the admin allowlist.
///
/// Resolution failures fail closed to the tenant role, never admin.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("admin allowlist lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    MissingVar(String),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}
