//! Identity provider boundary.
//!
//! The provider owns credentials end to end; the core only reacts to its
//! change notifications and asks for the current identity. Sign-in calls
//! deliberately do not return the identity - the subsequent change event is
//! the single source of state transitions, which avoids double-transition
//! races between a call's return and the async notification.

mod mock;

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::AuthError;
use crate::models::Identity;

pub use mock::MockIdentityProvider;

/// Change notification from the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Snapshot delivered when a subscription is opened.
    Initial { has_credential: bool },
    SignedIn,
    SignedOut,
    TokenRefreshed,
    CredentialExpired,
}

/// Federated sign-in providers the portal offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

/// Contract the core requires of the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Open a change-notification stream. Implementations deliver an
    /// [`AuthEvent::Initial`] snapshot first, then every subsequent
    /// credential change in order.
    async fn subscribe(&self) -> BoxStream<'static, AuthEvent>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), AuthError>;

    /// Revoke the active credential remotely.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Identity behind the active credential, or `None` when anonymous.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;
}
