//! In-memory identity provider for tests and local composition roots.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{AuthEvent, IdentityProvider, OAuthProvider};
use crate::error::AuthError;
use crate::models::Identity;

/// Scriptable [`IdentityProvider`] backed by an in-memory user table.
///
/// Change events are fanned out to every open subscription, mirroring the
/// real provider's behavior across tabs. Failure knobs cover the paths the
/// session manager must survive: remote sign-out failure, hung sign-in
/// calls, and identity fetch errors mid-resolution.
#[derive(Default)]
pub struct MockIdentityProvider {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// email (lowercased) -> (password, identity)
    users: HashMap<String, (String, Identity)>,
    current: Option<Identity>,
    subscribers: Vec<mpsc::UnboundedSender<AuthEvent>>,
    suppress_initial: bool,
    fail_sign_out: bool,
    hang_sign_in: bool,
    fail_identity_fetch: bool,
    oauth_identity: Option<Identity>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider whose subscriptions deliver no initial snapshot;
    /// the session stays in `Loading` until the test emits an event.
    pub fn without_initial_snapshot() -> Self {
        let provider = Self::default();
        provider.lock().suppress_initial = true;
        provider
    }

    /// Register an account the password flow can sign in.
    pub fn add_user(&self, email: &str, password: &str, identity: Identity) {
        self.lock()
            .users
            .insert(email.to_ascii_lowercase(), (password.to_string(), identity));
    }

    /// Identity the federated flow signs in as.
    pub fn set_oauth_identity(&self, identity: Identity) {
        self.lock().oauth_identity = Some(identity);
    }

    /// Make the active credential belong to `identity` without emitting
    /// an event. Useful for pre-authenticated starting states.
    pub fn set_current(&self, identity: Option<Identity>) {
        self.lock().current = identity;
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.lock().fail_sign_out = fail;
    }

    pub fn set_hang_sign_in(&self, hang: bool) {
        self.lock().hang_sign_in = hang;
    }

    pub fn set_fail_identity_fetch(&self, fail: bool) {
        self.lock().fail_identity_fetch = fail;
    }

    /// Revoke the credential as the provider would on expiry.
    pub fn expire_credential(&self) {
        let mut inner = self.lock();
        inner.current = None;
        broadcast(&mut inner, AuthEvent::CredentialExpired);
    }

    /// Push an arbitrary event to all subscriptions.
    pub fn emit(&self, event: AuthEvent) {
        broadcast(&mut self.lock(), event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock identity state poisoned")
    }
}

fn broadcast(inner: &mut Inner, event: AuthEvent) {
    inner.subscribers.retain(|tx| tx.send(event).is_ok());
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn subscribe(&self) -> BoxStream<'static, AuthEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut inner = self.lock();
            if !inner.suppress_initial {
                let _ = tx.send(AuthEvent::Initial {
                    has_credential: inner.current.is_some(),
                });
            }
            inner.subscribers.push(tx);
        }
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Box::pin(stream)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let hang = self.lock().hang_sign_in;
        if hang {
            futures::future::pending::<()>().await;
        }

        let mut inner = self.lock();
        match inner.users.get(&email.to_ascii_lowercase()) {
            Some((stored, identity)) if stored == password => {
                inner.current = Some(identity.clone());
                broadcast(&mut inner, AuthEvent::SignedIn);
                Ok(())
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_in_with_oauth(&self, _provider: OAuthProvider) -> Result<(), AuthError> {
        let mut inner = self.lock();
        let identity = inner
            .oauth_identity
            .clone()
            .ok_or_else(|| AuthError::Provider(anyhow::anyhow!("no federated identity configured")))?;
        inner.current = Some(identity);
        broadcast(&mut inner, AuthEvent::SignedIn);
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), AuthError> {
        let mut inner = self.lock();
        let key = email.to_ascii_lowercase();
        if inner.users.contains_key(&key) {
            return Err(AuthError::Provider(anyhow::anyhow!(
                "email already registered"
            )));
        }
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            metadata,
        };
        inner
            .users
            .insert(key, (password.to_string(), identity.clone()));
        // The provider signs new accounts in immediately.
        inner.current = Some(identity);
        broadcast(&mut inner, AuthEvent::SignedIn);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut inner = self.lock();
        if inner.fail_sign_out {
            return Err(AuthError::Provider(anyhow::anyhow!(
                "revocation endpoint unreachable"
            )));
        }
        inner.current = None;
        broadcast(&mut inner, AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        let inner = self.lock();
        if inner.fail_identity_fetch {
            return Err(AuthError::Provider(anyhow::anyhow!(
                "identity endpoint unreachable"
            )));
        }
        Ok(inner.current.clone())
    }
}
