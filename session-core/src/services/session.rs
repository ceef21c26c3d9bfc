//! Session lifecycle management.
//!
//! One long-lived manager owns the session state machine and is passed
//! through the application's composition root; there is no ambient
//! singleton. State transitions are driven exclusively by the identity
//! provider's change notifications, so sign-in calls returning and the
//! async notification arriving can never double-transition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::identity::{AuthEvent, IdentityProvider, OAuthProvider};
use crate::models::{Identity, Role, Session, METADATA_FULL_NAME};
use crate::services::AdminRoleResolver;

/// Single source of truth for "who is calling and with what role".
///
/// Observers subscribe to a watch channel carrying the current [`Session`];
/// each committed transition notifies subscribers at most once.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    resolver: AdminRoleResolver,
    state: watch::Sender<Session>,
    /// Bumped by every event and by local sign-out; a resolution result
    /// tagged with an older epoch is stale and gets discarded.
    epoch: AtomicU64,
    auth_timeout: Duration,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        resolver: AdminRoleResolver,
        config: &SessionConfig,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(Session::Init);
        Arc::new(Self {
            provider,
            resolver,
            state,
            epoch: AtomicU64::new(0),
            auth_timeout: config.auth_timeout,
        })
    }

    /// Subscribe to the provider's change stream and drive the resolution
    /// loop on a background task. Moves the session from `Init` to
    /// `Loading`; the first notification settles it.
    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        let mut events = self.provider.subscribe().await;
        self.transition(Session::Loading);

        let manager = self;
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                manager.apply_event(event).await;
            }
            tracing::debug!("Identity change stream closed");
        })
    }

    /// Current session snapshot.
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Watch receiver notified after each state transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Password sign-in. Delegates to the provider and returns its verdict;
    /// the session transitions only when the change notification lands.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.bounded(self.provider.sign_in_with_password(email, password))
            .await
    }

    /// Federated sign-in via Google. Same contract as [`Self::sign_in`].
    pub async fn sign_in_with_google(&self) -> Result<(), AuthError> {
        self.bounded(self.provider.sign_in_with_oauth(OAuthProvider::Google))
            .await
    }

    /// Register a company account. The provider signs the new account in,
    /// and that notification drives the transition.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<(), AuthError> {
        let mut metadata = HashMap::new();
        if let Some(name) = full_name {
            metadata.insert(METADATA_FULL_NAME.to_string(), name.to_string());
        }
        self.bounded(self.provider.sign_up(email, password, metadata))
            .await
    }

    /// Sign out. Clears the local session immediately, then attempts the
    /// remote revoke; a remote failure is logged and swallowed so the user
    /// is never stuck in an authenticated-looking UI.
    pub async fn sign_out(&self) {
        let epoch = self.next_epoch();
        self.commit(epoch, Session::Anonymous);

        match tokio::time::timeout(self.auth_timeout, self.provider.sign_out()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Remote sign-out failed; local session already cleared");
            }
            Err(_) => {
                tracing::error!("Remote sign-out timed out; local session already cleared");
            }
        }
    }

    async fn apply_event(&self, event: AuthEvent) {
        let epoch = self.next_epoch();
        match event {
            AuthEvent::Initial {
                has_credential: false,
            }
            | AuthEvent::SignedOut
            | AuthEvent::CredentialExpired => {
                self.commit(epoch, Session::Anonymous);
            }
            AuthEvent::Initial {
                has_credential: true,
            }
            | AuthEvent::SignedIn
            | AuthEvent::TokenRefreshed => {
                let session = self.resolve_authenticated().await;
                self.commit(epoch, session);
            }
        }
    }

    /// Fetch the identity behind the active credential and resolve its
    /// role. Provider failure fails closed to `Anonymous`; an unreachable
    /// allowlist fails closed to the tenant role, never admin.
    async fn resolve_authenticated(&self) -> Session {
        let identity = match self.provider.current_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => return Session::Anonymous,
            Err(e) => {
                tracing::warn!(error = %e, "Identity fetch failed during resolution; treating session as anonymous");
                return Session::Anonymous;
            }
        };

        let role = self.resolve_role(&identity).await;
        Session::Authenticated { identity, role }
    }

    async fn resolve_role(&self, identity: &Identity) -> Role {
        match self.resolver.resolve(&identity.email).await {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    email = %identity.email,
                    "Admin allowlist unreachable; defaulting to tenant role"
                );
                Role::Tenant
            }
        }
    }

    fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a transition unless a fresher event superseded it while the
    /// resolution was in flight.
    fn commit(&self, epoch: u64, session: Session) {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(
                status = session.status(),
                "Discarding stale session resolution"
            );
            return;
        }
        self.transition(session);
    }

    fn transition(&self, next: Session) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            tracing::debug!(from = current.status(), to = next.status(), "Session transition");
            *current = next;
            true
        });
    }

    async fn bounded(
        &self,
        call: impl std::future::Future<Output = Result<(), AuthError>>,
    ) -> Result<(), AuthError> {
        match tokio::time::timeout(self.auth_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(self.auth_timeout)),
        }
    }
}
