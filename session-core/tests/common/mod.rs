//! Test helper module for session-core integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use session_core::{
    AdminRoleResolver, Identity, MemoryRecordStore, MockIdentityProvider, Session, SessionConfig,
    SessionManager,
};
use tokio::sync::watch;

/// Assembled session core over the in-memory collaborators.
pub struct PortalHarness {
    pub provider: Arc<MockIdentityProvider>,
    pub store: Arc<MemoryRecordStore>,
    pub manager: Arc<SessionManager>,
    pub config: SessionConfig,
}

impl PortalHarness {
    pub fn new() -> Self {
        Self::with_parts(MockIdentityProvider::new(), SessionConfig::default())
    }

    pub fn with_provider(provider: MockIdentityProvider) -> Self {
        Self::with_parts(provider, SessionConfig::default())
    }

    pub fn with_parts(provider: MockIdentityProvider, config: SessionConfig) -> Self {
        init_tracing();
        let provider = Arc::new(provider);
        let store = Arc::new(MemoryRecordStore::new());
        let resolver = AdminRoleResolver::new(store.clone());
        let manager = SessionManager::new(provider.clone(), resolver, &config);
        Self {
            provider,
            store,
            manager,
            config,
        }
    }

    /// Start the resolution loop.
    pub async fn start(&self) {
        self.manager.clone().start().await;
    }
}

/// Initialize test logging once; respects RUST_LOG.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn identity(id: &str, email: &str) -> Identity {
    Identity::new(id, email)
}

/// Wait until the session satisfies `pred`, with a test-level timeout.
pub async fn wait_for(
    rx: &mut watch::Receiver<Session>,
    pred: impl FnMut(&Session) -> bool,
) -> Session {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for session state")
        .expect("session channel closed")
        .clone()
}

/// Assert that `pred` does not become true within `window`.
pub async fn assert_never(
    rx: &mut watch::Receiver<Session>,
    window: Duration,
    pred: impl FnMut(&Session) -> bool,
    message: &str,
) {
    let observed = tokio::time::timeout(window, rx.wait_for(pred)).await;
    assert!(observed.is_err(), "{}", message);
}
