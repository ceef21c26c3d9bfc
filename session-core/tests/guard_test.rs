//! Route guard integration tests.
//!
//! Exercise the guards against sessions produced by a live session
//! manager, including the no-flash property during delayed resolution and
//! the company portal's tenant gate.

mod common;

use std::time::Duration;

use common::{identity, wait_for, PortalHarness};
use session_core::{
    AuthEvent, CompanyPortal, CompanyView, MockIdentityProvider, RouteDecision, RouteGuard,
    TenantProvisioner, METADATA_FULL_NAME,
};

fn company_portal(harness: &PortalHarness) -> CompanyPortal {
    let provisioner = TenantProvisioner::new(
        harness.store.clone(),
        harness.config.fallback_company_name.clone(),
    );
    CompanyPortal::new(provisioner, &harness.config)
}

#[tokio::test]
async fn nothing_protected_renders_while_resolution_is_delayed() {
    // A provider that never delivers its snapshot keeps the session in
    // Loading; both guards must hold at Loading, not redirect or render.
    let harness = PortalHarness::with_provider(MockIdentityProvider::without_initial_snapshot());
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let session = harness.manager.current();
    assert!(session.is_loading());

    let admin_guard = RouteGuard::admin_portal(&harness.config);
    assert_eq!(admin_guard.decide(&session), RouteDecision::Loading);

    let portal = company_portal(&harness);
    assert!(matches!(
        portal.resolve_view(&session).await,
        CompanyView::Loading
    ));

    // Once the snapshot lands the guard settles and may redirect.
    harness.provider.emit(AuthEvent::Initial {
        has_credential: false,
    });
    let session = wait_for(&mut rx, |s| !s.is_loading()).await;
    assert_eq!(
        admin_guard.decide(&session),
        RouteDecision::Redirect("/admin/login".to_string())
    );
}

#[tokio::test]
async fn anonymous_visitor_is_redirected_to_admin_login() {
    let harness = PortalHarness::new();
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    let session = wait_for(&mut rx, |s| !s.is_loading()).await;

    let decision = RouteGuard::admin_portal(&harness.config).decide(&session);
    assert_eq!(decision, RouteDecision::Redirect("/admin/login".to_string()));
}

#[tokio::test]
async fn authenticated_non_admin_is_redirected_to_landing() {
    let harness = PortalHarness::new();
    harness
        .provider
        .add_user("recruiter@acme.io", "hunter2", identity("u1", "recruiter@acme.io"));
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    wait_for(&mut rx, |s| !s.is_loading()).await;

    harness
        .manager
        .sign_in("recruiter@acme.io", "hunter2")
        .await
        .unwrap();
    let session = wait_for(&mut rx, |s| s.is_authenticated()).await;

    let decision = RouteGuard::admin_portal(&harness.config).decide(&session);
    assert_eq!(decision, RouteDecision::Redirect("/".to_string()));
}

#[tokio::test]
async fn admin_reaches_admin_portal() {
    let harness = PortalHarness::new();
    harness.store.add_admin_email("ops@placehub.io");
    harness
        .provider
        .add_user("ops@placehub.io", "secret", identity("a1", "ops@placehub.io"));
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    wait_for(&mut rx, |s| !s.is_loading()).await;

    harness
        .manager
        .sign_in("ops@placehub.io", "secret")
        .await
        .unwrap();
    let session = wait_for(&mut rx, |s| s.is_authenticated()).await;

    let decision = RouteGuard::admin_portal(&harness.config).decide(&session);
    assert_eq!(decision, RouteDecision::Render);
}

#[tokio::test]
async fn anonymous_visitor_is_redirected_to_company_login() {
    let harness = PortalHarness::new();
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    let session = wait_for(&mut rx, |s| !s.is_loading()).await;

    let portal = company_portal(&harness);
    match portal.resolve_view(&session).await {
        CompanyView::Redirect(route) => assert_eq!(route, "/auth/login"),
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn first_company_visit_provisions_then_renders() {
    let harness = PortalHarness::new();
    harness.provider.add_user(
        "founder@acme.io",
        "hunter2",
        identity("u1", "founder@acme.io").with_metadata(METADATA_FULL_NAME, "Jane Founder"),
    );
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    wait_for(&mut rx, |s| !s.is_loading()).await;

    harness
        .manager
        .sign_in("founder@acme.io", "hunter2")
        .await
        .unwrap();
    let session = wait_for(&mut rx, |s| s.is_authenticated()).await;

    let portal = company_portal(&harness);
    let first = match portal.resolve_view(&session).await {
        CompanyView::Ready(company) => company,
        other => panic!("expected ready view, got {:?}", other),
    };
    assert_eq!(first.name, "Jane Founder");
    assert_eq!(harness.store.insert_attempts(), 1);

    // A later visit reuses the row without writing.
    match portal.resolve_view(&session).await {
        CompanyView::Ready(company) => assert_eq!(company.id, first.id),
        other => panic!("expected ready view, got {:?}", other),
    }
    assert_eq!(harness.store.insert_attempts(), 1);
}

#[tokio::test]
async fn provisioning_failure_is_distinct_from_loading() {
    let harness = PortalHarness::new();
    harness
        .provider
        .add_user("founder@acme.io", "hunter2", identity("u1", "founder@acme.io"));
    harness.store.set_fail_inserts(true);
    let mut rx = harness.manager.subscribe();
    harness.start().await;
    wait_for(&mut rx, |s| !s.is_loading()).await;

    harness
        .manager
        .sign_in("founder@acme.io", "hunter2")
        .await
        .unwrap();
    let session = wait_for(&mut rx, |s| s.is_authenticated()).await;

    let portal = company_portal(&harness);
    assert!(matches!(
        portal.resolve_view(&session).await,
        CompanyView::TenantFailed(_)
    ));
    // The session itself stays authenticated; only the tenant is missing.
    assert!(harness.manager.current().is_authenticated());
}
