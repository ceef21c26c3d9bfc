//! Route guards for the two protected portals.
//!
//! Guards are pure: they consume a session snapshot and return a decision
//! for the route tree to act on. Redirects are declarative and only issued
//! once the session has settled to `Anonymous` or `Authenticated` - never
//! from `Init` or `Loading`, so no protected content (nor a flash of it)
//! renders before identity and role are resolved.

use crate::config::SessionConfig;
use crate::error::ProvisioningError;
use crate::models::{Company, Role, Session};
use crate::services::TenantProvisioner;

/// Role a guarded portal requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Admin portal: allowlisted administrators only.
    Admin,
    /// Company portal: any authenticated user.
    AnyAuthenticated,
}

/// What the route tree should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Identity still resolving: render a neutral loading indicator and
    /// nothing of the protected subtree.
    Loading,
    Redirect(String),
    Render,
}

/// Role-parameterized guard for a protected route tree.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: RequiredRole,
    sign_in_route: String,
    fallback_route: String,
}

impl RouteGuard {
    pub fn new(
        required: RequiredRole,
        sign_in_route: impl Into<String>,
        fallback_route: impl Into<String>,
    ) -> Self {
        Self {
            required,
            sign_in_route: sign_in_route.into(),
            fallback_route: fallback_route.into(),
        }
    }

    /// Guard for the admin portal: anonymous visitors go to the admin
    /// sign-in page, authenticated non-admins to the public landing page.
    pub fn admin_portal(config: &SessionConfig) -> Self {
        Self::new(
            RequiredRole::Admin,
            config.routes.admin_sign_in.clone(),
            config.routes.landing.clone(),
        )
    }

    /// Guard for the company portal.
    pub fn company_portal(config: &SessionConfig) -> Self {
        Self::new(
            RequiredRole::AnyAuthenticated,
            config.routes.company_sign_in.clone(),
            config.routes.landing.clone(),
        )
    }

    pub fn decide(&self, session: &Session) -> RouteDecision {
        match session {
            Session::Init | Session::Loading => RouteDecision::Loading,
            Session::Anonymous => RouteDecision::Redirect(self.sign_in_route.clone()),
            Session::Authenticated { role, .. } => match (self.required, role) {
                (RequiredRole::Admin, Role::Admin) => RouteDecision::Render,
                (RequiredRole::Admin, Role::Tenant) => {
                    RouteDecision::Redirect(self.fallback_route.clone())
                }
                (RequiredRole::AnyAuthenticated, _) => RouteDecision::Render,
            },
        }
    }
}

/// View state for company-portal screens that expect a tenant context.
///
/// `TenantFailed` is distinct from `Loading` on purpose: a provisioning
/// failure leaves the session authenticated but tenant-less, and the
/// screen must offer a retry instead of pretending the user has no data.
#[derive(Debug)]
pub enum CompanyView {
    Loading,
    Redirect(String),
    TenantFailed(ProvisioningError),
    Ready(Company),
}

/// Company portal: the company guard composed with tenant provisioning.
/// Children that expect a tenant context render only from `Ready`.
#[derive(Clone)]
pub struct CompanyPortal {
    guard: RouteGuard,
    provisioner: TenantProvisioner,
}

impl CompanyPortal {
    pub fn new(provisioner: TenantProvisioner, config: &SessionConfig) -> Self {
        Self {
            guard: RouteGuard::company_portal(config),
            provisioner,
        }
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Decide the view for the current session, provisioning the tenant
    /// when the guard admits an authenticated user.
    pub async fn resolve_view(&self, session: &Session) -> CompanyView {
        let identity = match (self.guard.decide(session), session) {
            (RouteDecision::Loading, _) => return CompanyView::Loading,
            (RouteDecision::Redirect(route), _) => return CompanyView::Redirect(route),
            (RouteDecision::Render, Session::Authenticated { identity, .. }) => identity,
            // The guard renders only authenticated sessions.
            (RouteDecision::Render, _) => return CompanyView::Loading,
        };

        match self.provisioner.get_or_create(identity).await {
            Ok(company) => CompanyView::Ready(company),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id = %identity.id,
                    "Company provisioning failed; session stays authenticated without a tenant"
                );
                CompanyView::TenantFailed(e)
            }
        }
    }
}
