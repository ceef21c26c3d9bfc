//! In-memory session snapshot, derived from the identity provider and the
//! admin allowlist on every change notification. Never persisted.

use serde::{Deserialize, Serialize};

use super::Identity;

/// Role attached to an authenticated session.
///
/// Admin status is a platform-level grant (the allowlist table), resolved
/// out of band from the identity provider's own claims so that federated
/// login metadata is never trusted for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tenant,
}

/// Session state machine.
///
/// `Init` before the change stream is subscribed, `Loading` until the first
/// notification settles, then `Anonymous` or `Authenticated`. Guards treat
/// `Init` and `Loading` identically: render nothing protected.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Init,
    Loading,
    Anonymous,
    Authenticated { identity: Identity, role: Role },
}

impl Session {
    /// True in `Init` and `Loading`.
    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Init | Session::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// True only for an authenticated session carrying the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Session::Authenticated {
                role: Role::Admin,
                ..
            }
        )
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Authenticated { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Stable status label for logging.
    pub fn status(&self) -> &'static str {
        match self {
            Session::Init => "init",
            Session::Loading => "loading",
            Session::Anonymous => "anonymous",
            Session::Authenticated { .. } => "authenticated",
        }
    }
}
