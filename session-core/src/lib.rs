//! Session and tenant-access core for the PlaceHub campus-recruitment
//! portal.
//!
//! Resolves who the current caller is, whether they are a platform
//! administrator or a company-tenant user, guarantees exactly one backing
//! company record per tenant user (created lazily, race-safe), and gates
//! the protected portals so nothing protected renders before identity and
//! role settle.
//!
//! The two external collaborators - the identity provider and the record
//! store - are trait seams; Postgres and in-memory store implementations
//! and a scriptable identity provider ship with the crate.

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod services;
pub mod store;

pub use config::{DatabaseConfig, SessionConfig};
pub use error::{AuthError, ConfigError, ProvisioningError, ResolutionError, StoreError};
pub use guard::{CompanyPortal, CompanyView, RequiredRole, RouteDecision, RouteGuard};
pub use identity::{AuthEvent, IdentityProvider, MockIdentityProvider, OAuthProvider};
pub use models::{AdminEmail, Company, Identity, Role, Session, METADATA_FULL_NAME};
pub use services::{AdminRoleResolver, SessionManager, TenantProvisioner};
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore};
