//! Services layer: session lifecycle, role resolution, and tenant
//! provisioning.

mod provisioner;
mod resolver;
mod session;

pub use provisioner::TenantProvisioner;
pub use resolver::AdminRoleResolver;
pub use session::SessionManager;
