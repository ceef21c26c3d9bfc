//! Typed records at the core's boundary.
//!
//! The backing store hands back loosely shaped rows; everything the core
//! touches is narrowed into these types on read.

mod admin_email;
mod company;
mod identity;
mod session;

pub use admin_email::AdminEmail;
pub use company::Company;
pub use identity::{Identity, METADATA_FULL_NAME};
pub use session::{Role, Session};
