//! Record store boundary.
//!
//! The core consumes exactly two tables: the `admin_emails` allowlist
//! (read-only) and `companies` (read + conditional insert, UNIQUE on
//! `user_id`). Everything else the portal persists belongs to the excluded
//! CRUD surface and never passes through here.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{AdminEmail, Company};

pub use memory::MemoryRecordStore;
pub use postgres::{create_pool, run_migrations, PgRecordStore};

/// Contract the core requires of the backing record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup in the admin allowlist. Email matching is
    /// case-insensitive exact.
    async fn find_admin_email(&self, email: &str) -> Result<Option<AdminEmail>, StoreError>;

    /// Company owned by `user_id`, expecting zero or one row.
    async fn find_company_by_user(&self, user_id: &str) -> Result<Option<Company>, StoreError>;

    /// Conditional insert. Must surface [`StoreError::UniqueViolation`]
    /// when a row for the same `user_id` already exists.
    async fn insert_company(&self, company: &Company) -> Result<(), StoreError>;
}
