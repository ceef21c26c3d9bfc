//! In-memory record store for tests and local composition roots.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use super::RecordStore;
use crate::error::StoreError;
use crate::models::{AdminEmail, Company};

/// Scriptable [`RecordStore`] with the same unique-constraint semantics as
/// the Postgres adapter.
///
/// The barrier knob lines up concurrent company lookups so the
/// provisioning race is deterministic in tests: every armed lookup waits
/// until all parties have read, guaranteeing both callers see "no row"
/// before either inserts.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
    insert_attempts: AtomicUsize,
    unique_violations: AtomicUsize,
}

#[derive(Default)]
struct Inner {
    admin_emails: Vec<AdminEmail>,
    companies: Vec<Company>,
    fail_admin_lookups: bool,
    fail_company_lookups: bool,
    fail_inserts: bool,
    force_insert_conflict: bool,
    admin_lookup_delay: Option<std::time::Duration>,
    select_barrier: Option<(Arc<Barrier>, usize)>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_admin_email(&self, email: &str) {
        self.lock().admin_emails.push(AdminEmail::new(email));
    }

    pub fn add_company(&self, company: Company) {
        self.lock().companies.push(company);
    }

    pub fn companies(&self) -> Vec<Company> {
        self.lock().companies.clone()
    }

    pub fn company_count_for(&self, user_id: &str) -> usize {
        self.lock()
            .companies
            .iter()
            .filter(|c| c.user_id == user_id)
            .count()
    }

    /// Number of insert calls attempted, successful or not.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Number of inserts rejected by the uniqueness constraint.
    pub fn unique_violations(&self) -> usize {
        self.unique_violations.load(Ordering::SeqCst)
    }

    pub fn set_fail_admin_lookups(&self, fail: bool) {
        self.lock().fail_admin_lookups = fail;
    }

    pub fn set_fail_company_lookups(&self, fail: bool) {
        self.lock().fail_company_lookups = fail;
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.lock().fail_inserts = fail;
    }

    /// Make every insert report a uniqueness conflict without storing a
    /// row. Simulates the fatal double-conflict condition.
    pub fn set_force_insert_conflict(&self, force: bool) {
        self.lock().force_insert_conflict = force;
    }

    /// Stall admin allowlist lookups, for stale-resolution tests.
    pub fn set_admin_lookup_delay(&self, delay: std::time::Duration) {
        self.lock().admin_lookup_delay = Some(delay);
    }

    /// Arm a rendezvous for the next `parties` company lookups.
    pub fn arm_select_barrier(&self, parties: usize) {
        self.lock().select_barrier = Some((Arc::new(Barrier::new(parties)), parties));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store state poisoned")
    }

    async fn wait_at_barrier(&self) {
        let barrier = {
            let mut inner = self.lock();
            match inner.select_barrier.take() {
                Some((barrier, remaining)) => {
                    if remaining > 1 {
                        inner.select_barrier = Some((barrier.clone(), remaining - 1));
                    }
                    Some(barrier)
                }
                None => None,
            }
        };
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_admin_email(&self, email: &str) -> Result<Option<AdminEmail>, StoreError> {
        let delay = self.lock().admin_lookup_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.lock();
        if inner.fail_admin_lookups {
            return Err(StoreError::Unavailable("admin_emails offline".to_string()));
        }
        Ok(inner
            .admin_emails
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_company_by_user(&self, user_id: &str) -> Result<Option<Company>, StoreError> {
        let result = {
            let inner = self.lock();
            if inner.fail_company_lookups {
                return Err(StoreError::Unavailable("companies offline".to_string()));
            }
            inner
                .companies
                .iter()
                .find(|c| c.user_id == user_id)
                .cloned()
        };

        // Rendezvous after the read: armed callers hold their (possibly
        // already stale) result until every party has read.
        self.wait_at_barrier().await;
        Ok(result)
    }

    async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.lock();
        if inner.fail_inserts {
            return Err(StoreError::Unavailable("companies offline".to_string()));
        }
        if inner.force_insert_conflict || inner.companies.iter().any(|c| c.user_id == company.user_id)
        {
            self.unique_violations.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::UniqueViolation);
        }
        inner.companies.push(company.clone());
        Ok(())
    }
}
