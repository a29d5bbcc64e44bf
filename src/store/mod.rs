//! Persistence of verification verdicts, one record per address.
//!
//! Upserting an address that already has a record keeps its `id` and replaces
//! the verdict and timestamp.

mod error;
mod file;
mod memory;
mod types;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use types::{Upserted, VerificationRecord};

use chrono::{DateTime, Utc};

pub trait VerificationStore {
    fn upsert(
        &mut self,
        email: &str,
        is_valid: bool,
        verified_at: DateTime<Utc>,
    ) -> Result<Upserted, StoreError>;

    fn get(&self, email: &str) -> Result<Option<VerificationRecord>, StoreError>;

    /// Up to `limit` records, most recently verified first.
    fn recent(&self, limit: usize) -> Result<Vec<VerificationRecord>, StoreError>;
}
