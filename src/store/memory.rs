use chrono::{DateTime, Utc};

use super::types::Records;
use super::{StoreError, Upserted, VerificationRecord, VerificationStore};

/// Process-local store; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Records,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VerificationStore for MemoryStore {
    fn upsert(
        &mut self,
        email: &str,
        is_valid: bool,
        verified_at: DateTime<Utc>,
    ) -> Result<Upserted, StoreError> {
        Ok(self.records.upsert(email, is_valid, verified_at))
    }

    fn get(&self, email: &str) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self.records.get(email))
    }

    fn recent(&self, limit: usize) -> Result<Vec<VerificationRecord>, StoreError> {
        Ok(self.records.recent(limit))
    }
}
