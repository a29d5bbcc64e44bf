use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Last known verdict for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: Uuid,
    pub email: String,
    pub is_valid: bool,
    pub verified_at: DateTime<Utc>,
}

/// Result of [`VerificationStore::upsert`](super::VerificationStore::upsert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upserted {
    pub record: VerificationRecord,
    /// `false` when an existing record for the address was replaced.
    pub created: bool,
}

/// Record set shared by the store implementations, one entry per address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Records(Vec<VerificationRecord>);

impl Records {
    pub(crate) fn upsert(
        &mut self,
        email: &str,
        is_valid: bool,
        verified_at: DateTime<Utc>,
    ) -> Upserted {
        if let Some(existing) = self.0.iter_mut().find(|r| r.email == email) {
            existing.is_valid = is_valid;
            existing.verified_at = verified_at;
            return Upserted {
                record: existing.clone(),
                created: false,
            };
        }
        let record = VerificationRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_valid,
            verified_at,
        };
        self.0.push(record.clone());
        Upserted {
            record,
            created: true,
        }
    }

    pub(crate) fn get(&self, email: &str) -> Option<VerificationRecord> {
        self.0.iter().find(|r| r.email == email).cloned()
    }

    /// Newest first.
    pub(crate) fn recent(&self, limit: usize) -> Vec<VerificationRecord> {
        let mut records = self.0.clone();
        records.sort_by(|a, b| b.verified_at.cmp(&a.verified_at));
        records.truncate(limit);
        records
    }
}
