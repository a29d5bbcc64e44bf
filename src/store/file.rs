use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::Records;
use super::{StoreError, Upserted, VerificationRecord, VerificationStore};

/// Records kept as a JSON array in a single file.
///
/// The file is read once on [`open`](Self::open) and rewritten after every
/// upsert through a uniquely named temporary file and a rename, so readers
/// never see a partial write. A failed write leaves the in-memory records
/// as they were.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Records,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Records::default(),
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|err| StoreError::json(&path, err))?
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Records::default(),
            Err(err) => return Err(StoreError::io(&path, err)),
        };
        Ok(Self { path, records })
    }

    fn persist(&self, records: &Records) -> Result<(), StoreError> {
        let data =
            serde_json::to_vec_pretty(records).map_err(|err| StoreError::json(&self.path, err))?;
        write_all_atomically(&self.path, &data).map_err(|err| StoreError::io(&self.path, err))
    }
}

impl VerificationStore for JsonFileStore {
    fn upsert(
        &mut self,
        email: &str,
        is_valid: bool,
        verified_at: DateTime<Utc>,
    ) -> Result<Upserted, StoreError> {
        // memory only changes once the file does
        let mut records = self.records.clone();
        let upserted = records.upsert(email, is_valid, verified_at);
        self.persist(&records)?;
        self.records = records;
        Ok(upserted)
    }

    fn get(&self, email: &str) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self.records.get(email))
    }

    fn recent(&self, limit: usize) -> Result<Vec<VerificationRecord>, StoreError> {
        Ok(self.records.recent(limit))
    }
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let written = fs::File::create(&tmp).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    let renamed = written.and_then(|()| fs::rename(&tmp, path));
    if renamed.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    renamed
}
