// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Persistent entry store on sled
//!
//! Entries live in the `emotional_entries` tree keyed by a big-endian
//! sequence number from `Db::generate_id`, so key order is insertion order.
//! Values are JSON-encoded [`EmotionalEntry`] records.
//!
//! Every mutation is flushed before it returns, so an acknowledged ingest or
//! erasure survives a crash.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::entry::EmotionalEntry;
use crate::domain::identity::HashedUserId;
use crate::domain::repository::{EntryRepository, RepositoryError};

const ENTRIES_TREE: &str = "emotional_entries";

impl From<sled::Error> for RepositoryError {
    fn from(err: sled::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

pub struct SledEntryRepository {
    db: sled::Db,
    entries: sled::Tree,
    // Serializes erase passes against each other
    erase_lock: Mutex<()>,
}

impl SledEntryRepository {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Opened sled entry store");
        Self::from_db(db)
    }

    /// Throwaway database removed on drop
    pub fn temporary() -> Result<Self, RepositoryError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, RepositoryError> {
        let entries = db.open_tree(ENTRIES_TREE)?;
        Ok(Self {
            db,
            entries,
            erase_lock: Mutex::new(()),
        })
    }

    fn decode(value: &[u8]) -> Result<EmotionalEntry, RepositoryError> {
        Ok(serde_json::from_slice(value)?)
    }
}

#[async_trait]
impl EntryRepository for SledEntryRepository {
    async fn append(&self, entry: EmotionalEntry) -> Result<(), RepositoryError> {
        let sequence = self.db.generate_id()?;
        let value = serde_json::to_vec(&entry)?;
        self.entries.insert(sequence.to_be_bytes(), value)?;
        self.db.flush_async().await?;
        debug!(sequence, cohort_id = %entry.cohort_id, "Appended entry");
        Ok(())
    }

    async fn all_entries(&self, cohort_id: Option<&str>) -> Result<Vec<EmotionalEntry>, RepositoryError> {
        let mut result = Vec::new();
        for item in self.entries.iter() {
            let (_, value) = item?;
            let entry = Self::decode(&value)?;
            if cohort_id.map_or(true, |cohort| entry.cohort_id == cohort) {
                result.push(entry);
            }
        }
        Ok(result)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.entries.len())
    }

    async fn erase_identity(&self, user_id_hash: &HashedUserId) -> Result<usize, RepositoryError> {
        let _guard = self.erase_lock.lock().await;
        let mut affected = 0;
        for item in self.entries.iter() {
            let (key, value) = item?;
            let mut entry = Self::decode(&value)?;
            if entry.user_id_hash.as_ref() == Some(user_id_hash) {
                entry.user_id_hash = None;
                self.entries.insert(key, serde_json::to_vec(&entry)?)?;
                affected += 1;
            }
        }
        if affected > 0 {
            self.db.flush_async().await?;
        }
        Ok(affected)
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::Embedding;
    use crate::domain::entry::EntryMetadata;
    use crate::domain::identity::IdentityHasher;

    fn entry(cohort: &str, user: &HashedUserId, text: &str) -> EmotionalEntry {
        EmotionalEntry::new(
            cohort.to_string(),
            user.clone(),
            text,
            50,
            Embedding::new(vec![0.6, 0.8, 0.0]).unwrap(),
            EntryMetadata {
                mood_label: Some("Anxious".to_string()),
                mode: None,
            },
        )
    }

    #[tokio::test]
    async fn test_entries_survive_reopen_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let user = IdentityHasher::new("v1", "salt").unwrap().rehash("caller");

        {
            let repo = SledEntryRepository::open(dir.path()).unwrap();
            for i in 0..12 {
                repo.append(entry("Arts_2024", &user, &format!("entry {}", i)))
                    .await
                    .unwrap();
            }
            repo.flush().await.unwrap();
        }

        let repo = SledEntryRepository::open(dir.path()).unwrap();
        let all = repo.all_entries(None).await.unwrap();
        assert_eq!(all.len(), 12);
        for (i, stored) in all.iter().enumerate() {
            assert_eq!(stored.text_preview, format!("entry {}", i));
        }
        assert_eq!(all[0].metadata.mood_label.as_deref(), Some("Anxious"));
        assert_eq!(all[0].embedding.as_slice(), &[0.6, 0.8, 0.0]);
    }

    #[tokio::test]
    async fn test_append_is_durable_without_explicit_flush() {
        let dir = tempfile::tempdir().unwrap();
        let hasher = IdentityHasher::new("v1", "salt").unwrap();
        let user = hasher.rehash("caller");

        {
            let repo = SledEntryRepository::open(dir.path()).unwrap();
            repo.append(entry("Arts_2024", &user, "first")).await.unwrap();
            repo.append(entry("Arts_2024", &user, "second")).await.unwrap();
            // Nothing left buffered once append has returned.
            assert_eq!(repo.db.flush().unwrap(), 0);
            assert_eq!(repo.erase_identity(&user).await.unwrap(), 2);
            assert_eq!(repo.db.flush().unwrap(), 0);
        }

        let repo = SledEntryRepository::open(dir.path()).unwrap();
        let all = repo.all_entries(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].text_preview, "second");
        assert!(all.iter().all(|stored| stored.is_erased()));
    }

    #[tokio::test]
    async fn test_erase_identity_persists() {
        let repo = SledEntryRepository::temporary().unwrap();
        let hasher = IdentityHasher::new("v1", "salt").unwrap();
        let alice = hasher.rehash("alice");
        let bob = hasher.rehash("bob");

        repo.append(entry("Engineering_2024", &alice, "a")).await.unwrap();
        repo.append(entry("Arts_2024", &bob, "b")).await.unwrap();

        assert_eq!(repo.erase_identity(&alice).await.unwrap(), 1);
        let engineering = repo.all_entries(Some("Engineering_2024")).await.unwrap();
        assert_eq!(engineering.len(), 1);
        assert!(engineering[0].is_erased());
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
