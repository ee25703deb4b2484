// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! In-memory entry store
//! Default backend; contents are lost when the process exits

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entry::EmotionalEntry;
use crate::domain::identity::HashedUserId;
use crate::domain::repository::{EntryRepository, RepositoryError};

#[derive(Clone, Default)]
pub struct InMemoryEntryRepository {
    entries: Arc<RwLock<Vec<EmotionalEntry>>>,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    async fn append(&self, entry: EmotionalEntry) -> Result<(), RepositoryError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn all_entries(&self, cohort_id: Option<&str>) -> Result<Vec<EmotionalEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| cohort_id.map_or(true, |cohort| entry.cohort_id == cohort))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.entries.read().await.len())
    }

    async fn erase_identity(&self, user_id_hash: &HashedUserId) -> Result<usize, RepositoryError> {
        let mut entries = self.entries.write().await;
        let mut affected = 0;
        for entry in entries.iter_mut() {
            if entry.user_id_hash.as_ref() == Some(user_id_hash) {
                entry.user_id_hash = None;
                affected += 1;
            }
        }
        Ok(affected)
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
            Embedding::new(vec![1.0, 0.0]).unwrap(),
            EntryMetadata::default(),
        )
    }

    #[tokio::test]
    async fn test_insertion_order_and_cohort_filter() {
        let hasher = IdentityHasher::new("v1", "salt").unwrap();
        let alice = hasher.rehash("aaaa");
        let repo = InMemoryEntryRepository::new();

        repo.append(entry("Arts_2024", &alice, "first")).await.unwrap();
        repo.append(entry("Engineering_2024", &alice, "second")).await.unwrap();
        repo.append(entry("Arts_2024", &alice, "third")).await.unwrap();

        let all = repo.all_entries(None).await.unwrap();
        let previews: Vec<_> = all.iter().map(|e| e.text_preview.as_str()).collect();
        assert_eq!(previews, vec!["first", "second", "third"]);

        let arts = repo.all_entries(Some("Arts_2024")).await.unwrap();
        assert_eq!(arts.len(), 2);
        assert!(repo.all_entries(Some("Law_2024")).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_erase_identity_keeps_entries() {
        let hasher = IdentityHasher::new("v1", "salt").unwrap();
        let alice = hasher.rehash("aaaa");
        let bob = hasher.rehash("bbbb");
        let repo = InMemoryEntryRepository::new();

        repo.append(entry("Arts_2024", &alice, "one")).await.unwrap();
        repo.append(entry("Arts_2024", &bob, "two")).await.unwrap();
        repo.append(entry("Arts_2024", &alice, "three")).await.unwrap();

        assert_eq!(repo.erase_identity(&alice).await.unwrap(), 2);
        assert_eq!(repo.erase_identity(&alice).await.unwrap(), 0);

        let all = repo.all_entries(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].is_erased());
        assert_eq!(all[1].user_id_hash.as_ref(), Some(&bob));
    }
}
