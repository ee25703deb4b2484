// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Similarity Search
//!
//! Linear cosine ranking over stored entries. The entry population is bounded
//! (thousands), so no index is kept.
//!
//! [`rank`] is the core: score every candidate, keep those with
//! `score >= threshold`, order by score descending with earlier entries
//! winning ties, then keep the `top_k` best. Because filtering happens before
//! truncation and the order is total, raising the threshold can only remove
//! results.
//!
//! [`SimilaritySearch`] wraps `rank` for the public search paths and projects
//! every hit onto [`EmotionMatch`], which carries neither identity nor text.

use std::sync::Arc;

use crate::domain::embedding::Embedding;
use crate::domain::entry::EmotionalEntry;
use crate::domain::error::EngineError;
use crate::domain::report::EmotionMatch;
use crate::domain::repository::EntryRepository;

/// Score, filter, order and truncate `candidates` against `query`.
///
/// Fails if any candidate's dimension differs from the query's.
pub fn rank<'a>(
    query: &Embedding,
    candidates: &'a [EmotionalEntry],
    threshold: f64,
    top_k: usize,
) -> Result<Vec<(&'a EmotionalEntry, f64)>, EngineError> {
    let mut scored = Vec::new();
    for entry in candidates {
        let score = entry.similarity_to(query)?;
        if score >= threshold {
            scored.push((entry, score));
        }
    }

    // sort_by is stable: equal scores keep insertion order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);
    Ok(scored)
}

pub fn validate_search_bounds(threshold: f64, top_k: usize) -> Result<(), EngineError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EngineError::InvalidInput(format!(
            "threshold must be in [0, 1], got {}",
            threshold
        )));
    }
    if top_k == 0 {
        return Err(EngineError::InvalidInput("top_k must be greater than 0".to_string()));
    }
    Ok(())
}

pub struct SimilaritySearch {
    repository: Arc<dyn EntryRepository>,
}

impl SimilaritySearch {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self { repository }
    }

    /// Rank every stored entry against `query` and return the restricted
    /// projection.
    pub async fn search_by_vector(
        &self,
        query: &Embedding,
        threshold: f64,
        top_k: usize,
    ) -> Result<Vec<EmotionMatch>, EngineError> {
        validate_search_bounds(threshold, top_k)?;

        let entries = self.repository.all_entries(None).await?;
        Ok(rank(query, &entries, threshold, top_k)?
            .into_iter()
            .map(|(entry, score)| EmotionMatch::new(entry.cohort_id.clone(), score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::EntryMetadata;
    use crate::domain::identity::IdentityHasher;
    use crate::infrastructure::InMemoryEntryRepository;

    fn entry(cohort: &str, values: Vec<f32>) -> EmotionalEntry {
        let user = IdentityHasher::new("v1", "salt").unwrap().rehash("caller");
        EmotionalEntry::new(
            cohort.to_string(),
            user,
            "text",
            50,
            Embedding::new(values).unwrap(),
            EntryMetadata::default(),
        )
    }

    #[test]
    fn test_rank_orders_filters_and_truncates() {
        let query = Embedding::new(vec![1.0, 0.0]).unwrap();
        let candidates = vec![
            entry("a", vec![0.0, 1.0]), // 0.0
            entry("b", vec![1.0, 0.0]), // 1.0
            entry("c", vec![1.0, 1.0]), // ~0.707
            entry("d", vec![-1.0, 0.0]), // -1.0
        ];

        let ranked = rank(&query, &candidates, 0.5, 10).unwrap();
        let cohorts: Vec<_> = ranked.iter().map(|(e, _)| e.cohort_id.as_str()).collect();
        assert_eq!(cohorts, vec!["b", "c"]);

        let top_one = rank(&query, &candidates, -1.0, 1).unwrap();
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].0.cohort_id, "b");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let query = Embedding::new(vec![1.0, 0.0]).unwrap();
        let candidates = vec![
            entry("first", vec![2.0, 0.0]),
            entry("second", vec![3.0, 0.0]),
            entry("third", vec![0.5, 0.0]),
        ];
        let ranked = rank(&query, &candidates, 0.0, 2).unwrap();
        let cohorts: Vec<_> = ranked.iter().map(|(e, _)| e.cohort_id.as_str()).collect();
        assert_eq!(cohorts, vec!["first", "second"]);
    }

    #[test]
    fn test_zero_norm_candidate_scores_zero() {
        let query = Embedding::new(vec![1.0, 0.0]).unwrap();
        let candidates = vec![entry("zero", vec![0.0, 0.0])];
        let ranked = rank(&query, &candidates, 0.0, 5).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].1, 0.0);
    }

    #[test]
    fn test_rank_refuses_mixed_dimensions() {
        let query = Embedding::new(vec![1.0, 0.0]).unwrap();
        let candidates = vec![
            entry("ok", vec![1.0, 0.0]),
            entry("wider", vec![1.0, 0.0, 0.0, 0.0]),
        ];
        assert!(matches!(
            rank(&query, &candidates, 0.0, 5),
            Err(EngineError::Repository(_))
        ));
    }

    #[test]
    fn test_search_bounds() {
        assert!(validate_search_bounds(0.0, 1).is_ok());
        assert!(validate_search_bounds(1.0, 1).is_ok());
        assert!(validate_search_bounds(1.01, 1).is_err());
        assert!(validate_search_bounds(-0.1, 1).is_err());
        assert!(validate_search_bounds(f64::NAN, 1).is_err());
        assert!(validate_search_bounds(0.5, 0).is_err());
    }

    #[tokio::test]
    async fn test_search_by_vector_projects_matches() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        repo.append(entry("Arts_2024", vec![1.0, 0.0])).await.unwrap();
        repo.append(entry("Engineering_2024", vec![0.6, 0.8])).await.unwrap();

        let search = SimilaritySearch::new(repo);
        let query = Embedding::new(vec![1.0, 0.0]).unwrap();
        let matches = search.search_by_vector(&query, 0.5, 10).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].cohort_id, "Arts_2024");
        assert_eq!(matches[0].risk_level, crate::domain::RiskLevel::Critical);
        assert_eq!(matches[1].risk_level, crate::domain::RiskLevel::Moderate);
    }
}
