// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Cohort health aggregation.
//!
//! For one cohort, the profile holds the arithmetic mean similarity of the
//! cohort's entries to every anchor. The dominant emotion and alert level are
//! derived from that profile; the alert decision itself is delegated to an
//! [`AlertPolicy`] so it can be swapped without touching aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::alert_policy::AlertPolicy;
use crate::domain::anchor::AnchorSet;
use crate::domain::entry::EmotionalEntry;
use crate::domain::error::EngineError;
use crate::domain::report::{CohortHealthReport, EmotionProfile};
use crate::domain::repository::EntryRepository;

/// Mean anchor similarity over `entries`. Empty input yields an empty profile.
pub fn emotion_profile(
    entries: &[EmotionalEntry],
    anchors: &AnchorSet,
) -> Result<EmotionProfile, EngineError> {
    if entries.is_empty() {
        return Ok(EmotionProfile::default());
    }

    let count = entries.len() as f64;
    let mut scores = BTreeMap::new();
    for anchor in anchors.iter() {
        let mut total = 0.0;
        for entry in entries {
            total += entry.similarity_to(&anchor.embedding)?;
        }
        scores.insert(anchor.name, total / count);
    }

    Ok(EmotionProfile::new(scores))
}

pub struct CohortHealthAnalyzer {
    repository: Arc<dyn EntryRepository>,
    anchors: Arc<AnchorSet>,
    policy: Arc<dyn AlertPolicy>,
}

impl CohortHealthAnalyzer {
    pub fn new(
        repository: Arc<dyn EntryRepository>,
        anchors: Arc<AnchorSet>,
        policy: Arc<dyn AlertPolicy>,
    ) -> Self {
        Self {
            repository,
            anchors,
            policy,
        }
    }

    pub async fn analyze(&self, cohort_id: &str) -> Result<CohortHealthReport, EngineError> {
        let entries = self.repository.all_entries(Some(cohort_id)).await?;
        if entries.is_empty() {
            return Err(EngineError::EmptyCohort(cohort_id.to_string()));
        }

        let profile = emotion_profile(&entries, &self.anchors)?;
        let dominant_emotion = profile
            .dominant()
            .ok_or_else(|| EngineError::EmptyCohort(cohort_id.to_string()))?;
        let alert_level = self.policy.assess(&profile);

        Ok(CohortHealthReport {
            cohort_id: cohort_id.to_string(),
            total_entries: entries.len(),
            dominant_emotion,
            alert_level,
            emotion_profile: profile,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert_policy::WeightedSeverityPolicy;
    use crate::domain::anchor::{EmotionAnchor, EmotionName};
    use crate::domain::embedding::Embedding;
    use crate::domain::entry::EntryMetadata;
    use crate::domain::identity::IdentityHasher;
    use crate::domain::report::AlertLevel;
    use crate::infrastructure::InMemoryEntryRepository;

    const DIM: usize = 8;

    fn axis(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; DIM];
        v[i] = 1.0;
        v
    }

    fn anchors() -> AnchorSet {
        AnchorSet::new(
            EmotionName::ALL
                .iter()
                .enumerate()
                .map(|(i, name)| EmotionAnchor {
                    name: *name,
                    reference_text: name.reference_text().to_string(),
                    embedding: Embedding::new(axis(i)).unwrap(),
                })
                .collect(),
        )
        .unwrap()
    }

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

    fn analyzer(repo: Arc<InMemoryEntryRepository>) -> CohortHealthAnalyzer {
        CohortHealthAnalyzer::new(
            repo,
            Arc::new(anchors()),
            Arc::new(WeightedSeverityPolicy::default()),
        )
    }

    #[tokio::test]
    async fn test_empty_cohort_fails() {
        let analyzer = analyzer(Arc::new(InMemoryEntryRepository::new()));
        let err = analyzer.analyze("Law_2024").await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyCohort(cohort) if cohort == "Law_2024"));
    }

    #[tokio::test]
    async fn test_profile_is_mean_over_cohort_only() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        // burnout is axis 3, anger axis 0
        repo.append(entry("Engineering_2024", axis(3))).await.unwrap();
        let mut mixed = vec![0.0; DIM];
        mixed[3] = 1.0;
        mixed[0] = 1.0;
        repo.append(entry("Engineering_2024", mixed)).await.unwrap();
        repo.append(entry("Arts_2024", axis(0))).await.unwrap();

        let report = analyzer(repo).analyze("Engineering_2024").await.unwrap();
        assert_eq!(report.total_entries, 2);
        assert_eq!(report.dominant_emotion, EmotionName::Burnout);

        let expected_burnout = (1.0 + 1.0 / 2f64.sqrt()) / 2.0;
        let burnout = report.emotion_profile.get(EmotionName::Burnout).unwrap();
        assert!((burnout - expected_burnout).abs() < 1e-9);
        assert_eq!(report.emotion_profile.get(EmotionName::Crisis), Some(0.0));
        assert_eq!(report.emotion_profile.len(), 7);
    }

    #[tokio::test]
    async fn test_tie_goes_to_higher_priority_anchor() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        // equal similarity to sadness (1) and anxiety (2)
        let mut v = vec![0.0; DIM];
        v[1] = 1.0;
        v[2] = 1.0;
        repo.append(entry("Arts_2024", v)).await.unwrap();

        let report = analyzer(repo).analyze("Arts_2024").await.unwrap();
        assert_eq!(report.dominant_emotion, EmotionName::Anxiety);
    }

    #[tokio::test]
    async fn test_alert_level_comes_from_policy() {
        let repo = Arc::new(InMemoryEntryRepository::new());
        // crisis (6), burnout (3), anxiety (2) all elevated; sits near 0.577
        let mut v = vec![0.0; DIM];
        v[6] = 1.0;
        v[3] = 1.0;
        v[2] = 1.0;
        repo.append(entry("Engineering_2024", v)).await.unwrap();

        let report = analyzer(repo).analyze("Engineering_2024").await.unwrap();
        assert_eq!(report.alert_level, AlertLevel::Monitor);
        assert_eq!(report.dominant_emotion, EmotionName::Crisis);
    }
}
