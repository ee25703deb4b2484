// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Emotion Anchors
//!
//! Seven fixed reference points in embedding space, one per canonical
//! emotional state. They are embedded once when the engine initializes and
//! never change afterwards.
//!
//! ## Priority
//!
//! When two anchors score the same, the one with higher intervention priority
//! wins: crisis > burnout > anxiety > overwhelm > anger > sadness > loneliness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::embedding::{Embedding, EmbeddingProvider};
use crate::domain::error::EngineError;

/// Names of the seven anchors. Declaration order is the canonical listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionName {
    Anger,
    Sadness,
    Anxiety,
    Burnout,
    Loneliness,
    Overwhelm,
    Crisis,
}

impl EmotionName {
    pub const ALL: [EmotionName; 7] = [
        EmotionName::Anger,
        EmotionName::Sadness,
        EmotionName::Anxiety,
        EmotionName::Burnout,
        EmotionName::Loneliness,
        EmotionName::Overwhelm,
        EmotionName::Crisis,
    ];

    /// Escalating intervention priority, highest first.
    pub const PRIORITY: [EmotionName; 7] = [
        EmotionName::Crisis,
        EmotionName::Burnout,
        EmotionName::Anxiety,
        EmotionName::Overwhelm,
        EmotionName::Anger,
        EmotionName::Sadness,
        EmotionName::Loneliness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionName::Anger => "anger",
            EmotionName::Sadness => "sadness",
            EmotionName::Anxiety => "anxiety",
            EmotionName::Burnout => "burnout",
            EmotionName::Loneliness => "loneliness",
            EmotionName::Overwhelm => "overwhelm",
            EmotionName::Crisis => "crisis",
        }
    }

    /// Position in [`EmotionName::PRIORITY`]; 0 is the most urgent.
    pub fn priority_rank(&self) -> usize {
        match self {
            EmotionName::Crisis => 0,
            EmotionName::Burnout => 1,
            EmotionName::Anxiety => 2,
            EmotionName::Overwhelm => 3,
            EmotionName::Anger => 4,
            EmotionName::Sadness => 5,
            EmotionName::Loneliness => 6,
        }
    }

    /// Anchors that carry the elevated severity weight.
    pub fn is_elevated(&self) -> bool {
        matches!(
            self,
            EmotionName::Crisis | EmotionName::Burnout | EmotionName::Anxiety | EmotionName::Overwhelm
        )
    }

    /// Canonical phrase embedded to produce the anchor vector.
    pub fn reference_text(&self) -> &'static str {
        match self {
            EmotionName::Anger => "I am furious, I want to scream, everything is unfair.",
            EmotionName::Sadness => "I feel empty, alone, and like I can't keep going.",
            EmotionName::Anxiety => "My heart is racing, I can't breathe, I'm going to fail.",
            EmotionName::Burnout => "I'm exhausted, nothing matters anymore, I can't do this.",
            EmotionName::Loneliness => "Nobody understands me, I'm completely isolated and invisible.",
            EmotionName::Overwhelm => "Everything is too much, I'm drowning in responsibilities.",
            EmotionName::Crisis => "I don't want to exist anymore, there's no way out of this pain.",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for EmotionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionName {
    type Err = EngineError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        EmotionName::ALL
            .into_iter()
            .find(|name| name.as_str() == needle)
            .ok_or_else(|| EngineError::UnknownAnchor(s.to_string()))
    }
}

/// One embedded anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionAnchor {
    pub name: EmotionName,
    pub reference_text: String,
    pub embedding: Embedding,
}

/// Public listing shape: names and phrases, never vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSummary {
    pub name: EmotionName,
    pub reference_text: String,
}

/// The complete, immutable set of seven anchors sharing one dimension.
///
/// # Invariants
///
/// - Exactly one anchor per [`EmotionName`].
/// - Every anchor embedding has the same dimension `D`.
#[derive(Debug, Clone)]
pub struct AnchorSet {
    anchors: Vec<EmotionAnchor>,
    dimension: usize,
}

impl AnchorSet {
    pub fn new(mut anchors: Vec<EmotionAnchor>) -> Result<Self, EngineError> {
        anchors.sort_by_key(|a| a.name);

        let names: Vec<EmotionName> = anchors.iter().map(|a| a.name).collect();
        if names != EmotionName::ALL {
            return Err(EngineError::InvalidInput(format!(
                "anchor set must contain each of the seven emotions exactly once, got {:?}",
                names
            )));
        }

        let dimension = anchors[0].embedding.dimension();
        if let Some(odd) = anchors.iter().find(|a| a.embedding.dimension() != dimension) {
            return Err(EngineError::InvalidInput(format!(
                "anchor '{}' has dimension {}, expected {}",
                odd.name,
                odd.embedding.dimension(),
                dimension
            )));
        }

        Ok(Self { anchors, dimension })
    }

    /// Embed all seven reference phrases with the given provider.
    pub async fn embed_with(provider: &dyn EmbeddingProvider) -> Result<Self, EngineError> {
        let mut anchors = Vec::with_capacity(EmotionName::ALL.len());
        for name in EmotionName::ALL {
            let embedding = provider.embed(name.reference_text()).await?;
            anchors.push(EmotionAnchor {
                name,
                reference_text: name.reference_text().to_string(),
                embedding,
            });
        }
        Self::new(anchors)
    }

    pub fn get(&self, name: EmotionName) -> &EmotionAnchor {
        &self.anchors[name.index()]
    }

    /// Look an anchor up by its (case-insensitive) name.
    pub fn resolve(&self, name: &str) -> Result<&EmotionAnchor, EngineError> {
        let name: EmotionName = name.parse()?;
        Ok(self.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmotionAnchor> {
        self.anchors.iter()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn summaries(&self) -> Vec<AnchorSummary> {
        self.anchors
            .iter()
            .map(|a| AnchorSummary {
                name: a.name,
                reference_text: a.reference_text.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_anchor(name: EmotionName, dim: usize) -> EmotionAnchor {
        let mut values = vec![0.0; dim];
        values[name.index() % dim] = 1.0;
        EmotionAnchor {
            name,
            reference_text: name.reference_text().to_string(),
            embedding: Embedding::new(values).unwrap(),
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Burnout".parse::<EmotionName>().unwrap(), EmotionName::Burnout);
        assert_eq!("  CRISIS ".parse::<EmotionName>().unwrap(), EmotionName::Crisis);
        assert!(matches!(
            "joy".parse::<EmotionName>(),
            Err(EngineError::UnknownAnchor(name)) if name == "joy"
        ));
    }

    #[test]
    fn test_priority_rank_matches_priority_table() {
        for (rank, name) in EmotionName::PRIORITY.iter().enumerate() {
            assert_eq!(name.priority_rank(), rank);
        }
    }

    #[test]
    fn test_anchor_set_requires_all_seven() {
        let anchors: Vec<_> = EmotionName::ALL[..6].iter().map(|n| unit_anchor(*n, 7)).collect();
        assert!(AnchorSet::new(anchors).is_err());
    }

    #[test]
    fn test_anchor_set_rejects_mixed_dimensions() {
        let mut anchors: Vec<_> = EmotionName::ALL.iter().map(|n| unit_anchor(*n, 7)).collect();
        anchors[3] = unit_anchor(EmotionName::Burnout, 8);
        assert!(matches!(AnchorSet::new(anchors), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_anchor_set_is_ordered_and_indexable() {
        let mut anchors: Vec<_> = EmotionName::ALL.iter().map(|n| unit_anchor(*n, 7)).collect();
        anchors.reverse();
        let set = AnchorSet::new(anchors).unwrap();

        assert_eq!(set.len(), 7);
        assert_eq!(set.dimension(), 7);
        for name in EmotionName::ALL {
            assert_eq!(set.get(name).name, name);
        }
        assert_eq!(set.resolve("anxiety").unwrap().name, EmotionName::Anxiety);
    }
}
