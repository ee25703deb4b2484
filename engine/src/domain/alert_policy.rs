// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Cohort Alert Policy
//!
//! Maps an [`EmotionProfile`] to an [`AlertLevel`]. The policy is a pure
//! function of the profile and sits behind a trait so thresholds and weights
//! can change without touching aggregation.
//!
//! ## Weighted Severity
//!
//! 1. Take the `top_n` (default 3) highest anchor scores of the profile.
//! 2. Weight each one: crisis, burnout, anxiety and overwhelm use
//!    `elevated_weight` (1.5); anger, sadness and loneliness use
//!    `baseline_weight` (1.0).
//! 3. Severity = `sum(w * s) / sum(w)` over those anchors.
//! 4. `>= urgent` URGENT, `>= warning` WARNING, `>= monitor` MONITOR, else STABLE.

use crate::domain::config::AlertingConfig;
use crate::domain::report::{AlertLevel, EmotionProfile};

pub trait AlertPolicy: Send + Sync {
    fn assess(&self, profile: &EmotionProfile) -> AlertLevel;

    /// Highest score threshold the policy alerts on. The crisis threshold must
    /// never be lower than this.
    fn max_threshold(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSeverityPolicy {
    pub elevated_weight: f64,
    pub baseline_weight: f64,
    pub top_n: usize,
    pub urgent: f64,
    pub warning: f64,
    pub monitor: f64,
}

impl WeightedSeverityPolicy {
    pub fn from_config(config: &AlertingConfig) -> Self {
        Self {
            elevated_weight: config.elevated_weight,
            baseline_weight: config.baseline_weight,
            top_n: config.top_n,
            urgent: config.urgent,
            warning: config.warning,
            monitor: config.monitor,
        }
    }

    pub fn severity_score(&self, profile: &EmotionProfile) -> f64 {
        let (weighted_sum, weight_total) = profile.top(self.top_n).into_iter().fold(
            (0.0, 0.0),
            |(sum, total), (name, score)| {
                let weight = if name.is_elevated() {
                    self.elevated_weight
                } else {
                    self.baseline_weight
                };
                (sum + weight * score, total + weight)
            },
        );

        if weight_total == 0.0 {
            return 0.0;
        }
        weighted_sum / weight_total
    }

    pub fn level_for(&self, severity: f64) -> AlertLevel {
        if severity >= self.urgent {
            AlertLevel::Urgent
        } else if severity >= self.warning {
            AlertLevel::Warning
        } else if severity >= self.monitor {
            AlertLevel::Monitor
        } else {
            AlertLevel::Stable
        }
    }
}

impl Default for WeightedSeverityPolicy {
    fn default() -> Self {
        Self::from_config(&AlertingConfig::default())
    }
}

impl AlertPolicy for WeightedSeverityPolicy {
    fn assess(&self, profile: &EmotionProfile) -> AlertLevel {
        self.level_for(self.severity_score(profile))
    }

    fn max_threshold(&self) -> f64 {
        self.urgent.max(self.warning).max(self.monitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::anchor::EmotionName;
    use std::collections::BTreeMap;

    fn profile(scores: &[(EmotionName, f64)]) -> EmotionProfile {
        EmotionProfile::new(scores.iter().copied().collect::<BTreeMap<_, _>>())
    }

    #[test]
    fn test_severity_weights_elevated_anchors() {
        let policy = WeightedSeverityPolicy::default();
        // top 3: burnout 0.9 (1.5), anger 0.6 (1.0), sadness 0.3 (1.0)
        let p = profile(&[
            (EmotionName::Burnout, 0.9),
            (EmotionName::Anger, 0.6),
            (EmotionName::Sadness, 0.3),
            (EmotionName::Loneliness, 0.1),
        ]);
        let expected = (1.5 * 0.9 + 0.6 + 0.3) / 3.5;
        assert!((policy.severity_score(&p) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_level_thresholds() {
        let policy = WeightedSeverityPolicy::default();
        assert_eq!(policy.level_for(0.85), AlertLevel::Urgent);
        assert_eq!(policy.level_for(0.8499), AlertLevel::Warning);
        assert_eq!(policy.level_for(0.70), AlertLevel::Warning);
        assert_eq!(policy.level_for(0.55), AlertLevel::Monitor);
        assert_eq!(policy.level_for(0.5499), AlertLevel::Stable);
        assert_eq!(policy.level_for(-0.2), AlertLevel::Stable);
    }

    #[test]
    fn test_uniform_profile_maps_directly() {
        let policy = WeightedSeverityPolicy::default();
        let p = profile(&EmotionName::ALL.map(|n| (n, 0.72)));
        assert!((policy.severity_score(&p) - 0.72).abs() < 1e-12);
        assert_eq!(policy.assess(&p), AlertLevel::Warning);
    }

    #[test]
    fn test_empty_profile_is_stable() {
        let policy = WeightedSeverityPolicy::default();
        assert_eq!(policy.assess(&EmotionProfile::default()), AlertLevel::Stable);
    }

    #[test]
    fn test_max_threshold_is_urgent_by_default() {
        assert_eq!(WeightedSeverityPolicy::default().max_threshold(), 0.85);
    }
}
