// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # EmotionEngine: Engine Facade
//!
//! The boundary contract consumed by the chat/voice client, the dashboard and
//! admin tooling. Every operation returns a restricted projection; stored
//! entries never leave the engine.
//!
//! ## Lifecycle
//!
//! `initialize` embeds the seven anchor phrases and pins the shared dimension
//! `D` (init → ready). `shutdown` flushes the store and publishes
//! [`EngineEvent::EngineShutdown`]; afterwards every operation fails with
//! [`EngineError::NotReady`].
//!
//! ## Thresholds
//!
//! | Setting | Default | Used by |
//! |---------|---------|---------|
//! | `thresholds.search_default` | 0.8 | emotion/phrase search when no threshold is given |
//! | `thresholds.search_top_k` | 10 | emotion/phrase search when no limit is given |
//! | `thresholds.crisis` | 0.9 | crisis check when no threshold is given |
//!
//! The crisis gate refuses any threshold below
//! `max(search_default, highest alert threshold)`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::cohort_health::CohortHealthAnalyzer;
use crate::application::crisis_gate::CrisisGate;
use crate::application::ingestion::IngestionService;
use crate::application::search::{validate_search_bounds, SimilaritySearch};
use crate::domain::alert_policy::{AlertPolicy, WeightedSeverityPolicy};
use crate::domain::anchor::{AnchorSet, AnchorSummary};
use crate::domain::config::EngineSpec;
use crate::domain::embedding::{Embedding, EmbeddingProvider};
use crate::domain::entry::{EntryId, IngestRequest};
use crate::domain::error::EngineError;
use crate::domain::events::EngineEvent;
use crate::domain::identity::IdentityHasher;
use crate::domain::report::{CohortHealthReport, CrisisFlag, EmotionMatch, EngineStats};
use crate::domain::repository::EntryRepository;
use crate::infrastructure::EventBus;

pub const DISTANCE_METRIC: &str = "cosine";

// Anchors are embedded one after another; initialization gets one timeout
// budget per anchor phrase.
const EMBED_ANCHOR_ATTEMPTS: u32 = 7;

/// EmotionEngine interface
#[async_trait]
pub trait EmotionEngine: Send + Sync {
    /// Embed, anonymize and store one disclosure
    async fn ingest(&self, request: IngestRequest) -> Result<EntryId, EngineError>;

    /// Rank all entries against a named anchor
    async fn search_by_emotion(
        &self,
        anchor_name: &str,
        threshold: Option<f64>,
        top_k: Option<usize>,
    ) -> Result<Vec<EmotionMatch>, EngineError>;

    /// Rank all entries against an arbitrary phrase (embedded once)
    async fn search_by_phrase(
        &self,
        phrase: &str,
        threshold: Option<f64>,
        top_k: Option<usize>,
    ) -> Result<Vec<EmotionMatch>, EngineError>;

    async fn cohort_health(&self, cohort_id: &str) -> Result<CohortHealthReport, EngineError>;

    /// Admin-only de-masking path
    async fn crisis_check(&self, threshold: Option<f64>) -> Result<Vec<CrisisFlag>, EngineError>;

    async fn stats(&self) -> Result<EngineStats, EngineError>;

    /// Remove identity linkage for a caller-stage hash; returns entries affected
    async fn erase_identity(&self, caller_user_hash: &str) -> Result<usize, EngineError>;

    fn anchors(&self) -> Vec<AnchorSummary>;

    fn is_ready(&self) -> bool;

    async fn shutdown(&self) -> Result<(), EngineError>;
}

/// Standard implementation of EmotionEngine
pub struct StandardEmotionEngine {
    anchors: Arc<AnchorSet>,
    provider: Arc<dyn EmbeddingProvider>,
    repository: Arc<dyn EntryRepository>,
    ingestion: IngestionService,
    search: SimilaritySearch,
    analyzer: CohortHealthAnalyzer,
    gate: CrisisGate,
    event_bus: EventBus,
    crisis_threshold: f64,
    search_default: f64,
    search_top_k: usize,
    timeout: Duration,
    ready: AtomicBool,
}

impl StandardEmotionEngine {
    pub async fn initialize(
        spec: &EngineSpec,
        provider: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn EntryRepository>,
        event_bus: EventBus,
    ) -> Result<Self, EngineError> {
        spec.validate()?;

        let timeout = spec.embedding.timeout;
        let anchors = tokio::time::timeout(
            timeout * EMBED_ANCHOR_ATTEMPTS,
            AnchorSet::embed_with(provider.as_ref()),
        )
        .await
        .map_err(|_| {
            EngineError::EmbeddingUnavailable(format!(
                "{} provider timed out while embedding anchors",
                provider.name()
            ))
        })??;

        if let Some(expected) = spec.embedding.dimension {
            if anchors.dimension() != expected {
                return Err(EngineError::InvalidInput(format!(
                    "{} provider produced dimension {}, configuration expects {}",
                    provider.name(),
                    anchors.dimension(),
                    expected
                )));
            }
        }

        // Entries written under another provider or dimension cannot be scored.
        let stored = repository.stored_dimensions().await?;
        if let Some(foreign) = stored.iter().find(|d| **d != anchors.dimension()) {
            return Err(EngineError::InvalidInput(format!(
                "entry store holds {}-dimensional vectors, {} provider produces {}",
                foreign,
                provider.name(),
                anchors.dimension()
            )));
        }

        let anchors = Arc::new(anchors);
        let policy = WeightedSeverityPolicy::from_config(&spec.alerting);
        let floor = spec.thresholds.search_default.max(policy.max_threshold());

        let ingestion = IngestionService::new(
            provider.clone(),
            repository.clone(),
            IdentityHasher::from_config(&spec.identity)?,
            spec.preview_max_chars,
            anchors.dimension(),
            timeout,
        );

        info!(
            provider = provider.name(),
            dimension = anchors.dimension(),
            crisis_threshold = spec.thresholds.crisis,
            "Emotion engine ready"
        );

        Ok(Self {
            search: SimilaritySearch::new(repository.clone()),
            analyzer: CohortHealthAnalyzer::new(repository.clone(), anchors.clone(), Arc::new(policy)),
            gate: CrisisGate::new(repository.clone(), anchors.clone(), floor),
            anchors,
            provider,
            repository,
            ingestion,
            event_bus,
            crisis_threshold: spec.thresholds.crisis,
            search_default: spec.thresholds.search_default,
            search_top_k: spec.thresholds.search_top_k,
            timeout,
            ready: AtomicBool::new(true),
        })
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(EngineError::NotReady)
        }
    }

    pub fn dimension(&self) -> usize {
        self.anchors.dimension()
    }

    pub fn crisis_threshold(&self) -> f64 {
        self.crisis_threshold
    }

    async fn embed_query(&self, phrase: &str) -> Result<Embedding, EngineError> {
        let embedding = tokio::time::timeout(self.timeout, self.provider.embed(phrase))
            .await
            .map_err(|_| {
                EngineError::EmbeddingUnavailable(format!(
                    "{} provider timed out after {:?}",
                    self.provider.name(),
                    self.timeout
                ))
            })??;

        if embedding.dimension() != self.anchors.dimension() {
            return Err(EngineError::EmbeddingUnavailable(format!(
                "{} provider returned dimension {}, expected {}",
                self.provider.name(),
                embedding.dimension(),
                self.anchors.dimension()
            )));
        }
        Ok(embedding)
    }

    fn search_params(&self, threshold: Option<f64>, top_k: Option<usize>) -> Result<(f64, usize), EngineError> {
        let threshold = threshold.unwrap_or(self.search_default);
        let top_k = top_k.unwrap_or(self.search_top_k);
        validate_search_bounds(threshold, top_k)?;
        Ok((threshold, top_k))
    }
}

#[async_trait]
impl EmotionEngine for StandardEmotionEngine {
    async fn ingest(&self, request: IngestRequest) -> Result<EntryId, EngineError> {
        self.ensure_ready()?;
        let cohort_id = request.cohort_id.clone();
        let started = std::time::Instant::now();

        match self.ingestion.ingest(request).await {
            Ok(entry) => {
                counter!("mindease_entries_ingested_total").increment(1);
                histogram!("mindease_ingest_duration_seconds").record(started.elapsed().as_secs_f64());
                self.event_bus.publish(EngineEvent::EntryIngested {
                    entry_id: entry.id,
                    cohort_id,
                    timestamp: entry.created_at,
                });
                Ok(entry.id)
            }
            Err(err) => {
                counter!("mindease_ingest_failures_total", "code" => err.code()).increment(1);
                warn!(cohort_id = %cohort_id, code = err.code(), "Ingestion failed: {}", err);
                self.event_bus.publish(EngineEvent::IngestionFailed {
                    cohort_id,
                    error_code: err.code().to_string(),
                    timestamp: Utc::now(),
                });
                Err(err)
            }
        }
    }

    async fn search_by_emotion(
        &self,
        anchor_name: &str,
        threshold: Option<f64>,
        top_k: Option<usize>,
    ) -> Result<Vec<EmotionMatch>, EngineError> {
        self.ensure_ready()?;
        let anchor = self.anchors.resolve(anchor_name)?;
        let (threshold, top_k) = self.search_params(threshold, top_k)?;

        counter!("mindease_searches_total", "kind" => "emotion").increment(1);
        self.search.search_by_vector(&anchor.embedding, threshold, top_k).await
    }

    async fn search_by_phrase(
        &self,
        phrase: &str,
        threshold: Option<f64>,
        top_k: Option<usize>,
    ) -> Result<Vec<EmotionMatch>, EngineError> {
        self.ensure_ready()?;
        if phrase.trim().is_empty() {
            return Err(EngineError::InvalidInput("phrase cannot be empty".to_string()));
        }
        let (threshold, top_k) = self.search_params(threshold, top_k)?;
        let query = self.embed_query(phrase).await?;

        counter!("mindease_searches_total", "kind" => "phrase").increment(1);
        self.search.search_by_vector(&query, threshold, top_k).await
    }

    async fn cohort_health(&self, cohort_id: &str) -> Result<CohortHealthReport, EngineError> {
        self.ensure_ready()?;
        let report = self.analyzer.analyze(cohort_id).await?;

        counter!("mindease_cohort_reports_total").increment(1);
        self.event_bus.publish(EngineEvent::CohortAnalyzed {
            cohort_id: report.cohort_id.clone(),
            total_entries: report.total_entries,
            dominant_emotion: report.dominant_emotion,
            alert_level: report.alert_level,
            timestamp: report.generated_at,
        });
        Ok(report)
    }

    async fn crisis_check(&self, threshold: Option<f64>) -> Result<Vec<CrisisFlag>, EngineError> {
        self.ensure_ready()?;
        let threshold = threshold.unwrap_or(self.crisis_threshold);
        let flags = self.gate.check(threshold).await?;

        counter!("mindease_crisis_flags_total").increment(flags.len() as u64);
        self.event_bus.publish(EngineEvent::CrisisCheckCompleted {
            threshold,
            flagged: flags.len(),
            timestamp: Utc::now(),
        });
        Ok(flags)
    }

    async fn stats(&self) -> Result<EngineStats, EngineError> {
        self.ensure_ready()?;
        Ok(EngineStats {
            total_entries: self.repository.count().await?,
            anchor_count: self.anchors.len(),
            dimension: self.anchors.dimension(),
            distance_metric: DISTANCE_METRIC.to_string(),
        })
    }

    async fn erase_identity(&self, caller_user_hash: &str) -> Result<usize, EngineError> {
        self.ensure_ready()?;
        let caller_user_hash = caller_user_hash.trim();
        if caller_user_hash.is_empty() {
            return Err(EngineError::InvalidInput("user_id_hash cannot be empty".to_string()));
        }

        let stored = self.ingestion.hasher().rehash(caller_user_hash);
        let affected = self.repository.erase_identity(&stored).await?;

        counter!("mindease_identities_erased_total").increment(affected as u64);
        info!(entries_affected = affected, "Identity linkage erased");
        self.event_bus.publish(EngineEvent::IdentityErased {
            entries_affected: affected,
            timestamp: Utc::now(),
        });
        Ok(affected)
    }

    fn anchors(&self) -> Vec<AnchorSummary> {
        self.anchors.summaries()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        if !self.ready.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        self.repository.flush().await?;
        let total_entries = self.repository.count().await?;
        info!(total_entries, "Emotion engine shut down");
        self.event_bus.publish(EngineEvent::EngineShutdown {
            total_entries,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

/// Run an ingestion on its own task so the caller's conversation flow is
/// never blocked or altered by it. Failures are logged and yield `None`.
pub fn spawn_ingest(engine: Arc<dyn EmotionEngine>, request: IngestRequest) -> JoinHandle<Option<EntryId>> {
    tokio::spawn(async move {
        let cohort_id = request.cohort_id.clone();
        match engine.ingest(request).await {
            Ok(entry_id) => Some(entry_id),
            Err(err) => {
                warn!(cohort_id = %cohort_id, code = err.code(), "Background ingestion dropped");
                None
            }
        }
    })
}
