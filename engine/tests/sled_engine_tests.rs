// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

use mindease_engine::application::{create_embedding_provider, create_entry_repository};
use mindease_engine::domain::{
    EmotionName, EngineConfigManifest, EngineError, EngineEvent, IngestRequest, StorageBackendKind,
};
use mindease_engine::infrastructure::EventBus;
use mindease_engine::{EmotionEngine, StandardEmotionEngine};

fn sled_manifest(path: &std::path::Path) -> EngineConfigManifest {
    let mut manifest = EngineConfigManifest::default();
    manifest.spec.storage.backend = StorageBackendKind::Sled;
    manifest.spec.storage.path = path.to_path_buf();
    manifest
}

async fn start(manifest: &EngineConfigManifest, bus: EventBus) -> StandardEmotionEngine {
    let provider = create_embedding_provider(&manifest.spec.embedding).unwrap();
    let repository = create_entry_repository(&manifest.spec.storage).unwrap();
    StandardEmotionEngine::initialize(&manifest.spec, provider, repository, bus)
        .await
        .unwrap()
}

#[tokio::test]
async fn entries_survive_engine_restart() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = sled_manifest(&dir.path().join("store"));

    {
        let bus = EventBus::default();
        let mut events = bus.subscribe();
        let engine = start(&manifest, bus).await;
        for (i, text) in [
            "I'm exhausted, nothing matters anymore",
            "I can't do this anymore, I'm so exhausted",
            "Nothing matters, I'm exhausted",
        ]
        .iter()
        .enumerate()
        {
            engine
                .ingest(IngestRequest::new("Engineering_2024", format!("eng_{}", i), *text))
                .await
                .unwrap();
        }
        engine.shutdown().await.unwrap();

        let mut saw_shutdown = false;
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::EngineShutdown { total_entries, .. } = event {
                assert_eq!(total_entries, 3);
                saw_shutdown = true;
            }
        }
        assert!(saw_shutdown);
        assert!(matches!(engine.stats().await, Err(EngineError::NotReady)));
    }

    let engine = start(&manifest, EventBus::default()).await;
    assert_eq!(engine.stats().await.unwrap().total_entries, 3);

    let report = engine.cohort_health("Engineering_2024").await.unwrap();
    assert_eq!(report.total_entries, 3);
    assert_eq!(report.dominant_emotion, EmotionName::Burnout);

    assert_eq!(engine.erase_identity("eng_0").await.unwrap(), 1);
    assert_eq!(engine.stats().await.unwrap().total_entries, 3);
}

#[tokio::test]
async fn yaml_manifest_drives_engine_construction() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("mindease-config.yaml");
    let yaml = format!(
        r#"
apiVersion: mindease.io/v1
kind: EngineConfig
metadata:
  name: integration
spec:
  preview_max_chars: 12
  embedding:
    provider: hashing
    dimension: 64
  storage:
    backend: sled
    path: {}
  thresholds:
    crisis: 0.95
"#,
        dir.path().join("db").display()
    );
    std::fs::write(&config_path, yaml).unwrap();

    let manifest = EngineConfigManifest::load_or_default(Some(config_path)).unwrap();
    assert_eq!(manifest.spec.thresholds.crisis, 0.95);

    let engine = start(&manifest, EventBus::default()).await;
    assert_eq!(engine.stats().await.unwrap().dimension, 64);
    assert_eq!(engine.crisis_threshold(), 0.95);
}

#[tokio::test]
async fn restart_with_changed_dimension_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut manifest = sled_manifest(&dir.path().join("store"));
    manifest.spec.embedding.dimension = Some(256);

    {
        let engine = start(&manifest, EventBus::default()).await;
        engine
            .ingest(IngestRequest::new("Arts_2024", "arts_1", "I feel so isolated"))
            .await
            .unwrap();
        engine.shutdown().await.unwrap();
    }

    manifest.spec.embedding.dimension = Some(128);
    let provider = create_embedding_provider(&manifest.spec.embedding).unwrap();
    let repository = create_entry_repository(&manifest.spec.storage).unwrap();
    let result =
        StandardEmotionEngine::initialize(&manifest.spec, provider, repository, EventBus::default())
            .await;
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}
