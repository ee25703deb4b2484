// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Simulation corpus and demonstration queries.
//!
//! Seeds 50 disclosures into a throwaway in-memory engine:
//! - 20 Engineering entries (stress/burnout lean)
//! - 20 Arts entries (loneliness/creativity lean)
//! - 10 high-anger entries alternating between both cohorts

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use mindease_engine::domain::{
    hash_caller_identity, CohortHealthReport, EngineConfigManifest, EntryMetadata, EntryRepository,
    IngestRequest,
};
use mindease_engine::infrastructure::{EventBus, InMemoryEntryRepository};
use mindease_engine::EmotionEngine;
use tracing::info;

use super::build_engine;

pub const ENGINEERING_COHORT: &str = "Engineering_2024";
pub const ARTS_COHORT: &str = "Arts_2024";

const ENGINEERING_VENTS: [&str; 20] = [
    "I have three exams next week and I haven't slept in days",
    "This coding assignment is impossible, I'm going to fail",
    "Everyone else understands the material but I'm completely lost",
    "I can't keep up with the workload, it's crushing me",
    "My project deadline is tomorrow and nothing works",
    "I'm so tired I can't think straight anymore",
    "The professor expects too much, this is unrealistic",
    "I studied for hours but still failed the midterm",
    "I don't understand why I'm even doing this degree",
    "My parents will be so disappointed if I don't get good grades",
    "I'm falling behind and there's no way to catch up",
    "This internship rejection feels like the end of my career",
    "I can't afford to fail this course again",
    "Everyone is getting job offers except me",
    "I'm exhausted but I have to keep going",
    "The competition is too intense, I can't breathe",
    "I haven't eaten properly in three days because of deadlines",
    "My mental health is deteriorating but I can't stop",
    "I feel like a failure compared to my classmates",
    "I don't know how much longer I can do this",
];

const ARTS_VENTS: [&str; 20] = [
    "Nobody understands my creative vision",
    "I feel so isolated in this program",
    "My art doesn't resonate with anyone",
    "I'm questioning if I have any real talent",
    "The critique session destroyed my confidence",
    "I feel invisible in this community",
    "My family thinks my degree is worthless",
    "I'm surrounded by people but feel completely alone",
    "I don't fit in with the other artists",
    "My work is never good enough for the professors",
    "I'm losing my passion for creating",
    "Financial stress is killing my creativity",
    "I feel like an imposter in every class",
    "Nobody takes my art seriously",
    "I'm too different, I don't belong here",
    "My portfolio feels empty and meaningless",
    "I can't express what I'm feeling through my work",
    "The industry is too competitive, I'll never make it",
    "I'm doubting every creative choice I make",
    "I feel disconnected from everything and everyone",
];

const ANGER_VENTS: [&str; 10] = [
    "This system is completely broken and unfair",
    "I'm so angry I want to break everything",
    "The administration doesn't care about students at all",
    "I'm furious at how I've been treated",
    "This is absolute bullshit and I'm done",
    "I hate everything about this place",
    "They're setting us up to fail on purpose",
    "I'm enraged by the injustice of this situation",
    "Nothing is fair, everything is rigged against us",
    "I'm so mad I can't even think clearly",
];

/// `(raw user id, cohort, text)` for every simulated disclosure.
fn simulation_corpus() -> Vec<(String, &'static str, &'static str)> {
    let engineering = ENGINEERING_VENTS
        .iter()
        .enumerate()
        .map(|(i, text)| (format!("eng_user_{:03}", i + 1), ENGINEERING_COHORT, *text));
    let arts = ARTS_VENTS
        .iter()
        .enumerate()
        .map(|(i, text)| (format!("arts_user_{:03}", i + 1), ARTS_COHORT, *text));
    let anger = ANGER_VENTS.iter().enumerate().map(|(i, text)| {
        let cohort = if i % 2 == 0 { ENGINEERING_COHORT } else { ARTS_COHORT };
        (format!("angry_user_{:03}", i + 1), cohort, *text)
    });

    engineering.chain(arts).chain(anger).collect()
}

/// Ingest the simulation corpus; returns how many entries were stored.
pub async fn seed(engine: &dyn EmotionEngine) -> Result<usize> {
    let mut stored = 0;
    for (raw_user, cohort, text) in simulation_corpus() {
        let request = IngestRequest::new(cohort, hash_caller_identity(&raw_user), text)
            .with_metadata(EntryMetadata {
                mood_label: None,
                mode: Some("text".to_string()),
            });
        engine.ingest(request).await?;
        stored += 1;
    }
    info!(entries = stored, "Simulation corpus seeded");
    Ok(stored)
}

pub async fn run(manifest: &EngineConfigManifest, anger_threshold: f64, crisis_threshold: f64) -> Result<()> {
    let repository: Arc<dyn EntryRepository> = Arc::new(InMemoryEntryRepository::new());
    let engine = build_engine(&manifest.spec, Some(repository), EventBus::default()).await?;

    banner("GENERATING SIMULATION DATA");
    let stored = seed(&engine).await?;
    println!("{} {} entries added", "✓".green(), stored);

    banner("DEMONSTRATION: SEMANTIC EMOTIONAL SEARCH");

    section("[QUERY 1] Finding 3 most angry entries");
    let matches = engine
        .search_by_emotion("anger", Some(anger_threshold), Some(3))
        .await?;
    println!("Found {} high-anger matches:\n", matches.len());
    for (i, m) in matches.iter().enumerate() {
        println!("{}. Cohort: {}", i + 1, m.cohort_id);
        println!(
            "   Similarity: {:.4} ({})",
            m.similarity_score,
            format!("{:?}", m.risk_level).to_uppercase()
        );
    }

    section("[QUERY 2] Analyzing Engineering cohort health");
    print_report(&engine.cohort_health(ENGINEERING_COHORT).await?);

    section("[QUERY 3] Analyzing Arts cohort health");
    print_report(&engine.cohort_health(ARTS_COHORT).await?);

    section("[QUERY 4] Checking for crisis flags");
    let flags = engine.crisis_check(Some(crisis_threshold)).await?;
    if flags.is_empty() {
        println!("{} No crisis-level flags detected", "✓".green());
    } else {
        println!(
            "{}\n",
            format!("⚠️  {} entry(ies) flagged for intervention:", flags.len()).yellow()
        );
        for flag in &flags {
            println!("User hash: {} (DE-MASKED)", flag.user_id_hash.as_str());
            println!("Cohort: {}", flag.cohort_id);
            println!("Crisis similarity: {:.4}", flag.crisis_similarity);
            println!();
        }
    }

    section("[ENGINE STATISTICS]");
    let stats = engine.stats().await?;
    println!("Total entries: {}", stats.total_entries);
    println!("Anchors: {}", stats.anchor_count);
    println!("Dimension: {}", stats.dimension);
    println!("Distance metric: {}", stats.distance_metric);

    engine.shutdown().await?;
    banner("DEMONSTRATION COMPLETE");
    Ok(())
}

fn print_report(report: &CohortHealthReport) {
    println!("Cohort: {}", report.cohort_id);
    println!("Total entries: {}", report.total_entries);
    println!(
        "Dominant emotion: {}",
        report.dominant_emotion.as_str().to_uppercase().bold()
    );
    println!(
        "Alert level: {}",
        format!("{:?}", report.alert_level).to_uppercase()
    );
    println!("\nEmotion profile:");
    for (emotion, score) in report.emotion_profile.ranked() {
        println!("  {:12}: {:.4}", emotion.as_str(), score);
    }
}

fn banner(title: &str) {
    let rule = "=".repeat(60);
    println!("\n{}\n{}\n{}", rule, title.bold(), rule);
}

fn section(title: &str) {
    println!("\n{}\n{}", title.bold(), "-".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindease_engine::domain::EngineSpec;

    #[test]
    fn test_corpus_distribution() {
        let corpus = simulation_corpus();
        assert_eq!(corpus.len(), 50);
        let engineering = corpus.iter().filter(|(_, c, _)| *c == ENGINEERING_COHORT).count();
        let arts = corpus.iter().filter(|(_, c, _)| *c == ARTS_COHORT).count();
        assert_eq!(engineering, 25);
        assert_eq!(arts, 25);
        assert!(corpus.iter().any(|(user, _, _)| user == "angry_user_010"));
    }

    #[tokio::test]
    async fn test_seed_populates_both_cohorts() {
        let spec = EngineSpec::default();
        let repository: Arc<dyn EntryRepository> = Arc::new(InMemoryEntryRepository::new());
        let engine = build_engine(&spec, Some(repository), EventBus::default())
            .await
            .unwrap();

        assert_eq!(seed(&engine).await.unwrap(), 50);
        assert_eq!(engine.stats().await.unwrap().total_entries, 50);

        let engineering = engine.cohort_health(ENGINEERING_COHORT).await.unwrap();
        let arts = engine.cohort_health(ARTS_COHORT).await.unwrap();
        assert_eq!(engineering.total_entries, 25);
        assert_eq!(arts.total_entries, 25);
        assert_eq!(engineering.emotion_profile.len(), 7);
    }
}
