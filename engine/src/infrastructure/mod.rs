// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure layer: storage backends, embedding adapters and the event bus.

pub mod event_bus;
pub mod hashing_embedder;
pub mod in_memory;
pub mod ollama;
pub mod sled_store;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use hashing_embedder::HashingEmbeddingProvider;
pub use in_memory::InMemoryEntryRepository;
pub use ollama::OllamaEmbeddingProvider;
pub use sled_store::SledEntryRepository;
