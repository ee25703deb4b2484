// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Engine Events
//
// In-memory event streaming over tokio broadcast channels. Slow subscribers
// lose the oldest events; publishing never blocks the engine.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::EngineEvent;

#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<EngineEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn publish(&self, event: EngineEvent) {
        debug!(event_type = event.event_type(), "Publishing engine event");

        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<EngineEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<EngineEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<EngineEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(EngineEvent::IdentityErased {
            entries_affected: 2,
            timestamp: Utc::now(),
        });

        for receiver in [&mut first, &mut second] {
            match receiver.recv().await.unwrap() {
                EngineEvent::IdentityErased { entries_affected, .. } => {
                    assert_eq!(entries_affected, 2)
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(EngineEvent::EngineShutdown {
            total_entries: 0,
            timestamp: Utc::now(),
        });
        let mut late = bus.subscribe();
        assert!(matches!(late.try_recv(), Err(EventBusError::Empty)));
    }

    #[tokio::test]
    async fn test_lagging_receiver_reports_dropped_events() {
        let bus = EventBus::new(2);
        let mut receiver = bus.subscribe();
        for flagged in 0..5 {
            bus.publish(EngineEvent::CrisisCheckCompleted {
                threshold: 0.9,
                flagged,
                timestamp: Utc::now(),
            });
        }
        assert!(matches!(receiver.try_recv(), Err(EventBusError::Lagged(3))));
    }
}
