// SPDX-License-Identifier: MIT

//! Per-owner change feed.
//!
//! Mutation handlers publish a [`ChangeEvent`] after every successful store
//! write; subscribers (the SSE route) receive only the events for their own
//! owner id. Backed by one `tokio::sync::broadcast` channel per owner.

use crate::models::ChangeEvent;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity per owner channel. Slow subscribers past this lag drop events
/// rather than blocking publishers.
const CHANNEL_CAPACITY: usize = 64;

/// Registry of per-owner broadcast channels.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    channels: Arc<DashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the change feed for one owner.
    pub fn subscribe(&self, user_id: &str) -> broadcast::Receiver<ChangeEvent> {
        self.channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to one owner's subscribers, if any.
    pub fn publish(&self, user_id: &str, event: ChangeEvent) {
        if let Some(tx) = self.channels.get(user_id) {
            // Send fails only when there are no receivers; nothing to do then.
            let _ = tx.send(event);
        }
    }

    /// Number of live subscribers for an owner.
    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.channels
            .get(user_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
