use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::PublicDraftState;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum BroadcastEvent {
    State {
        state_version: i64,
        public_state: PublicDraftState,
    },
    Deleted,
}

/// A simple in-process subscription hub keyed by draft id. Every
/// publish fans out to every current subscriber; subscribers that fall
/// behind are dropped by `tokio::sync::broadcast`'s built-in lag
/// handling rather than applying backpressure to mutations.
#[derive(Clone)]
pub struct Broadcaster {
    channels: Arc<DashMap<Uuid, broadcast::Sender<BroadcastEvent>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
        }
    }

    pub fn subscribe(&self, draft_id: Uuid) -> broadcast::Receiver<BroadcastEvent> {
        self.channels
            .entry(draft_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, draft_id: Uuid, event: BroadcastEvent) {
        if let Some(sender) = self.channels.get(&draft_id) {
            // No subscribers returns an error; that's expected and not
            // worth logging on every mutation of an unwatched draft.
            let _ = sender.send(event);
        }
    }

    /// Drops the channel entirely; called once a draft reaches a
    /// terminal state and no further events will be published.
    pub fn retire(&self, draft_id: Uuid) {
        self.channels.remove(&draft_id);
    }

    pub fn subscriber_count(&self, draft_id: Uuid) -> usize {
        self.channels
            .get(&draft_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
