use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{Draft, Seat};

/// A single consistent snapshot of a draft aggregate: the draft row and
/// all of its seat rows.
#[derive(Debug, Clone)]
pub struct DraftAggregate {
    pub draft: Draft,
    pub seats: Vec<Seat>,
}

/// Outcome of a compare-and-set write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    Committed { new_version: i64 },
    Conflict,
}

/// Persistence with two critical primitives: state-version CAS and an
/// advisory bot lease. No joins or queries beyond single-draft loads and
/// a lookup by `share_id` are exposed — the Store is intentionally
/// narrow.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn create(&self, draft: &Draft, seats: &[Seat]) -> DomainResult<()>;

    async fn load(&self, id: Uuid) -> DomainResult<Option<DraftAggregate>>;

    async fn load_by_share_id(&self, share_id: &str) -> DomainResult<Option<DraftAggregate>>;

    /// Compare-and-set: writes succeed only if the stored `state_version`
    /// still equals `expected_version`, in which case it becomes
    /// `expected_version + 1`. A conflict is an in-band result, not an
    /// error — callers re-read and retry.
    async fn update(
        &self,
        expected_version: i64,
        draft: &Draft,
        seats: &[Seat],
    ) -> DomainResult<CasOutcome>;

    /// Sets `bot_processing_since = now` only if it is null or older
    /// than `max_age_seconds`. Returns whether the lease was acquired.
    async fn acquire_bot_lease(&self, id: Uuid, now: DateTime<Utc>, max_age_seconds: i64) -> DomainResult<bool>;

    async fn release_bot_lease(&self, id: Uuid) -> DomainResult<()>;

    /// Ids of drafts the TimeoutEnforcer needs to scan: active pick
    /// phase, not paused.
    async fn list_active_draft_ids(&self) -> DomainResult<Vec<Uuid>>;
}
