use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::draft::{DraftStatus, PhaseState};
use crate::models::seat::PickStatus;
use crate::ports::bot_behavior::{BotBehavior, BotSeatContext};
use crate::repositories::store::{CasOutcome, DraftStore};
use crate::services::broadcaster::{BroadcastEvent, Broadcaster};
use crate::services::turn_engine;
use crate::services::view::project_public_state;

/// Leases older than this are treated as stale and reclaimable by
/// another worker. Kept as a source constant rather than a `Config`
/// field — see DESIGN.md.
pub const BOT_LEASE_MAX_AGE_SECONDS: i64 = 30;

const MAX_ITERATIONS: u32 = 100;

pub struct BotRunner {
    store: Arc<dyn DraftStore>,
    bot_behavior: Arc<dyn BotBehavior>,
    broadcaster: Broadcaster,
}

impl BotRunner {
    pub fn new(store: Arc<dyn DraftStore>, bot_behavior: Arc<dyn BotBehavior>, broadcaster: Broadcaster) -> Self {
        Self {
            store,
            bot_behavior,
            broadcaster,
        }
    }

    /// Entry point: called after any successful mutation that could
    /// have unblocked a bot (select, commitRound, start, timeout).
    pub async fn process_bot_turns(&self, draft_id: Uuid) -> DomainResult<()> {
        let now = Utc::now();
        if !self.store.acquire_bot_lease(draft_id, now, BOT_LEASE_MAX_AGE_SECONDS).await? {
            // Another worker already holds the lease; it will observe
            // the new state on its own.
            return Ok(());
        }

        let result = self.run_loop(draft_id).await;
        self.store.release_bot_lease(draft_id).await?;
        result
    }

    async fn run_loop(&self, draft_id: Uuid) -> DomainResult<()> {
        for _ in 0..MAX_ITERATIONS {
            let Some(mut aggregate) = self.store.load(draft_id).await? else {
                break;
            };
            if !aggregate.draft.status.is_active_pick_phase() || aggregate.draft.paused {
                break;
            }

            let in_leader_phase = aggregate.draft.status == DraftStatus::LeaderDraft;
            let all_selected = aggregate
                .seats
                .iter()
                .all(|s| s.pick_status == PickStatus::Selected || s.pick_status == PickStatus::Idle);

            if all_selected {
                let expected_version = aggregate.draft.state_version;
                turn_engine::commit_round(&mut aggregate.draft, &mut aggregate.seats, Utc::now())?;
                match self
                    .store
                    .update(expected_version, &aggregate.draft, &aggregate.seats)
                    .await?
                {
                    CasOutcome::Committed { new_version } => {
                        self.publish_state(&aggregate.draft, &aggregate.seats, new_version);
                        if aggregate.draft.status.is_terminal() {
                            break;
                        }
                        self.store.acquire_bot_lease(draft_id, Utc::now(), BOT_LEASE_MAX_AGE_SECONDS).await?;
                        continue;
                    }
                    CasOutcome::Conflict => break,
                }
            }

            let mut any_bot_picked = false;
            for seat in aggregate.seats.iter_mut().filter(|s| s.is_bot && s.pick_status == PickStatus::Picking) {
                let hand = seat.hand(in_leader_phase).to_vec();
                if hand.is_empty() {
                    continue;
                }
                let chosen = if in_leader_phase {
                    self.bot_behavior
                        .select_leader(&hand, BotSeatContext {
                            drafted_leaders: &seat.drafted_leaders,
                            drafted_cards: &seat.drafted_cards,
                        })
                        .await
                } else {
                    self.bot_behavior
                        .select_card(&hand, BotSeatContext {
                            drafted_leaders: &seat.drafted_leaders,
                            drafted_cards: &seat.drafted_cards,
                        })
                        .await
                };
                turn_engine::select(seat, in_leader_phase, Some(chosen))?;
                any_bot_picked = true;
            }

            if !any_bot_picked {
                // Nothing left for bots to do; a human must act next.
                break;
            }

            let still_picking: Vec<_> = aggregate
                .seats
                .iter()
                .filter(|s| s.pick_status == PickStatus::Picking)
                .collect();
            if still_picking.len() == 1 && aggregate.draft.phase.last_picker_started_at().is_none() {
                aggregate.draft.phase.set_last_picker_started_at(Some(Utc::now()));
            }

            let expected_version = aggregate.draft.state_version;
            match self
                .store
                .update(expected_version, &aggregate.draft, &aggregate.seats)
                .await?
            {
                CasOutcome::Committed { new_version } => {
                    self.publish_state(&aggregate.draft, &aggregate.seats, new_version);
                    self.store.acquire_bot_lease(draft_id, Utc::now(), BOT_LEASE_MAX_AGE_SECONDS).await?;
                }
                CasOutcome::Conflict => break,
            }
        }

        Ok(())
    }

    fn publish_state(&self, draft: &crate::models::Draft, seats: &[crate::models::Seat], new_version: i64) {
        let public_state = project_public_state(draft, seats);
        if matches!(draft.phase, PhaseState::Cancelled) {
            self.broadcaster.publish(draft.id, BroadcastEvent::Deleted);
            self.broadcaster.retire(draft.id);
        } else {
            self.broadcaster.publish(
                draft.id,
                BroadcastEvent::State {
                    state_version: new_version,
                    public_state,
                },
            );
        }
    }
}
