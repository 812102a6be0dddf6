use std::sync::Arc;
use std::time::Duration;

use rand::rng;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::draft::DraftStatus;
use crate::models::seat::PickStatus;
use crate::repositories::store::{CasOutcome, DraftStore};
use crate::services::bot_runner::BotRunner;
use crate::services::broadcaster::{BroadcastEvent, Broadcaster};
use crate::services::turn_engine;
use crate::services::view::project_public_state;

const SCAN_INTERVAL_SECONDS: u64 = 1;

/// Periodically scans every active draft and forces a random selection
/// onto any seat whose round timer or last-picker timer has expired,
/// then commits the round if everyone has since been resolved.
pub struct TimeoutEnforcer {
    store: Arc<dyn DraftStore>,
    broadcaster: Broadcaster,
    bot_runner: Arc<BotRunner>,
}

impl TimeoutEnforcer {
    pub fn new(store: Arc<dyn DraftStore>, broadcaster: Broadcaster, bot_runner: Arc<BotRunner>) -> Self {
        Self {
            store,
            broadcaster,
            bot_runner,
        }
    }

    /// Runs forever; spawn onto its own task.
    pub async fn run(&self) {
        let mut ticker = interval(Duration::from_secs(SCAN_INTERVAL_SECONDS));
        loop {
            ticker.tick().await;
            if let Err(err) = self.scan_once().await {
                warn!(error = %err, "timeout enforcer scan failed");
            }
        }
    }

    pub async fn scan_once(&self) -> DomainResult<()> {
        let draft_ids = self.store.list_active_draft_ids().await?;
        for draft_id in draft_ids {
            if let Err(err) = self.scan_draft(draft_id).await {
                debug!(draft_id = %draft_id, error = %err, "skipping draft in timeout scan");
            }
        }
        Ok(())
    }

    async fn scan_draft(&self, draft_id: Uuid) -> DomainResult<()> {
        let Some(mut aggregate) = self.store.load(draft_id).await? else {
            return Ok(());
        };
        if !aggregate.draft.status.is_active_pick_phase() || aggregate.draft.paused {
            return Ok(());
        }

        let now = chrono::Utc::now();
        let elapsed = aggregate.draft.elapsed_seconds(now).unwrap_or(0);
        let settings = aggregate.draft.settings.clone();

        let round_expired = settings.round_timer_enabled && elapsed >= settings.round_timer_seconds as i64;
        let last_picker_expired = settings.last_picker_timer_enabled
            && aggregate
                .draft
                .phase
                .last_picker_started_at()
                .map(|started| (now - started).num_seconds() >= settings.last_picker_timer_seconds as i64)
                .unwrap_or(false);

        if !round_expired && !last_picker_expired {
            return Ok(());
        }

        let in_leader_phase = aggregate.draft.status == DraftStatus::LeaderDraft;
        let mut rng = rng();
        let mut forced_any = false;
        for seat in aggregate.seats.iter_mut().filter(|s| s.pick_status == PickStatus::Picking) {
            turn_engine::force_random(seat, in_leader_phase, &mut rng)?;
            forced_any = true;
        }

        if !forced_any && !aggregate.seats.iter().all(|s| s.pick_status == PickStatus::Selected || s.pick_status == PickStatus::Idle) {
            return Ok(());
        }

        let expired_version = aggregate.draft.state_version;
        turn_engine::commit_round(&mut aggregate.draft, &mut aggregate.seats, now)?;

        match self.store.update(expired_version, &aggregate.draft, &aggregate.seats).await? {
            CasOutcome::Committed { new_version } => {
                info!(draft_id = %draft_id, new_version, "forced round commit on timeout");
                let public_state = project_public_state(&aggregate.draft, &aggregate.seats);
                self.broadcaster.publish(
                    draft_id,
                    BroadcastEvent::State {
                        state_version: new_version,
                        public_state,
                    },
                );
                if !aggregate.draft.status.is_terminal() {
                    self.bot_runner.process_bot_turns(draft_id).await?;
                }
            }
            CasOutcome::Conflict => {
                // Someone else already resolved this round; nothing to do.
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draft::{DraftSettings, PhaseState};
    use crate::models::{CardId, Draft, Seat};
    use crate::ports::bot_behavior::HeuristicBotBehavior;
    use crate::repositories::store::DraftAggregate;
    use async_trait::async_trait;
    use chrono::Duration;
    use mockall::mock;

    mock! {
        Store {}
        #[async_trait]
        impl DraftStore for Store {
            async fn create(&self, draft: &Draft, seats: &[Seat]) -> DomainResult<()>;
            async fn load(&self, id: Uuid) -> DomainResult<Option<DraftAggregate>>;
            async fn load_by_share_id(&self, share_id: &str) -> DomainResult<Option<DraftAggregate>>;
            async fn update(&self, expected_version: i64, draft: &Draft, seats: &[Seat]) -> DomainResult<CasOutcome>;
            async fn acquire_bot_lease(&self, id: Uuid, now: chrono::DateTime<chrono::Utc>, max_age_seconds: i64) -> DomainResult<bool>;
            async fn release_bot_lease(&self, id: Uuid) -> DomainResult<()>;
            async fn list_active_draft_ids(&self) -> DomainResult<Vec<Uuid>>;
        }
    }

    fn seat_with_hand(draft_id: Uuid, seat_number: i32, principal: &str, hand: Vec<CardId>, status: PickStatus) -> Seat {
        let mut seat = Seat::new_human(draft_id, seat_number, principal.to_string());
        seat.current_pack = hand;
        seat.pick_status = status;
        seat
    }

    fn draft_mid_last_pack(draft_id: Uuid, pick_started_at: chrono::DateTime<chrono::Utc>, paused: bool) -> Draft {
        Draft {
            id: draft_id,
            share_id: "abc123".to_string(),
            host_seat_id: Uuid::new_v4(),
            set_code: "TST".to_string(),
            max_seats: 3,
            status: DraftStatus::PackDraft,
            phase: PhaseState::PackDraft {
                pack_number: 3,
                pick_in_pack: 1,
                last_picker_started_at: None,
            },
            settings: DraftSettings::default(),
            paused,
            paused_at: None,
            paused_accumulated_seconds: 0,
            state_version: 0,
            bot_processing_since: None,
            pack_seed: None,
            created_at: chrono::Utc::now(),
            started_at: Some(chrono::Utc::now()),
            completed_at: None,
            pick_started_at: Some(pick_started_at),
        }
    }

    fn build_enforcer(store: MockStore) -> (TimeoutEnforcer, Broadcaster) {
        let store: Arc<dyn DraftStore> = Arc::new(store);
        let broadcaster = Broadcaster::new();
        let bot_behavior = Arc::new(HeuristicBotBehavior::default());
        let bot_runner = Arc::new(BotRunner::new(store.clone(), bot_behavior, broadcaster.clone()));
        let enforcer = TimeoutEnforcer::new(store, broadcaster.clone(), bot_runner);
        (enforcer, broadcaster)
    }

    #[tokio::test]
    async fn forces_random_pick_and_commits_exactly_once_when_round_timer_expires() {
        let draft_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let draft = draft_mid_last_pack(draft_id, now - Duration::seconds(130), false);
        // Two bots already staged a pick; the lone human has not. Every
        // seat's pack holds a single card so this is also the last pick
        // of the last pack, driving the draft to completed and sparing
        // the test from also having to model a BotRunner follow-up.
        let mut bot1 = seat_with_hand(draft_id, 1, "bot:1", vec![CardId::from("P1")], PickStatus::Selected);
        bot1.is_bot = true;
        bot1.selected_card_id = Some(CardId::from("P1"));
        let mut bot2 = seat_with_hand(draft_id, 2, "bot:2", vec![CardId::from("P2")], PickStatus::Selected);
        bot2.is_bot = true;
        bot2.selected_card_id = Some(CardId::from("P2"));
        let human = seat_with_hand(draft_id, 3, "alice", vec![CardId::from("X")], PickStatus::Picking);
        let seats = vec![bot1, bot2, human];

        let mut store = MockStore::new();
        store
            .expect_list_active_draft_ids()
            .times(1)
            .returning(move || Ok(vec![draft_id]));
        store.expect_load().times(1).returning(move |_| {
            Ok(Some(DraftAggregate {
                draft: draft.clone(),
                seats: seats.clone(),
            }))
        });
        store.expect_update().times(1).returning(|expected_version, draft, seats| {
            assert_eq!(expected_version, 0);
            assert_eq!(draft.status, DraftStatus::Completed);
            assert!(seats.iter().all(|s| s.drafted_cards.len() == 1));
            Ok(CasOutcome::Committed { new_version: 1 })
        });

        let (enforcer, broadcaster) = build_enforcer(store);
        let mut rx = broadcaster.subscribe(draft_id);

        enforcer.scan_once().await.unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, BroadcastEvent::State { state_version: 1, .. }));
    }

    #[tokio::test]
    async fn does_not_fire_before_the_round_timer_elapses() {
        let draft_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let draft = draft_mid_last_pack(draft_id, now, false);
        let seats = vec![seat_with_hand(draft_id, 1, "alice", vec![CardId::from("X")], PickStatus::Picking)];

        let mut store = MockStore::new();
        store
            .expect_list_active_draft_ids()
            .times(1)
            .returning(move || Ok(vec![draft_id]));
        store.expect_load().times(1).returning(move |_| {
            Ok(Some(DraftAggregate {
                draft: draft.clone(),
                seats: seats.clone(),
            }))
        });
        // No `update` expectation: a call here would panic the mock,
        // which is the assertion that nothing fired early.

        let (enforcer, _broadcaster) = build_enforcer(store);
        enforcer.scan_once().await.unwrap();
    }

    #[tokio::test]
    async fn skips_a_paused_draft_even_if_its_round_timer_would_otherwise_be_expired() {
        let draft_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let draft = draft_mid_last_pack(draft_id, now - Duration::seconds(999), true);
        let seats = vec![seat_with_hand(draft_id, 1, "alice", vec![CardId::from("X")], PickStatus::Picking)];

        let mut store = MockStore::new();
        store
            .expect_list_active_draft_ids()
            .times(1)
            .returning(move || Ok(vec![draft_id]));
        store.expect_load().times(1).returning(move |_| {
            Ok(Some(DraftAggregate {
                draft: draft.clone(),
                seats: seats.clone(),
            }))
        });

        let (enforcer, _broadcaster) = build_enforcer(store);
        enforcer.scan_once().await.unwrap();
    }
}
