use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::time::timeout as tokio_timeout;
use tracing::warn;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::draft::{Draft, DraftSettingsPatch, DraftStatus};
use crate::models::public_state::{PrivateHandView, PublicDraftState};
use crate::models::seat::{PickStatus, Seat};
use crate::ports::bot_behavior::BotBehavior;
use crate::ports::pack_generator::PackGenerator;
use crate::repositories::store::{CasOutcome, DraftAggregate, DraftStore};
use crate::services::bot_runner::BotRunner;
use crate::services::broadcaster::{BroadcastEvent, Broadcaster};
use crate::services::turn_engine;
use crate::services::view::{project_private_hand, project_public_state};

const SHARE_ID_LEN: usize = 8;
const MAX_CAS_RETRIES: usize = 5;
const POLL_TIMEOUT_SECONDS: u64 = 25;

/// Facade composing the store, the pure turn engine, the broadcaster and
/// the bot runner into the operations a transport layer calls directly.
/// Authorization (host-only, seat ownership) lives here, not in the
/// turn engine, which never sees a principal.
pub struct DraftService {
    store: Arc<dyn DraftStore>,
    pack_generator: Arc<dyn PackGenerator>,
    broadcaster: Broadcaster,
    bot_runner: Arc<BotRunner>,
}

impl DraftService {
    pub fn new(
        store: Arc<dyn DraftStore>,
        pack_generator: Arc<dyn PackGenerator>,
        broadcaster: Broadcaster,
        bot_runner: Arc<BotRunner>,
    ) -> Self {
        Self {
            store,
            pack_generator,
            broadcaster,
            bot_runner,
        }
    }

    pub fn with_bot_behavior(self, _bot_behavior: Arc<dyn BotBehavior>) -> Self {
        // BotBehavior is wired into BotRunner at construction; kept here
        // so callers can read the dependency list off this builder too.
        self
    }

    pub async fn create(
        &self,
        host_principal: &str,
        set_code: &str,
        max_seats: i32,
        settings_patch: DraftSettingsPatch,
    ) -> DomainResult<(Draft, Seat)> {
        let share_id = generate_share_id();
        let mut draft = Draft::new(share_id, Uuid::new_v4(), set_code.to_string(), max_seats, Utc::now())?;
        draft.settings.apply_patch(&settings_patch);
        let host_seat = Seat::new_human(draft.id, 1, host_principal.to_string());
        draft.host_seat_id = host_seat.seat_id;

        self.store.create(&draft, std::slice::from_ref(&host_seat)).await?;
        Ok((draft, host_seat))
    }

    pub async fn join(&self, share_id: &str, principal: &str) -> DomainResult<(Draft, Seat)> {
        let (draft, seat) = self
            .mutate_by_share_id(share_id, |draft, seats| {
                let seat = turn_engine::join_seat(draft, seats, principal)?;
                seats.push(seat.clone());
                Ok(seat)
            })
            .await?;
        Ok((draft, seat))
    }

    pub async fn leave(&self, draft_id: Uuid, principal: &str) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                turn_engine::leave_seat(draft, seats, principal)?;
                Ok(())
            })
            .await?;
        Ok(draft)
    }

    pub async fn add_bot(&self, draft_id: Uuid, host_principal: &str) -> DomainResult<(Draft, Seat)> {
        self.mutate(draft_id, |draft, seats| {
            require_host(draft, seats, host_principal)?;
            let ordinal = seats.iter().filter(|s| s.is_bot).count() as u32 + 1;
            let bot_seat = turn_engine::add_bot(draft, seats, ordinal)?;
            seats.push(bot_seat.clone());
            Ok(bot_seat)
        })
        .await
    }

    pub async fn update_settings(&self, draft_id: Uuid, host_principal: &str, patch: DraftSettingsPatch) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                require_host(draft, seats, host_principal)?;
                if draft.status != DraftStatus::Waiting {
                    return Err(DomainError::DraftLocked("settings can only change before start".to_string()));
                }
                draft.settings.apply_patch(&patch);
                Ok(())
            })
            .await?;
        Ok(draft)
    }

    pub async fn randomize_seats(&self, draft_id: Uuid, host_principal: &str) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                require_host(draft, seats, host_principal)?;
                let mut rng = rand::rng();
                turn_engine::randomize_seats(draft, seats, &mut rng)
            })
            .await?;
        Ok(draft)
    }

    /// Not routed through `mutate` because generating pack content is
    /// itself async; the retry shape is the same one level down.
    pub async fn start(&self, draft_id: Uuid, host_principal: &str) -> DomainResult<Draft> {
        let mut draft = None;
        for attempt in 0..MAX_CAS_RETRIES {
            let DraftAggregate { mut draft: loaded_draft, mut seats } = self
                .store
                .load(draft_id)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("draft {draft_id} not found")))?;

            require_host(&loaded_draft, &seats, host_principal)?;
            let content = self
                .pack_generator
                .generate(&loaded_draft.set_code, seats.len() as u8, loaded_draft.settings.pack_size)
                .await?;
            let expected_version = loaded_draft.state_version;
            turn_engine::start(&mut loaded_draft, &mut seats, Utc::now(), content)?;

            match self.store.update(expected_version, &loaded_draft, &seats).await? {
                CasOutcome::Committed { new_version } => {
                    loaded_draft.state_version = new_version;
                    self.publish(&loaded_draft, &seats);
                    draft = Some(loaded_draft);
                    break;
                }
                CasOutcome::Conflict if attempt + 1 < MAX_CAS_RETRIES => {
                    warn!(draft_id = %draft_id, attempt, "CAS conflict starting draft, retrying");
                    continue;
                }
                CasOutcome::Conflict => return Err(DomainError::StateChanged),
            }
        }
        let draft = draft.expect("loop either returns, errors, or sets draft");

        self.bot_runner.process_bot_turns(draft_id).await?;
        Ok(draft)
    }

    pub async fn select(&self, draft_id: Uuid, principal: &str, card_id: Option<crate::models::CardId>) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                let in_leader_phase = draft.status == DraftStatus::LeaderDraft;
                let seat = seats
                    .iter_mut()
                    .find(|s| s.principal == principal)
                    .ok_or(DomainError::NotSeatOwner)?;
                turn_engine::select(seat, in_leader_phase, card_id.clone())?;

                let remaining_pickers = seats.iter().filter(|s| s.pick_status == PickStatus::Picking).count();
                if remaining_pickers == 1 && draft.phase.last_picker_started_at().is_none() {
                    draft.phase.set_last_picker_started_at(Some(Utc::now()));
                }

                if seats.iter().all(|s| s.pick_status == PickStatus::Selected || s.pick_status == PickStatus::Idle) {
                    turn_engine::commit_round(draft, seats, Utc::now())?;
                }
                Ok(())
            })
            .await?;

        if draft.status.is_active_pick_phase() {
            self.bot_runner.process_bot_turns(draft_id).await?;
        }
        Ok(draft)
    }

    pub async fn pause(&self, draft_id: Uuid, host_principal: &str) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                require_host(draft, seats, host_principal)?;
                draft.pause(Utc::now())
            })
            .await?;
        Ok(draft)
    }

    pub async fn resume(&self, draft_id: Uuid, host_principal: &str) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                require_host(draft, seats, host_principal)?;
                draft.resume(Utc::now())
            })
            .await?;
        Ok(draft)
    }

    pub async fn cancel(&self, draft_id: Uuid, host_principal: &str) -> DomainResult<Draft> {
        let (draft, _) = self
            .mutate(draft_id, |draft, seats| {
                require_host(draft, seats, host_principal)?;
                draft.cancel()
            })
            .await?;
        Ok(draft)
    }

    /// Resolves the public `shareId` a client knows to the internal
    /// draft id every other entry point keys off of.
    pub async fn draft_id_for_share(&self, share_id: &str) -> DomainResult<Uuid> {
        let aggregate = self
            .store
            .load_by_share_id(share_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("draft with share id {share_id} not found")))?;
        Ok(aggregate.draft.id)
    }

    pub async fn get_state(&self, draft_id: Uuid, requesting_principal: Option<&str>) -> DomainResult<(PublicDraftState, Option<PrivateHandView>)> {
        let aggregate = self
            .store
            .load(draft_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("draft {draft_id} not found")))?;

        let public_state = project_public_state(&aggregate.draft, &aggregate.seats);
        let private_hand = requesting_principal.and_then(|principal| {
            aggregate.seats.iter().find(|s| s.principal == principal).map(|seat| {
                let in_leader_phase = aggregate.draft.status == DraftStatus::LeaderDraft;
                project_private_hand(seat, in_leader_phase)
            })
        });
        Ok((public_state, private_hand))
    }

    /// Long-polls for the next state change past `since_version`, or
    /// returns the current state immediately if it has already moved.
    pub async fn poll_for_change(&self, draft_id: Uuid, since_version: i64) -> DomainResult<PublicDraftState> {
        let aggregate = self
            .store
            .load(draft_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("draft {draft_id} not found")))?;
        if aggregate.draft.state_version > since_version {
            return Ok(project_public_state(&aggregate.draft, &aggregate.seats));
        }

        let mut rx = self.broadcaster.subscribe(draft_id);
        let wait = tokio_timeout(Duration::from_secs(POLL_TIMEOUT_SECONDS), async {
            loop {
                match rx.recv().await {
                    Ok(BroadcastEvent::State { state_version, public_state }) if state_version > since_version => {
                        return Some(public_state);
                    }
                    Ok(BroadcastEvent::Deleted) => return None,
                    Ok(_) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await;

        match wait {
            Ok(Some(state)) => Ok(state),
            _ => {
                let aggregate = self
                    .store
                    .load(draft_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound(format!("draft {draft_id} not found")))?;
                Ok(project_public_state(&aggregate.draft, &aggregate.seats))
            }
        }
    }

    async fn mutate_by_share_id<F, T>(&self, share_id: &str, mutation: F) -> DomainResult<(Draft, T)>
    where
        F: Fn(&mut Draft, &mut Vec<Seat>) -> DomainResult<T>,
    {
        let aggregate = self
            .store
            .load_by_share_id(share_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("draft with share id {share_id} not found")))?;
        self.mutate(aggregate.draft.id, mutation).await
    }

    /// Loads, applies `mutation`, and attempts a CAS write, retrying on
    /// conflict up to `MAX_CAS_RETRIES` times. Broadcasts the new public
    /// state on success.
    async fn mutate<F, T>(&self, draft_id: Uuid, mutation: F) -> DomainResult<(Draft, T)>
    where
        F: Fn(&mut Draft, &mut Vec<Seat>) -> DomainResult<T>,
    {
        for attempt in 0..MAX_CAS_RETRIES {
            let DraftAggregate { mut draft, mut seats } = self
                .store
                .load(draft_id)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("draft {draft_id} not found")))?;

            let expected_version = draft.state_version;
            let result = mutation(&mut draft, &mut seats)?;

            match self.store.update(expected_version, &draft, &seats).await? {
                CasOutcome::Committed { new_version } => {
                    draft.state_version = new_version;
                    self.publish(&draft, &seats);
                    return Ok((draft, result));
                }
                CasOutcome::Conflict if attempt + 1 < MAX_CAS_RETRIES => {
                    warn!(draft_id = %draft_id, attempt, "CAS conflict, retrying");
                    continue;
                }
                CasOutcome::Conflict => return Err(DomainError::StateChanged),
            }
        }
        unreachable!("loop always returns or errors")
    }

    fn publish(&self, draft: &Draft, seats: &[Seat]) {
        if draft.status == DraftStatus::Cancelled {
            self.broadcaster.publish(draft.id, BroadcastEvent::Deleted);
            self.broadcaster.retire(draft.id);
            return;
        }
        self.broadcaster.publish(
            draft.id,
            BroadcastEvent::State {
                state_version: draft.state_version,
                public_state: project_public_state(draft, seats),
            },
        );
    }
}

fn require_host(draft: &Draft, seats: &[Seat], principal: &str) -> DomainResult<()> {
    let is_host = seats
        .iter()
        .any(|s| s.seat_id == draft.host_seat_id && s.principal == principal);
    if is_host {
        Ok(())
    } else {
        Err(DomainError::NotHost)
    }
}

fn generate_share_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_ID_LEN)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
