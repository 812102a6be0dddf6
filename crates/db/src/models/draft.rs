use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::card::CardId;
use domain::models::draft::{Draft, DraftSettings, DraftStatus, PhaseState};
use domain::models::seat::{PickStatus, Seat};

use crate::errors::{DbError, DbResult};

/// Database model for the `drafts` table. `phase` and `settings` are
/// stored as opaque JSONB blobs — their internal layout is not the
/// store's concern, matching the reference's own use of `sqlx`'s `json`
/// feature for opaque columns.
#[derive(Debug, Clone, FromRow)]
pub struct DraftDb {
    pub id: Uuid,
    pub share_id: String,
    pub host_seat_id: Uuid,
    pub set_code: String,
    pub max_seats: i32,
    pub status: String,
    pub phase: serde_json::Value,
    pub settings: serde_json::Value,
    pub paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub paused_accumulated_seconds: i64,
    pub state_version: i64,
    pub bot_processing_since: Option<DateTime<Utc>>,
    pub pack_seed: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pick_started_at: Option<DateTime<Utc>>,
}

impl DraftDb {
    pub fn from_domain(draft: &Draft) -> DbResult<Self> {
        Ok(Self {
            id: draft.id,
            share_id: draft.share_id.clone(),
            host_seat_id: draft.host_seat_id,
            set_code: draft.set_code.clone(),
            max_seats: draft.max_seats,
            status: status_to_string(draft.status),
            phase: serde_json::to_value(&draft.phase)
                .map_err(|e| DbError::MappingError(format!("phase: {e}")))?,
            settings: serde_json::to_value(&draft.settings)
                .map_err(|e| DbError::MappingError(format!("settings: {e}")))?,
            paused: draft.paused,
            paused_at: draft.paused_at,
            paused_accumulated_seconds: draft.paused_accumulated_seconds,
            state_version: draft.state_version,
            bot_processing_since: draft.bot_processing_since,
            pack_seed: draft.pack_seed.clone(),
            created_at: draft.created_at,
            started_at: draft.started_at,
            completed_at: draft.completed_at,
            pick_started_at: draft.pick_started_at,
        })
    }

    pub fn to_domain(&self) -> DbResult<Draft> {
        let phase: PhaseState = serde_json::from_value(self.phase.clone())
            .map_err(|e| DbError::MappingError(format!("phase: {e}")))?;
        let settings: DraftSettings = serde_json::from_value(self.settings.clone())
            .map_err(|e| DbError::MappingError(format!("settings: {e}")))?;

        Ok(Draft {
            id: self.id,
            share_id: self.share_id.clone(),
            host_seat_id: self.host_seat_id,
            set_code: self.set_code.clone(),
            max_seats: self.max_seats,
            status: string_to_status(&self.status)?,
            phase,
            settings,
            paused: self.paused,
            paused_at: self.paused_at,
            paused_accumulated_seconds: self.paused_accumulated_seconds,
            state_version: self.state_version,
            bot_processing_since: self.bot_processing_since,
            pack_seed: self.pack_seed.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            pick_started_at: self.pick_started_at,
        })
    }
}

fn status_to_string(status: DraftStatus) -> String {
    match status {
        DraftStatus::Waiting => "waiting",
        DraftStatus::LeaderDraft => "leader_draft",
        DraftStatus::PackDraft => "pack_draft",
        DraftStatus::Completed => "completed",
        DraftStatus::Cancelled => "cancelled",
    }
    .to_string()
}

fn string_to_status(s: &str) -> DbResult<DraftStatus> {
    match s {
        "waiting" => Ok(DraftStatus::Waiting),
        "leader_draft" => Ok(DraftStatus::LeaderDraft),
        "pack_draft" => Ok(DraftStatus::PackDraft),
        "completed" => Ok(DraftStatus::Completed),
        "cancelled" => Ok(DraftStatus::Cancelled),
        other => Err(DbError::MappingError(format!("invalid draft status: {other}"))),
    }
}

/// Database model for the `draft_seats` table.
#[derive(Debug, Clone, FromRow)]
pub struct SeatDb {
    pub draft_id: Uuid,
    pub seat_id: Uuid,
    pub seat_number: i32,
    pub principal: String,
    pub is_bot: bool,
    pub leader_offering: serde_json::Value,
    pub drafted_leaders: serde_json::Value,
    pub current_pack: serde_json::Value,
    pub drafted_cards: serde_json::Value,
    pub pending_packs: serde_json::Value,
    pub pick_status: String,
    pub selected_card_id: Option<String>,
}

impl SeatDb {
    pub fn from_domain(seat: &Seat) -> DbResult<Self> {
        Ok(Self {
            draft_id: seat.draft_id,
            seat_id: seat.seat_id,
            seat_number: seat.seat_number,
            principal: seat.principal.clone(),
            is_bot: seat.is_bot,
            leader_offering: cards_to_json(&seat.leader_offering)?,
            drafted_leaders: cards_to_json(&seat.drafted_leaders)?,
            current_pack: cards_to_json(&seat.current_pack)?,
            drafted_cards: cards_to_json(&seat.drafted_cards)?,
            pending_packs: serde_json::to_value(&seat.pending_packs)
                .map_err(|e| DbError::MappingError(format!("pending_packs: {e}")))?,
            pick_status: pick_status_to_string(seat.pick_status),
            selected_card_id: seat.selected_card_id.as_ref().map(|c| c.0.clone()),
        })
    }

    pub fn to_domain(&self) -> DbResult<Seat> {
        Ok(Seat {
            draft_id: self.draft_id,
            seat_id: self.seat_id,
            seat_number: self.seat_number,
            principal: self.principal.clone(),
            is_bot: self.is_bot,
            leader_offering: cards_from_json(&self.leader_offering)?,
            drafted_leaders: cards_from_json(&self.drafted_leaders)?,
            current_pack: cards_from_json(&self.current_pack)?,
            drafted_cards: cards_from_json(&self.drafted_cards)?,
            pending_packs: serde_json::from_value(self.pending_packs.clone())
                .map_err(|e| DbError::MappingError(format!("pending_packs: {e}")))?,
            pick_status: string_to_pick_status(&self.pick_status)?,
            selected_card_id: self.selected_card_id.as_ref().map(|s| CardId(s.clone())),
        })
    }
}

fn cards_to_json(cards: &[CardId]) -> DbResult<serde_json::Value> {
    serde_json::to_value(cards).map_err(|e| DbError::MappingError(format!("cards: {e}")))
}

fn cards_from_json(value: &serde_json::Value) -> DbResult<Vec<CardId>> {
    serde_json::from_value(value.clone()).map_err(|e| DbError::MappingError(format!("cards: {e}")))
}

fn pick_status_to_string(status: PickStatus) -> String {
    match status {
        PickStatus::Idle => "idle",
        PickStatus::Picking => "picking",
        PickStatus::Selected => "selected",
        PickStatus::Picked => "picked",
    }
    .to_string()
}

fn string_to_pick_status(s: &str) -> DbResult<PickStatus> {
    match s {
        "idle" => Ok(PickStatus::Idle),
        "picking" => Ok(PickStatus::Picking),
        "selected" => Ok(PickStatus::Selected),
        "picked" => Ok(PickStatus::Picked),
        other => Err(DbError::MappingError(format!("invalid pick status: {other}"))),
    }
}
