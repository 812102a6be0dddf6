use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::card::CardId;
use crate::models::draft::{DraftSettings, DraftStatus, PhaseState};
use crate::models::seat::PickStatus;

/// Per-seat fields safe to broadcast to every subscriber. Never includes
/// `leaderOffering`, `currentPack`, or `selectedCardId` — those are
/// fetched only by the authenticated seat owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicSeatView {
    pub seat_id: Uuid,
    pub seat_number: i32,
    pub principal: String,
    pub is_bot: bool,
    pub pick_status: PickStatus,
    pub drafted_leaders_summary: usize,
    pub drafted_card_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicDraftState {
    pub id: Uuid,
    pub share_id: String,
    pub host_seat_id: Uuid,
    pub set_code: String,
    pub max_seats: i32,
    pub status: DraftStatus,
    pub phase: PhaseState,
    pub settings: DraftSettings,
    pub paused: bool,
    pub state_version: i64,
    pub seats: Vec<PublicSeatView>,
}

/// The private hand of the seat owner, appended to `getState` responses
/// but never broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrivateHandView {
    pub seat_id: Uuid,
    pub leader_offering: Vec<CardId>,
    pub current_pack: Vec<CardId>,
    pub selected_card_id: Option<CardId>,
}
