use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::card::CardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PickStatus {
    Idle,
    Picking,
    Selected,
    Picked,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Seat {
    pub draft_id: Uuid,
    pub seat_id: Uuid,
    pub seat_number: i32,
    pub principal: String,
    pub is_bot: bool,
    pub leader_offering: Vec<CardId>,
    pub drafted_leaders: Vec<CardId>,
    pub current_pack: Vec<CardId>,
    pub drafted_cards: Vec<CardId>,
    pub pick_status: PickStatus,
    pub selected_card_id: Option<CardId>,
    /// Packs not yet placed into `current_pack`, queued in play order
    /// (pack 2, then pack 3). Populated once at `start`.
    pub pending_packs: Vec<Vec<CardId>>,
}

impl Seat {
    pub fn new_human(draft_id: Uuid, seat_number: i32, principal: String) -> Self {
        Self::new(draft_id, seat_number, principal, false)
    }

    pub fn new_bot(draft_id: Uuid, seat_number: i32, ordinal: u32) -> Self {
        Self::new(draft_id, seat_number, format!("bot:{ordinal}"), true)
    }

    fn new(draft_id: Uuid, seat_number: i32, principal: String, is_bot: bool) -> Self {
        Self {
            draft_id,
            seat_id: Uuid::new_v4(),
            seat_number,
            principal,
            is_bot,
            leader_offering: Vec::new(),
            drafted_leaders: Vec::new(),
            current_pack: Vec::new(),
            drafted_cards: Vec::new(),
            pick_status: PickStatus::Idle,
            selected_card_id: None,
            pending_packs: Vec::new(),
        }
    }

    /// The hand currently visible to this seat: the leader offering
    /// during leader draft, the current pack during pack draft.
    pub fn hand(&self, in_leader_phase: bool) -> &[CardId] {
        if in_leader_phase {
            &self.leader_offering
        } else {
            &self.current_pack
        }
    }

    pub fn hand_mut(&mut self, in_leader_phase: bool) -> &mut Vec<CardId> {
        if in_leader_phase {
            &mut self.leader_offering
        } else {
            &mut self.current_pack
        }
    }
}
