use crate::models::draft::Draft;
use crate::models::public_state::{PrivateHandView, PublicDraftState, PublicSeatView};
use crate::models::seat::Seat;

/// Projects the full aggregate down to the shape safe to broadcast to
/// every subscriber, regardless of which seat (if any) they own.
pub fn project_public_state(draft: &Draft, seats: &[Seat]) -> PublicDraftState {
    PublicDraftState {
        id: draft.id,
        share_id: draft.share_id.clone(),
        host_seat_id: draft.host_seat_id,
        set_code: draft.set_code.clone(),
        max_seats: draft.max_seats,
        status: draft.status,
        phase: draft.phase.clone(),
        settings: draft.settings.clone(),
        paused: draft.paused,
        state_version: draft.state_version,
        seats: seats.iter().map(project_public_seat).collect(),
    }
}

fn project_public_seat(seat: &Seat) -> PublicSeatView {
    PublicSeatView {
        seat_id: seat.seat_id,
        seat_number: seat.seat_number,
        principal: seat.principal.clone(),
        is_bot: seat.is_bot,
        pick_status: seat.pick_status,
        drafted_leaders_summary: seat.drafted_leaders.len(),
        drafted_card_count: seat.drafted_cards.len(),
    }
}

/// The requesting seat's own hand, appended to `getState` responses for
/// the authenticated owner only.
pub fn project_private_hand(seat: &Seat, _in_leader_phase: bool) -> PrivateHandView {
    PrivateHandView {
        seat_id: seat.seat_id,
        leader_offering: seat.leader_offering.clone(),
        current_pack: seat.current_pack.clone(),
        selected_card_id: seat.selected_card_id.clone(),
    }
}
