//! Pure state-machine functions: no I/O, no clock except a passed-in
//! `now`. This is the only place draft/seat state conceptually mutates.
//! Authorization (host-only, seat-ownership) is resolved by the facade
//! before calling in — these functions operate on already-resolved
//! `Draft`/`Seat` values.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::errors::{DomainError, DomainResult};
use crate::models::card::CardId;
use crate::models::draft::{Draft, DraftStatus, PhaseState, MAX_SEATS};
use crate::models::seat::{PickStatus, Seat};
use crate::ports::pack_generator::GeneratedContent;

pub fn join_seat(draft: &Draft, seats: &[Seat], principal: &str) -> DomainResult<Seat> {
    if draft.status != DraftStatus::Waiting {
        return Err(DomainError::DraftLocked("draft is not waiting for seats".to_string()));
    }
    if seats.iter().any(|s| s.principal == principal) {
        return Err(DomainError::AlreadyJoined);
    }
    if seats.len() as i32 >= draft.max_seats {
        return Err(DomainError::DraftFull);
    }

    let seat_number = lowest_free_seat_number(seats, draft.max_seats)?;
    Ok(Seat::new_human(draft.id, seat_number, principal.to_string()))
}

pub fn add_bot(draft: &Draft, seats: &[Seat], ordinal: u32) -> DomainResult<Seat> {
    if draft.status != DraftStatus::Waiting {
        return Err(DomainError::DraftLocked("draft is not waiting for seats".to_string()));
    }
    if seats.len() as i32 >= draft.max_seats {
        return Err(DomainError::DraftFull);
    }

    let seat_number = lowest_free_seat_number(seats, draft.max_seats)?;
    Ok(Seat::new_bot(draft.id, seat_number, ordinal))
}

/// Host leaving is not modeled — the host seat is fixed for the life of
/// the draft, matching `hostSeatId` being an immutable draft field.
pub fn leave_seat(draft: &Draft, seats: &mut Vec<Seat>, principal: &str) -> DomainResult<()> {
    if draft.status != DraftStatus::Waiting {
        return Err(DomainError::DraftLocked("draft is not waiting for seats".to_string()));
    }
    let idx = seats
        .iter()
        .position(|s| s.principal == principal)
        .ok_or(DomainError::NotSeatOwner)?;

    if seats[idx].seat_id == draft.host_seat_id {
        return Err(DomainError::DraftLocked("the host cannot leave the draft".to_string()));
    }

    seats.remove(idx);
    Ok(())
}

pub fn randomize_seats(draft: &Draft, seats: &mut [Seat], rng: &mut impl Rng) -> DomainResult<()> {
    if draft.status != DraftStatus::Waiting {
        return Err(DomainError::DraftLocked("draft is not waiting for seats".to_string()));
    }

    let mut numbers: Vec<i32> = seats.iter().map(|s| s.seat_number).collect();
    // Fisher-Yates over the assigned numbers, then redistribute; this
    // permutes seat_number without touching identity/principal pairing.
    for i in (1..numbers.len()).rev() {
        let j = rng.random_range(0..=i);
        numbers.swap(i, j);
    }
    for (seat, number) in seats.iter_mut().zip(numbers) {
        seat.seat_number = number;
    }
    Ok(())
}

fn lowest_free_seat_number(seats: &[Seat], max_seats: i32) -> DomainResult<i32> {
    let taken: std::collections::HashSet<i32> = seats.iter().map(|s| s.seat_number).collect();
    (1..=max_seats)
        .find(|n| !taken.contains(n))
        .ok_or(DomainError::DraftFull)
}

fn seat_order(seats: &[Seat]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..seats.len()).collect();
    order.sort_by_key(|&i| seats[i].seat_number);
    order
}

pub fn start(draft: &mut Draft, seats: &mut [Seat], now: DateTime<Utc>, content: GeneratedContent) -> DomainResult<()> {
    if draft.status != DraftStatus::Waiting {
        return Err(DomainError::DraftLocked("draft already started".to_string()));
    }
    if seats.len() < 2 {
        return Err(DomainError::TooFewPlayers);
    }
    if seats.len() as i32 > MAX_SEATS {
        return Err(DomainError::ValidationError("too many seats".to_string()));
    }

    let order = seat_order(seats);

    for (seat_index, &i) in order.iter().enumerate() {
        let seat = &mut seats[i];
        // Only round 1 is ever placed directly; rounds 2/3 of the
        // generator's output are intentionally unused (see DESIGN.md —
        // later rounds are derived by rotating the residual instead).
        seat.leader_offering = content
            .leader_offerings
            .get(seat_index)
            .and_then(|rounds| rounds.first())
            .cloned()
            .unwrap_or_default();
        seat.pending_packs = content.packs.get(seat_index).cloned().unwrap_or_default();
        seat.current_pack.clear();
        seat.drafted_leaders.clear();
        seat.drafted_cards.clear();
        seat.selected_card_id = None;
        seat.pick_status = if seat.leader_offering.is_empty() {
            PickStatus::Idle
        } else {
            PickStatus::Picking
        };
    }

    draft.pack_seed = Some(content.seed);
    draft.status = DraftStatus::LeaderDraft;
    draft.phase = PhaseState::LeaderDraft {
        leader_round: 1,
        last_picker_started_at: None,
    };
    draft.started_at = Some(now);
    draft.pick_started_at = Some(now);
    Ok(())
}

/// `card_id = None` unselects. Never advances the round by itself.
pub fn select(seat: &mut Seat, in_leader_phase: bool, card_id: Option<CardId>) -> DomainResult<()> {
    if !matches!(seat.pick_status, PickStatus::Picking | PickStatus::Selected) {
        return Err(DomainError::InvalidSelection(
            "seat is not currently picking".to_string(),
        ));
    }

    match card_id {
        None => {
            seat.selected_card_id = None;
            seat.pick_status = PickStatus::Picking;
        }
        Some(card) => {
            let hand = seat.hand(in_leader_phase);
            if !hand.contains(&card) {
                return Err(DomainError::StateChanged);
            }
            seat.selected_card_id = Some(card);
            seat.pick_status = PickStatus::Selected;
        }
    }
    Ok(())
}

/// Precondition: every seat has `pick_status = Selected`. Commits every
/// staged pick, rotates residual hands, and advances the phase.
pub fn commit_round(draft: &mut Draft, seats: &mut [Seat], now: DateTime<Utc>) -> DomainResult<()> {
    if !draft.status.is_active_pick_phase() {
        return Err(DomainError::DraftLocked("draft is not in an active pick phase".to_string()));
    }

    let participating: Vec<usize> = (0..seats.len())
        .filter(|&i| !seats[i].hand(draft.status == DraftStatus::LeaderDraft).is_empty() || seats[i].pick_status != PickStatus::Idle)
        .collect();
    if participating.iter().any(|&i| seats[i].pick_status != PickStatus::Selected) {
        return Err(DomainError::ValidationError(
            "not every seat has a finalized selection".to_string(),
        ));
    }

    let order = seat_order(seats);
    let n = order.len();

    for &i in &order {
        let seat = &mut seats[i];
        let Some(card) = seat.selected_card_id.take() else {
            continue;
        };
        let in_leader_phase = draft.status == DraftStatus::LeaderDraft;
        let hand = seat.hand_mut(in_leader_phase);
        let pos = hand
            .iter()
            .position(|c| c == &card)
            .ok_or_else(|| DomainError::InvalidSelection("staged card no longer in hand".to_string()))?;
        hand.remove(pos);
        if in_leader_phase {
            seat.drafted_leaders.push(card);
        } else {
            seat.drafted_cards.push(card);
        }
        seat.pick_status = PickStatus::Picked;
    }

    match draft.status {
        DraftStatus::LeaderDraft => commit_leader_round(draft, seats, &order, n, now),
        DraftStatus::PackDraft => commit_pack_round(draft, seats, &order, n, now),
        _ => unreachable!("guarded by is_active_pick_phase"),
    }
}

fn commit_leader_round(draft: &mut Draft, seats: &mut [Seat], order: &[usize], n: usize, now: DateTime<Utc>) -> DomainResult<()> {
    let leader_round = match draft.phase {
        PhaseState::LeaderDraft { leader_round, .. } => leader_round,
        _ => unreachable!(),
    };

    let is_last_round = leader_round >= 3;
    if !is_last_round {
        // rotate residual RIGHT: seat at position k's residual goes to
        // the seat at position k+1 (mod n).
        let residuals: Vec<Vec<CardId>> = order.iter().map(|&i| std::mem::take(&mut seats[i].leader_offering)).collect();
        for (pos, &i) in order.iter().enumerate() {
            let source = (pos + n - 1) % n;
            seats[i].leader_offering = residuals[source].clone();
        }
    }

    let next_round = leader_round + 1;
    if next_round > 3 {
        draft.status = DraftStatus::PackDraft;
        draft.phase = PhaseState::PackDraft {
            pack_number: 1,
            pick_in_pack: 1,
            last_picker_started_at: None,
        };
        for &i in order {
            start_pack_for_seat(&mut seats[i]);
        }
    } else {
        draft.phase = PhaseState::LeaderDraft {
            leader_round: next_round,
            last_picker_started_at: None,
        };
        for &i in order {
            let seat = &mut seats[i];
            seat.pick_status = if seat.leader_offering.is_empty() {
                PickStatus::Idle
            } else {
                PickStatus::Picking
            };
        }
    }

    draft.pick_started_at = Some(now);
    Ok(())
}

fn commit_pack_round(draft: &mut Draft, seats: &mut [Seat], order: &[usize], n: usize, now: DateTime<Utc>) -> DomainResult<()> {
    let (pack_number, _pick_in_pack) = match draft.phase {
        PhaseState::PackDraft { pack_number, pick_in_pack, .. } => (pack_number, pick_in_pack),
        _ => unreachable!(),
    };

    // direction: LEFT for odd pack_number, RIGHT for even
    let rotate_left = pack_number % 2 == 1;
    let residuals: Vec<Vec<CardId>> = order.iter().map(|&i| std::mem::take(&mut seats[i].current_pack)).collect();
    for (pos, &i) in order.iter().enumerate() {
        let source = if rotate_left { (pos + 1) % n } else { (pos + n - 1) % n };
        seats[i].current_pack = residuals[source].clone();
    }

    let pack_exhausted = order.iter().all(|&i| seats[i].current_pack.is_empty());

    if pack_exhausted {
        let next_pack_number = pack_number + 1;
        if next_pack_number > 3 {
            draft.status = DraftStatus::Completed;
            draft.phase = PhaseState::Completed;
            draft.completed_at = Some(now);
            for &i in order {
                seats[i].pick_status = PickStatus::Idle;
            }
            return Ok(());
        }

        draft.phase = PhaseState::PackDraft {
            pack_number: next_pack_number,
            pick_in_pack: 1,
            last_picker_started_at: None,
        };
        for &i in order {
            start_pack_for_seat(&mut seats[i]);
        }
    } else {
        draft.phase = PhaseState::PackDraft {
            pack_number,
            pick_in_pack: _pick_in_pack + 1,
            last_picker_started_at: None,
        };
        for &i in order {
            let seat = &mut seats[i];
            seat.pick_status = if seat.current_pack.is_empty() {
                PickStatus::Idle
            } else {
                PickStatus::Picking
            };
        }
    }

    draft.pick_started_at = Some(now);
    Ok(())
}

fn start_pack_for_seat(seat: &mut Seat) {
    seat.current_pack = if seat.pending_packs.is_empty() {
        Vec::new()
    } else {
        seat.pending_packs.remove(0)
    };
    seat.pick_status = if seat.current_pack.is_empty() {
        PickStatus::Idle
    } else {
        PickStatus::Picking
    };
}

/// Used by the TimeoutEnforcer: if `selected_card_id` is null, pick a
/// uniformly random card from the current hand.
pub fn force_random(seat: &mut Seat, in_leader_phase: bool, rng: &mut impl Rng) -> DomainResult<()> {
    if seat.selected_card_id.is_some() {
        return Ok(());
    }
    let hand = seat.hand(in_leader_phase);
    if hand.is_empty() {
        return Ok(());
    }
    let idx = rng.random_range(0..hand.len());
    let card = hand[idx].clone();
    seat.selected_card_id = Some(card);
    seat.pick_status = PickStatus::Selected;
    Ok(())
}
