use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Waiting,
    LeaderDraft,
    PackDraft,
    Completed,
    Cancelled,
}

impl DraftStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DraftStatus::Completed | DraftStatus::Cancelled)
    }

    pub fn is_active_pick_phase(&self) -> bool {
        matches!(self, DraftStatus::LeaderDraft | DraftStatus::PackDraft)
    }
}

/// The phase-specific part of draft state. Kept as an explicit union
/// keyed by `status` rather than a dynamic/optional bag of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseState {
    Waiting,
    LeaderDraft {
        leader_round: i32,
        last_picker_started_at: Option<DateTime<Utc>>,
    },
    PackDraft {
        pack_number: i32,
        pick_in_pack: i32,
        last_picker_started_at: Option<DateTime<Utc>>,
    },
    Completed,
    Cancelled,
}

impl PhaseState {
    pub fn last_picker_started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            PhaseState::LeaderDraft {
                last_picker_started_at,
                ..
            }
            | PhaseState::PackDraft {
                last_picker_started_at,
                ..
            } => *last_picker_started_at,
            _ => None,
        }
    }

    pub fn set_last_picker_started_at(&mut self, value: Option<DateTime<Utc>>) {
        match self {
            PhaseState::LeaderDraft {
                last_picker_started_at,
                ..
            }
            | PhaseState::PackDraft {
                last_picker_started_at,
                ..
            } => *last_picker_started_at = value,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DraftSettings {
    pub round_timer_enabled: bool,
    pub round_timer_seconds: i32,
    pub last_picker_timer_enabled: bool,
    pub last_picker_timer_seconds: i32,
    pub pack_size: i32,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            round_timer_enabled: true,
            round_timer_seconds: 120,
            last_picker_timer_enabled: true,
            last_picker_timer_seconds: 30,
            pack_size: 14,
        }
    }
}

/// Partial settings update, applied only while a draft is `waiting`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DraftSettingsPatch {
    pub round_timer_enabled: Option<bool>,
    pub round_timer_seconds: Option<i32>,
    pub last_picker_timer_enabled: Option<bool>,
    pub last_picker_timer_seconds: Option<i32>,
    pub pack_size: Option<i32>,
}

impl DraftSettings {
    pub fn apply_patch(&mut self, patch: &DraftSettingsPatch) {
        if let Some(v) = patch.round_timer_enabled {
            self.round_timer_enabled = v;
        }
        if let Some(v) = patch.round_timer_seconds {
            self.round_timer_seconds = v;
        }
        if let Some(v) = patch.last_picker_timer_enabled {
            self.last_picker_timer_enabled = v;
        }
        if let Some(v) = patch.last_picker_timer_seconds {
            self.last_picker_timer_seconds = v;
        }
        if let Some(v) = patch.pack_size {
            self.pack_size = v;
        }
    }
}

pub const MIN_SEATS: i32 = 2;
pub const MAX_SEATS: i32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Draft {
    pub id: Uuid,
    pub share_id: String,
    pub host_seat_id: Uuid,
    pub set_code: String,
    pub max_seats: i32,
    pub status: DraftStatus,
    pub phase: PhaseState,
    pub settings: DraftSettings,
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

impl Draft {
    pub fn new(share_id: String, host_seat_id: Uuid, set_code: String, max_seats: i32, now: DateTime<Utc>) -> DomainResult<Self> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&max_seats) {
            return Err(DomainError::ValidationError(format!(
                "max_seats must be between {MIN_SEATS} and {MAX_SEATS}"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            share_id,
            host_seat_id,
            set_code,
            max_seats,
            status: DraftStatus::Waiting,
            phase: PhaseState::Waiting,
            settings: DraftSettings::default(),
            paused: false,
            paused_at: None,
            paused_accumulated_seconds: 0,
            state_version: 0,
            bot_processing_since: None,
            pack_seed: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            pick_started_at: None,
        })
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        let pick_started_at = self.pick_started_at?;
        let raw = (now - pick_started_at).num_seconds();
        Some((raw - self.paused_accumulated_seconds).max(0))
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::DraftLocked(
                "draft already in a terminal state".to_string(),
            ));
        }
        self.status = DraftStatus::Cancelled;
        self.phase = PhaseState::Cancelled;
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.is_active_pick_phase() {
            return Err(DomainError::DraftLocked(
                "draft is not in an active pick phase".to_string(),
            ));
        }
        if self.paused {
            return Ok(());
        }
        self.paused = true;
        self.paused_at = Some(now);
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.paused {
            return Ok(());
        }
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_accumulated_seconds += (now - paused_at).num_seconds().max(0);
        }
        self.paused = false;
        Ok(())
    }
}
