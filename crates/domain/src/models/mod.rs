pub mod card;
pub mod draft;
pub mod public_state;
pub mod seat;

pub use card::CardId;
pub use draft::{Draft, DraftSettings, DraftSettingsPatch, DraftStatus, PhaseState, MAX_SEATS, MIN_SEATS};
pub use public_state::{PrivateHandView, PublicDraftState, PublicSeatView};
pub use seat::{PickStatus, Seat};
