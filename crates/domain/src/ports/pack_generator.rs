use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::CardId;

/// Output of a single `PackGenerator::generate` call: everything a
/// freshly-started draft needs to seed every seat's hands.
pub struct GeneratedContent {
    /// `leader_offerings[seat_index][round_index]`, round 0 only is
    /// ever consumed by TurnEngine (see DESIGN.md for why rounds 1/2
    /// come from rotation instead).
    pub leader_offerings: Vec<Vec<Vec<CardId>>>,
    /// `packs[seat_index][pack_index]`, one booster pack per seat per
    /// pack number.
    pub packs: Vec<Vec<Vec<CardId>>>,
    /// The seed used, so the same content can be reproduced later.
    pub seed: String,
}

/// External contract for sealed-pool and booster-pack generation.
/// Content layout (aspect balance, rarity slotting, duplicate policy) is
/// entirely opaque to the core; the core only consumes the returned
/// card identifiers.
#[async_trait]
pub trait PackGenerator: Send + Sync {
    async fn generate(&self, set_code: &str, seat_count: u8, pack_size: i32) -> DomainResult<GeneratedContent>;
}
