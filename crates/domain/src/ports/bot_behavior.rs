use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::CardId;

/// What a `BotBehavior` is allowed to see about the seat it is picking
/// for. Kept minimal and opaque — aspects/power are whatever the
/// concrete implementation's tables say they are.
pub struct BotSeatContext<'a> {
    pub drafted_leaders: &'a [CardId],
    pub drafted_cards: &'a [CardId],
}

/// Capability interface for bot seats. A seat keeps the same behavior
/// instance for the lifetime of the draft so implementations may carry
/// learning/affinity state across calls.
#[async_trait]
pub trait BotBehavior: Send + Sync {
    async fn select_leader(&self, offering: &[CardId], ctx: BotSeatContext<'_>) -> CardId;
    async fn select_card(&self, pack: &[CardId], ctx: BotSeatContext<'_>) -> CardId;
}

/// Default implementation: scores each candidate by a static
/// "powerful cards" table (falling back to a neutral score for unlisted
/// cards) plus a small bonus for cards sharing an aspect with what the
/// seat has already drafted. Ties break toward the first offered card
/// so behavior is deterministic given identical inputs.
pub struct HeuristicBotBehavior {
    power_table: HashMap<CardId, f64>,
    aspect_table: HashMap<CardId, String>,
}

impl HeuristicBotBehavior {
    pub fn new(power_table: HashMap<CardId, f64>, aspect_table: HashMap<CardId, String>) -> Self {
        Self {
            power_table,
            aspect_table,
        }
    }

    fn score(&self, card: &CardId, drafted: &[CardId]) -> f64 {
        let base = self.power_table.get(card).copied().unwrap_or(1.0);
        let aspect_bonus = match self.aspect_table.get(card) {
            Some(aspect) => {
                let shared = drafted
                    .iter()
                    .filter(|c| self.aspect_table.get(*c) == Some(aspect))
                    .count();
                shared as f64 * 0.1
            }
            None => 0.0,
        };
        base + aspect_bonus
    }

    fn choose(&self, options: &[CardId], drafted: &[CardId]) -> CardId {
        options
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                let sa = self.score(a, drafted);
                let sb = self.score(b, drafted);
                sa.partial_cmp(&sb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ib.cmp(ia))
            })
            .map(|(_, card)| card.clone())
            .unwrap_or_else(|| options[0].clone())
    }
}

impl Default for HeuristicBotBehavior {
    fn default() -> Self {
        Self::new(HashMap::new(), HashMap::new())
    }
}

#[async_trait]
impl BotBehavior for HeuristicBotBehavior {
    async fn select_leader(&self, offering: &[CardId], ctx: BotSeatContext<'_>) -> CardId {
        self.choose(offering, ctx.drafted_leaders)
    }

    async fn select_card(&self, pack: &[CardId], ctx: BotSeatContext<'_>) -> CardId {
        self.choose(pack, ctx.drafted_cards)
    }
}
