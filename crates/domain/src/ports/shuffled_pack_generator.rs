use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;

use crate::errors::DomainResult;
use crate::models::CardId;
use crate::ports::pack_generator::{GeneratedContent, PackGenerator};

const LEADER_ROUNDS: usize = 3;
const PACK_ROUNDS: usize = 3;
const LEADER_OFFERING_SIZE: usize = 3;

/// A reference `PackGenerator` that deals cards from a synthetic,
/// deterministic catalog (`"{set_code}-{n}"` identifiers) shuffled by a
/// stored seed. Exists so the crate is runnable end-to-end without a
/// real card catalog service; production deployments swap in a real
/// implementation behind the same trait.
pub struct ShuffledPackGenerator;

impl ShuffledPackGenerator {
    pub fn new() -> Self {
        Self
    }

    fn catalog_card(set_code: &str, index: usize) -> CardId {
        CardId::from(format!("{set_code}-{index:04}"))
    }
}

impl Default for ShuffledPackGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackGenerator for ShuffledPackGenerator {
    async fn generate(&self, set_code: &str, seat_count: u8, pack_size: i32) -> DomainResult<GeneratedContent> {
        let seed: u64 = rand::rng().next_u64();
        let mut rng = StdRng::seed_from_u64(seed);
        let seat_count = seat_count as usize;
        let pack_size = pack_size as usize;

        let mut next_index = 0usize;
        let mut draw = |count: usize, rng: &mut StdRng| -> Vec<CardId> {
            let mut pool: Vec<CardId> = (0..count)
                .map(|_| {
                    let card = Self::catalog_card(set_code, next_index);
                    next_index += 1;
                    card
                })
                .collect();
            pool.shuffle(rng);
            pool
        };

        let mut leader_offerings = Vec::with_capacity(seat_count);
        for _ in 0..seat_count {
            let mut rounds = Vec::with_capacity(LEADER_ROUNDS);
            for _ in 0..LEADER_ROUNDS {
                rounds.push(draw(LEADER_OFFERING_SIZE, &mut rng));
            }
            leader_offerings.push(rounds);
        }

        let mut packs = Vec::with_capacity(seat_count);
        for _ in 0..seat_count {
            let mut seat_packs = Vec::with_capacity(PACK_ROUNDS);
            for _ in 0..PACK_ROUNDS {
                seat_packs.push(draw(pack_size, &mut rng));
            }
            packs.push(seat_packs);
        }

        Ok(GeneratedContent {
            leader_offerings,
            packs,
            seed: seed.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_expected_shapes() {
        let gen = ShuffledPackGenerator::new();
        let content = gen.generate("TST", 4, 14).await.unwrap();

        assert_eq!(content.leader_offerings.len(), 4);
        assert_eq!(content.leader_offerings[0].len(), LEADER_ROUNDS);
        assert_eq!(content.leader_offerings[0][0].len(), LEADER_OFFERING_SIZE);

        assert_eq!(content.packs.len(), 4);
        assert_eq!(content.packs[0].len(), PACK_ROUNDS);
        assert_eq!(content.packs[0][0].len(), 14);
    }
}
