pub mod bot_behavior;
pub mod pack_generator;
pub mod shuffled_pack_generator;

pub use bot_behavior::{BotBehavior, BotSeatContext, HeuristicBotBehavior};
pub use pack_generator::{GeneratedContent, PackGenerator};
pub use shuffled_pack_generator::ShuffledPackGenerator;
