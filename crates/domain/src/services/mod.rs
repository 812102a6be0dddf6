pub mod bot_runner;
pub mod broadcaster;
pub mod draft_service;
pub mod timeout_enforcer;
pub mod turn_engine;
pub mod view;

pub use bot_runner::{BotRunner, BOT_LEASE_MAX_AGE_SECONDS};
pub use broadcaster::{BroadcastEvent, Broadcaster};
pub use draft_service::DraftService;
pub use timeout_enforcer::TimeoutEnforcer;
