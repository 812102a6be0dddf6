pub mod store;

pub use store::{CasOutcome, DraftAggregate, DraftStore};
