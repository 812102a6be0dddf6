pub mod draft;

pub use draft::{DraftDb, SeatDb};
