pub mod earnings;

pub use earnings::{EarningsEvent, EarningsPayload, PROVENANCE};
