pub mod country;
pub mod finance;
pub mod numeric;
pub mod pipeline;
pub mod watchlist;
pub mod writer;
