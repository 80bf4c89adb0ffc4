//! Historical fan table storage.

pub mod csv;
pub mod history;

pub use history::{update_history, HistoricalTable};
