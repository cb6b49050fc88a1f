pub mod dedup;
pub mod enrich;

pub use dedup::{DedupConfig, ResultDeduplicator};
pub use enrich::{EnrichedText, PunctuationStyle, TextEnricher};
