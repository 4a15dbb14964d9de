//! Data model produced by one analysis run.
//!
//! This module contains:
//! - Character classification (`CharacterClass`) and type patterns
//! - Per-position and per-length statistics (`PositionStats`, `LengthStats`)
//! - The positional co-occurrence index (`CooccurrenceIndex`)
//! - The immutable snapshot handed to generators (`AnalysisResult`)

/// The analysis snapshot and single-word breakdowns.
pub mod analysis;

/// Character classes (`U`, `l`, `n`, `@`) and type pattern helpers.
pub mod char_class;

/// Same-word positional pairings of characters.
pub mod cooccurrence;

/// Counters scoped by (length, position).
pub mod stats;

pub use analysis::{AnalysisResult, WordAnalysis};
pub use char_class::{parse_type_pattern, type_pattern, CharacterClass};
pub use cooccurrence::{CooccurrenceIndex, CooccurrenceKey};
pub use stats::{LengthStats, PositionStats};
