//! Corpus analysis and plausible string generation.
//!
//! This crate learns the structure of a list of short strings (passwords,
//! usernames, tokens) and generates new strings that look like they belong
//! to it:
//! - Per-length, per-position character statistics and type patterns
//! - Positional co-occurrence of characters within a word
//! - Generators working from those statistics, from a Markov chain or from
//!   a regular expression
//! - A postcard binary cache of analyses
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wordgen_core::analyzer::{Analyzer, AnalyzerConfig};
//! use wordgen_core::generator::{Generator, GeneratorConfig, SmartGenerator};
//!
//! # fn main() -> wordgen_core::error::Result<()> {
//! let analysis = Analyzer::new(AnalyzerConfig::default())?.analyze(["Pass12", "Word34", "Test56"])?;
//! let mut generator = SmartGenerator::new(Arc::new(analysis), GeneratorConfig::seeded(42))?;
//! let words = generator.generate(10, 0);
//! # Ok(())
//! # }
//! ```

/// Corpus ingestion and statistics building.
pub mod analyzer;

/// Error types shared by the whole crate.
pub mod error;

/// Generators consuming an analysis.
pub mod generator;

/// Wordlist loading, analysis cache and path helpers.
pub mod io;

/// Statistics produced by the analyzer.
pub mod model;

pub use analyzer::{Analyzer, AnalyzerConfig};
pub use error::{Error, Result};
pub use model::AnalysisResult;
