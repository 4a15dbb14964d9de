//! String generators driven by an `AnalysisResult`.
//!
//! Every generator shares the analysis through an `Arc`, owns its random
//! source and implements `Generator`:
//! - `RandomGenerator`: independent per-position draws
//! - `SmartGenerator`: co-occurrence consistent draws
//! - `PatternGenerator`: draws constrained by a type pattern
//! - `MarkovGenerator`: character transitions of a given order
//! - `RegexGenerator` / `RegexInferenceGenerator`: regular expressions
//! - `HybridGenerator`: weighted mix of other generators

/// Generator contract, shared state and weighted sampling.
pub mod base;

/// Weighted mix of generators and presets.
pub mod hybrid;

/// Markov chain over characters.
pub mod markov;

/// Type pattern constrained generation.
pub mod pattern;

/// Independent per-position sampling.
pub mod random;

/// Regex compilation, generation and inference.
pub mod regex;

/// Co-occurrence constrained generation.
pub mod smart;

pub use self::base::{weighted_pick, GenerateIter, Generator, GeneratorConfig, GeneratorCore};
pub use self::hybrid::{HybridGenerator, HybridPreset};
pub use self::markov::MarkovGenerator;
pub use self::pattern::PatternGenerator;
pub use self::random::RandomGenerator;
pub use self::regex::{RegexGenerator, RegexInferenceGenerator};
pub use self::smart::SmartGenerator;
