//! Generation of strings matching a regular expression.
//!
//! The pattern is compiled once into a list of instructions, executed with
//! the generator's random source, and every candidate is checked by a full
//! match with the `regex` crate before it is returned.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;

use super::base::{Generator, GeneratorConfig, GeneratorCore};
use crate::error::RegexError;
use crate::model::AnalysisResult;

/// ASCII sets behind class escapes, `.` and negated classes.
pub mod charset;

/// Pattern to instruction compiler.
pub mod compiler;

/// Regexes inferred from the corpus type patterns.
pub mod inference;

pub use compiler::{Group, Instruction, InstructionKind, Quantifier};
pub use inference::RegexInferenceGenerator;

/// A compiled pattern: generation instructions plus a full-match validator.
#[derive(Debug)]
pub struct RegexPlan {
	pattern: String,
	instructions: Vec<Instruction>,
	unsupported: Vec<RegexError>,
	validator: ::regex::Regex,
}

impl RegexPlan {
	/// # Errors
	/// `InvalidPattern` if the pattern is malformed, or if the `regex` crate
	/// rejects it (lookaround and backreferences included).
	pub fn compile(pattern: &str) -> Result<Self, RegexError> {
		let compiled = compiler::compile(pattern)?;
		let source = &compiled.validation_source;
		let validator = ::regex::Regex::new(&format!("^(?:{source})$")).map_err(|e| RegexError::InvalidPattern {
			pattern: pattern.to_owned(),
			reason: e.to_string(),
		})?;

		Ok(Self {
			pattern: pattern.to_owned(),
			instructions: compiled.instructions,
			unsupported: compiled.unsupported,
			validator,
		})
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn instructions(&self) -> &[Instruction] {
		&self.instructions
	}

	pub fn unsupported_features(&self) -> &[RegexError] {
		&self.unsupported
	}

	/// Full match of the whole string.
	pub fn is_match(&self, candidate: &str) -> bool {
		self.validator.is_match(candidate)
	}

	/// Executes the instructions once and validates the result.
	///
	/// With `learned`, class draws are limited to its characters whenever
	/// the class and `learned` intersect.
	pub fn render<R: Rng + ?Sized>(&self, rng: &mut R, learned: Option<&BTreeSet<char>>) -> Option<String> {
		let mut out = String::new();
		emit(&self.instructions, rng, learned, &mut out);
		self.is_match(&out).then_some(out)
	}
}

fn emit<R: Rng + ?Sized>(instructions: &[Instruction], rng: &mut R, learned: Option<&BTreeSet<char>>, out: &mut String) {
	for instruction in instructions {
		let Quantifier { min, max } = instruction.quantifier;
		let count = if min == max { min } else { rng.random_range(min..=max) };

		for _ in 0..count {
			match &instruction.kind {
				InstructionKind::Literal(c) => out.push(*c),
				InstructionKind::Class(chars) => {
					let filtered: Vec<char> = match learned {
						Some(learned) => chars.iter().copied().filter(|c| learned.contains(c)).collect(),
						None => Vec::new(),
					};
					let pool: &[char] = if filtered.is_empty() { chars } else { &filtered };
					if !pool.is_empty() {
						out.push(pool[rng.random_range(0..pool.len())]);
					}
				}
				InstructionKind::Group(group) => emit(&group.body, rng, learned, out),
				InstructionKind::Alternation(options) => {
					if !options.is_empty() {
						let option = &options[rng.random_range(0..options.len())];
						emit(&option.body, rng, learned, out);
					}
				}
			}
		}
	}
}

/// Generates strings matching a user supplied regular expression.
///
/// Candidates that do not fully match the pattern are dropped, so patterns
/// using constructs outside the compiler's grammar only lower the success
/// rate. Works without corpus data: an empty analysis simply disables the
/// learned charset.
pub struct RegexGenerator {
	core: GeneratorCore,
	plan: RegexPlan,
	use_learned_charset: bool,
}

impl RegexGenerator {
	/// # Errors
	/// `InvalidPattern`, see `RegexPlan::compile`.
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig, pattern: &str) -> Result<Self, RegexError> {
		Ok(Self {
			core: GeneratorCore::new(analysis, &config),
			plan: RegexPlan::compile(pattern)?,
			use_learned_charset: true,
		})
	}

	/// When enabled (the default), class draws prefer characters seen in the
	/// corpus.
	pub fn with_learned_charset(mut self, enabled: bool) -> Self {
		self.use_learned_charset = enabled;
		self
	}

	pub fn use_learned_charset(&self) -> bool {
		self.use_learned_charset
	}

	pub fn pattern(&self) -> &str {
		self.plan.pattern()
	}

	/// Compiled instructions, read-only.
	pub fn instructions(&self) -> &[Instruction] {
		self.plan.instructions()
	}

	/// Constructs that were kept as literal text.
	pub fn unsupported_features(&self) -> &[RegexError] {
		self.plan.unsupported_features()
	}

	pub fn is_match(&self, candidate: &str) -> bool {
		self.plan.is_match(candidate)
	}
}

impl Generator for RegexGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	fn generate_one(&mut self) -> Option<String> {
		let analysis = self.core.shared_analysis();
		let learned = self.use_learned_charset.then(|| analysis.charset());
		self.plan.render(self.core.rng(), learned)
	}
}
