use thiserror::Error;

/// Errors raised while building or combining corpus statistics.
///
/// An empty corpus is not an error: it yields an `AnalysisResult` with
/// `total_words == 0`, which data-driven generators then refuse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
	#[error("no analysis has been performed yet")]
	NotAnalyzed,

	#[error("invalid length window: min {min}, max {max}")]
	InvalidLengthWindow { min: usize, max: usize },

	#[error("word '{word}' has length {actual}, expected {expected}")]
	LengthMismatch {
		word: String,
		expected: usize,
		actual: usize,
	},

	#[error("cannot merge analyzers with different length windows")]
	WindowMismatch,
}

/// Errors raised when a generator cannot be set up.
///
/// Failures of a single candidate during a generation run are never
/// reported this way: they only show up as fewer results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
	#[error("insufficient data for generation: {required}")]
	InsufficientData { required: String },

	#[error("invalid generator configuration: {0}")]
	InvalidConfig(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegexError {
	#[error("invalid regex pattern '{pattern}': {reason}")]
	InvalidPattern { pattern: String, reason: String },

	/// Recorded, not returned: the construct is kept as literal text.
	#[error("regex pattern '{pattern}' contains unsupported feature: {feature}")]
	UnsupportedFeature { pattern: String, feature: String },
}

/// Crate-level error used by operations that mix analysis and I/O.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Analysis(#[from] AnalysisError),

	#[error(transparent)]
	Generation(#[from] GenerationError),

	#[error(transparent)]
	Regex(#[from] RegexError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
