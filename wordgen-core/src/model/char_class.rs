use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a single character.
///
/// Each class has a one-character symbol used to spell type patterns:
/// `U` upper, `l` lower, `n` digit, `@` anything else.
/// Example: `"Pass12!"` has the type pattern `"Ulllnn@"`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharacterClass {
	Upper,
	Lower,
	Digit,
	Symbol,
}

impl CharacterClass {
	pub const ALL: [CharacterClass; 4] = [Self::Upper, Self::Lower, Self::Digit, Self::Symbol];

	/// Classifies a character. Pure and total, no locale involved.
	pub fn from_char(c: char) -> Self {
		if c.is_uppercase() {
			Self::Upper
		} else if c.is_lowercase() {
			Self::Lower
		} else if c.is_ascii_digit() {
			Self::Digit
		} else {
			Self::Symbol
		}
	}

	pub fn symbol(self) -> char {
		match self {
			Self::Upper => 'U',
			Self::Lower => 'l',
			Self::Digit => 'n',
			Self::Symbol => '@',
		}
	}

	pub fn from_symbol(symbol: char) -> Option<Self> {
		match symbol {
			'U' => Some(Self::Upper),
			'l' => Some(Self::Lower),
			'n' => Some(Self::Digit),
			'@' => Some(Self::Symbol),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Upper => "Upper",
			Self::Lower => "Lower",
			Self::Digit => "Digit",
			Self::Symbol => "Symbol",
		}
	}

	/// Returns `true` if `c` belongs to this class.
	pub fn contains(self, c: char) -> bool {
		Self::from_char(c) == self
	}
}

impl fmt::Display for CharacterClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// Derives the type pattern of a word, one symbol per character.
pub fn type_pattern(word: &str) -> String {
	word.chars().map(|c| CharacterClass::from_char(c).symbol()).collect()
}

/// Parses a type pattern such as `"Ullnn"`.
///
/// Returns `None` if any symbol is not one of `U`, `l`, `n`, `@`.
pub fn parse_type_pattern(pattern: &str) -> Option<Vec<CharacterClass>> {
	pattern.chars().map(CharacterClass::from_symbol).collect()
}
