//! ASCII character sets behind regex classes.
//!
//! Generation only ever draws from printable ASCII, so every set here is a
//! subset of what the matching class accepts in the `regex` crate.

use std::collections::BTreeSet;

pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Whitespace drawn for `\s`.
pub const SPACES: &str = " \t\n\r";

fn letters() -> impl Iterator<Item = char> {
	('A'..='Z').chain('a'..='z')
}

fn digits() -> impl Iterator<Item = char> {
	'0'..='9'
}

fn punctuation() -> impl Iterator<Item = char> {
	PUNCTUATION.chars()
}

/// Digits, letters, punctuation, then whitespace including `\x0b` and `\x0c`.
pub fn printable() -> Vec<char> {
	digits()
		.chain(letters())
		.chain(punctuation())
		.chain(" \t\n\r\u{b}\u{c}".chars())
		.collect()
}

/// `.`: printable characters except line breaks.
pub fn any() -> Vec<char> {
	printable().into_iter().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Set of a class escape (`\d`, `\w`, `\s` and their negations).
///
/// `None` if `escape` is not a class letter.
pub fn escape_class(escape: char) -> Option<Vec<char>> {
	let chars = match escape {
		'd' => digits().collect(),
		'w' => letters().chain(digits()).chain(['_']).collect(),
		's' => SPACES.chars().collect(),
		'D' => letters().chain(punctuation()).chain([' ']).collect(),
		// '_' is a word character
		'W' => punctuation().filter(|c| *c != '_').chain([' ']).collect(),
		'S' => letters().chain(digits()).chain(punctuation()).collect(),
		_ => return None,
	};
	Some(chars)
}

/// Printable characters not in `excluded`.
pub fn complement(excluded: &[char]) -> Vec<char> {
	let excluded: BTreeSet<char> = excluded.iter().copied().collect();
	printable().into_iter().filter(|c| !excluded.contains(c)).collect()
}

/// Sorted, without duplicates.
pub fn normalize(chars: Vec<char>) -> Vec<char> {
	let set: BTreeSet<char> = chars.into_iter().collect();
	set.into_iter().collect()
}
