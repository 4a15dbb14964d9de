use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Key of the co-occurrence index: `character` was seen at index `from`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CooccurrenceKey {
	pub character: char,
	pub from: usize,
	pub to: usize,
}

/// Serialized form of one index entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CooccurrenceEntry {
	pub key: CooccurrenceKey,
	pub seen: BTreeSet<char>,
}

/// Which characters appeared at index `to` of a word while a given character
/// sat at index `from` of the same word.
///
/// The index is directed and recorded per word instance, for every ordered
/// pair of distinct indices. It is not scoped by word length: a long word
/// also strengthens the pairs it shares with shorter words.
///
/// Stored as one flat ordered map keyed by `(character, from, to)`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "Vec<CooccurrenceEntry>", into = "Vec<CooccurrenceEntry>")]
pub struct CooccurrenceIndex {
	entries: BTreeMap<CooccurrenceKey, BTreeSet<char>>,
}

impl CooccurrenceIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records every ordered pair `(i, j)`, `i != j`, of the word.
	pub fn record_word(&mut self, chars: &[char]) {
		for (from, character) in chars.iter().enumerate() {
			for (to, other) in chars.iter().enumerate() {
				if from == to {
					continue;
				}
				self.entries
					.entry(CooccurrenceKey { character: *character, from, to })
					.or_default()
					.insert(*other);
			}
		}
	}

	/// Characters seen at `to` while `character` was at `from`.
	pub fn get(&self, character: char, from: usize, to: usize) -> Option<&BTreeSet<char>> {
		self.entries.get(&CooccurrenceKey { character, from, to })
	}

	pub fn iter(&self) -> impl Iterator<Item = (&CooccurrenceKey, &BTreeSet<char>)> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Unions the sets of `other` into this index.
	pub fn merge(&mut self, other: &Self) {
		for (key, seen) in &other.entries {
			self.entries.entry(*key).or_default().extend(seen.iter().copied());
		}
	}
}

impl From<Vec<CooccurrenceEntry>> for CooccurrenceIndex {
	fn from(entries: Vec<CooccurrenceEntry>) -> Self {
		let mut index = Self::new();
		for entry in entries {
			index.entries.entry(entry.key).or_default().extend(entry.seen);
		}
		index
	}
}

impl From<CooccurrenceIndex> for Vec<CooccurrenceEntry> {
	fn from(index: CooccurrenceIndex) -> Self {
		index
			.entries
			.into_iter()
			.map(|(key, seen)| CooccurrenceEntry { key, seen })
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn index_of(words: &[&str]) -> CooccurrenceIndex {
		let mut index = CooccurrenceIndex::new();
		for word in words {
			let chars: Vec<char> = word.chars().collect();
			index.record_word(&chars);
		}
		index
	}

	#[test]
	fn records_all_ordered_pairs() {
		let index = index_of(&["abc", "abd", "aec"]);
		let set = |s: &str| s.chars().collect::<BTreeSet<char>>();
		assert_eq!(index.get('a', 0, 1), Some(&set("be")));
		assert_eq!(index.get('a', 0, 2), Some(&set("cd")));
		assert_eq!(index.get('c', 2, 0), Some(&set("a")));
		assert_eq!(index.get('a', 0, 0), None);
	}

	#[test]
	fn not_scoped_by_length() {
		let index = index_of(&["ab", "axyz"]);
		let seen = index.get('a', 0, 1).unwrap();
		assert!(seen.contains(&'b'));
		assert!(seen.contains(&'x'));
	}

	#[test]
	fn merge_is_a_union() {
		let mut left = index_of(&["ab"]);
		let right = index_of(&["ac"]);
		left.merge(&right);
		assert_eq!(left, index_of(&["ab", "ac"]));
	}
}
