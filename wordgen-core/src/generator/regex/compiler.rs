use log::warn;

use super::charset;
use crate::error::RegexError;

/// Repetitions added on top of the minimum for `*`, `+` and `{m,}`.
///
/// Only bounds generation; matching still accepts any count.
pub const UNBOUNDED_EXTRA: usize = 10;

/// Inclusive repetition range of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quantifier {
	pub min: usize,
	pub max: usize,
}

impl Quantifier {
	pub const ONE: Self = Self { min: 1, max: 1 };

	pub fn new(min: usize, max: usize) -> Self {
		Self { min, max }
	}
}

/// Parenthesized sub-pattern, or one option of an alternation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
	/// Text of the sub-pattern, without its delimiters.
	pub source: String,
	pub body: Vec<Instruction>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstructionKind {
	Literal(char),
	/// Sorted, duplicate free.
	Class(Vec<char>),
	Group(Group),
	Alternation(Vec<Group>),
}

/// One generation step: emit `kind` a number of times within `quantifier`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
	pub kind: InstructionKind,
	pub quantifier: Quantifier,
}

impl Instruction {
	fn once(kind: InstructionKind) -> Self {
		Self { kind, quantifier: Quantifier::ONE }
	}
}

/// Instructions of a pattern plus the constructs that were kept as literal
/// text because generation does not understand them.
#[derive(Debug)]
pub struct Compiled {
	pub instructions: Vec<Instruction>,
	pub unsupported: Vec<RegexError>,
	/// The pattern with `{,n}` spelled `{0,n}`, as the `regex` crate wants it.
	pub validation_source: String,
}

/// Compiles `pattern` into generation instructions.
///
/// # Errors
/// `InvalidPattern` on malformed syntax: unclosed `[` or `(`, stray `)`,
/// reversed range or bounds, dangling `\`.
pub fn compile(pattern: &str) -> Result<Compiled, RegexError> {
	let chars: Vec<char> = pattern.chars().collect();
	let mut compiler = Compiler { pattern, unsupported: Vec::new() };
	let instructions = compiler.sequence(&chars)?;
	Ok(Compiled { instructions, unsupported: compiler.unsupported, validation_source: validation_source(&chars) })
}

/// Copies `chars`, adding the implicit `0` of a `{,n}` or `{,}` quantifier.
///
/// Escapes and bracket classes are copied untouched.
fn validation_source(chars: &[char]) -> String {
	let mut out = String::with_capacity(chars.len() + 2);
	let mut in_class = false;
	let mut i = 0;
	while i < chars.len() {
		let c = chars[i];
		out.push(c);
		match c {
			'\\' => {
				if let Some(next) = chars.get(i + 1) {
					out.push(*next);
					i += 1;
				}
			}
			'[' if !in_class => {
				in_class = true;
				// A leading ']' is a member
				if chars.get(i + 1) == Some(&'^') {
					out.push('^');
					i += 1;
				}
				if chars.get(i + 1) == Some(&']') {
					out.push(']');
					i += 1;
				}
			}
			']' if in_class => in_class = false,
			'{' if !in_class && chars.get(i + 1) == Some(&',') => {
				let bound = chars[i + 2..].iter().take_while(|c| c.is_ascii_digit()).count();
				if chars.get(i + 2 + bound) == Some(&'}') {
					out.push('0');
				}
			}
			_ => {}
		}
		i += 1;
	}
	out
}

struct Compiler<'a> {
	pattern: &'a str,
	unsupported: Vec<RegexError>,
}

impl Compiler<'_> {
	fn invalid(&self, reason: impl Into<String>) -> RegexError {
		RegexError::InvalidPattern { pattern: self.pattern.to_owned(), reason: reason.into() }
	}

	fn unsupported(&mut self, feature: impl Into<String>) {
		let error = RegexError::UnsupportedFeature { pattern: self.pattern.to_owned(), feature: feature.into() };
		warn!("{error}, kept as literal text");
		self.unsupported.push(error);
	}

	/// A `|` outside any group turns the whole sequence into one alternation.
	fn sequence(&mut self, text: &[char]) -> Result<Vec<Instruction>, RegexError> {
		let options = self.split_alternatives(text)?;
		if options.len() > 1 {
			let groups = options.into_iter().map(|option| self.group(option)).collect::<Result<_, _>>()?;
			return Ok(vec![Instruction::once(InstructionKind::Alternation(groups))]);
		}
		self.atoms(text)
	}

	fn group(&mut self, text: &[char]) -> Result<Group, RegexError> {
		Ok(Group { source: text.iter().collect(), body: self.atoms(text)? })
	}

	fn split_alternatives<'t>(&self, text: &'t [char]) -> Result<Vec<&'t [char]>, RegexError> {
		let mut options = Vec::new();
		let mut depth = 0usize;
		let mut start = 0;
		let mut i = 0;
		while i < text.len() {
			match text[i] {
				'\\' => i += 1,
				'[' => i = self.class_end(text, i)?,
				'(' => depth += 1,
				')' => {
					if depth == 0 {
						return Err(self.invalid(format!("unbalanced ')' at {i}")));
					}
					depth -= 1;
				}
				'|' if depth == 0 => {
					options.push(&text[start..i]);
					start = i + 1;
				}
				_ => {}
			}
			i += 1;
		}
		if depth > 0 {
			return Err(self.invalid("unclosed group"));
		}
		options.push(&text[start..]);
		Ok(options)
	}

	/// Index of the `]` closing the class opened at `open`.
	///
	/// A `]` right after `[` or `[^` is a member, not the end.
	fn class_end(&self, text: &[char], open: usize) -> Result<usize, RegexError> {
		let mut i = open + 1;
		if text.get(i) == Some(&'^') {
			i += 1;
		}
		if text.get(i) == Some(&']') {
			i += 1;
		}
		while i < text.len() {
			match text[i] {
				'\\' => i += 2,
				']' => return Ok(i),
				_ => i += 1,
			}
		}
		Err(self.invalid(format!("unclosed character class at {open}")))
	}

	/// Index of the `)` closing the group opened at `open`.
	fn group_end(&self, text: &[char], open: usize) -> Result<usize, RegexError> {
		let mut depth = 0usize;
		let mut i = open;
		while i < text.len() {
			match text[i] {
				'\\' => i += 1,
				'[' => i = self.class_end(text, i)?,
				'(' => depth += 1,
				')' => {
					depth -= 1;
					if depth == 0 {
						return Ok(i);
					}
				}
				_ => {}
			}
			i += 1;
		}
		Err(self.invalid(format!("unclosed group at {open}")))
	}

	fn atoms(&mut self, text: &[char]) -> Result<Vec<Instruction>, RegexError> {
		let mut instructions = Vec::new();
		let mut i = 0;
		while i < text.len() {
			let (kind, next) = match text[i] {
				// Anchors do not produce anything
				'^' | '$' => {
					i += 1;
					continue;
				}
				// Nothing to repeat
				'?' | '*' | '+' => {
					i += 1;
					continue;
				}
				'\\' => self.escape(text, i)?,
				'[' => {
					let end = self.class_end(text, i)?;
					(InstructionKind::Class(self.bracket(&text[i + 1..end])?), end + 1)
				}
				'.' => (InstructionKind::Class(charset::any()), i + 1),
				'(' => {
					let end = self.group_end(text, i)?;
					(self.parenthesized(&text[i + 1..end])?, end + 1)
				}
				')' => return Err(self.invalid(format!("unbalanced ')' at {i}"))),
				c => (InstructionKind::Literal(c), i + 1),
			};
			let (quantifier, next) = self.quantifier(text, next)?;
			instructions.push(Instruction { kind, quantifier });
			i = next;
		}
		Ok(instructions)
	}

	/// Escape starting with the `\` at `i`; returns the kind and the index
	/// right after it.
	fn escape(&mut self, text: &[char], i: usize) -> Result<(InstructionKind, usize), RegexError> {
		let Some(&c) = text.get(i + 1) else {
			return Err(self.invalid("dangling '\\' at end of pattern"));
		};
		if let Some(chars) = charset::escape_class(c) {
			return Ok((InstructionKind::Class(chars), i + 2));
		}

		let kind = match c {
			'b' | 'B' | 'A' | 'z' | 'Z' => {
				self.unsupported(format!("assertion \\{c}"));
				InstructionKind::Literal(c)
			}
			'1'..='9' => {
				self.unsupported(format!("backreference \\{c}"));
				InstructionKind::Literal(c)
			}
			'p' | 'P' => {
				let end = match text.get(i + 2) {
					Some('{') => text[i + 2..]
						.iter()
						.position(|c| *c == '}')
						.map(|offset| i + 2 + offset)
						.ok_or_else(|| self.invalid("unclosed unicode class"))?,
					Some(_) => i + 2,
					None => return Err(self.invalid("incomplete unicode class")),
				};
				self.unsupported(format!("unicode class \\{}", text[i + 1..=end].iter().collect::<String>()));
				return Ok((residue(&text[i + 1..=end]), end + 1));
			}
			_ => {
				let (c, next) = self.escaped_char(text, i)?;
				return Ok((InstructionKind::Literal(c), next));
			}
		};
		Ok((kind, i + 2))
	}

	/// Character of the non-class escape at `i`, and the index right after it.
	fn escaped_char(&self, text: &[char], i: usize) -> Result<(char, usize), RegexError> {
		let Some(&c) = text.get(i + 1) else {
			return Err(self.invalid("dangling '\\' at end of pattern"));
		};
		match c {
			'x' => self.code_point(text, i, 2),
			'u' => self.code_point(text, i, 4),
			'U' => self.code_point(text, i, 8),
			c => Ok((unescape(c), i + 2)),
		}
	}

	/// `\xHH`, `\uHHHH`, `\UHHHHHHHH`, or any of them as `\x{H...}`.
	fn code_point(&self, text: &[char], i: usize, width: usize) -> Result<(char, usize), RegexError> {
		let letter = text[i + 1];
		let (digits, next): (String, usize) = if text.get(i + 2) == Some(&'{') {
			let close = text[i + 3..]
				.iter()
				.position(|c| *c == '}')
				.map(|offset| i + 3 + offset)
				.ok_or_else(|| self.invalid(format!("unclosed \\{letter}{{...}} escape")))?;
			(text[i + 3..close].iter().collect(), close + 1)
		} else {
			let digits: String = text.iter().skip(i + 2).take(width).collect();
			if digits.chars().count() < width {
				return Err(self.invalid(format!("\\{letter} expects {width} hex digits")));
			}
			(digits, i + 2 + width)
		};

		u32::from_str_radix(&digits, 16)
			.ok()
			.and_then(char::from_u32)
			.map(|c| (c, next))
			.ok_or_else(|| self.invalid(format!("invalid escape \\{letter}{digits}")))
	}

	/// Members of `[content]`, complemented over printable ASCII when
	/// `content` starts with `^`.
	fn bracket(&mut self, content: &[char]) -> Result<Vec<char>, RegexError> {
		let (negated, content) = match content.first() {
			Some('^') => (true, &content[1..]),
			_ => (false, content),
		};
		let mut nested = false;
		let mut members = Vec::new();
		let mut i = 0;
		while i < content.len() {
			let (first, after) = match content[i] {
				'\\' => {
					let Some(&e) = content.get(i + 1) else {
						return Err(self.invalid("dangling '\\' in character class"));
					};
					if let Some(set) = charset::escape_class(e) {
						members.extend(set);
						i += 2;
						continue;
					}
					self.escaped_char(content, i)?
				}
				c => {
					nested |= c == '[';
					(c, i + 1)
				}
			};

			// A '-' first or last in the class is a member
			if content.get(after) == Some(&'-') && after + 1 < content.len() {
				let (last, next) = match content[after + 1] {
					'\\' => {
						let Some(&e) = content.get(after + 2) else {
							return Err(self.invalid("dangling '\\' in character class"));
						};
						if charset::escape_class(e).is_some() {
							return Err(self.invalid(format!("class \\{e} used as a range bound")));
						}
						self.escaped_char(content, after + 1)?
					}
					c => (c, after + 2),
				};
				if first > last {
					return Err(self.invalid(format!("reversed range {first}-{last}")));
				}
				members.extend(first..=last);
				i = next;
			} else {
				members.push(first);
				i = after;
			}
		}

		if nested {
			self.unsupported("nested or POSIX character class");
		}
		Ok(if negated { charset::complement(&members) } else { charset::normalize(members) })
	}

	/// Content of `( ... )`: non-capturing and named groups are plain groups,
	/// other `(?...)` forms are kept as literal text.
	fn parenthesized(&mut self, content: &[char]) -> Result<InstructionKind, RegexError> {
		let body = match content {
			['?', ':', rest @ ..] => rest,
			['?', '<', '=', ..] | ['?', '<', '!', ..] | ['?', '=', ..] | ['?', '!', ..] => {
				self.unsupported("lookaround");
				&content[1..]
			}
			['?', 'P', '<', ..] | ['?', '<', ..] => {
				let close = content
					.iter()
					.position(|c| *c == '>')
					.ok_or_else(|| self.invalid("unterminated group name"))?;
				&content[close + 1..]
			}
			['?', ..] => {
				self.unsupported("inline flags");
				&content[1..]
			}
			_ => content,
		};

		let options = self.split_alternatives(body)?;
		if options.len() > 1 {
			let groups = options.into_iter().map(|option| self.group(option)).collect::<Result<_, _>>()?;
			return Ok(InstructionKind::Alternation(groups));
		}
		Ok(InstructionKind::Group(self.group(body)?))
	}

	/// Quantifier starting at `i`, if any, and the index right after it.
	///
	/// A lazy `?` suffix is consumed and ignored.
	fn quantifier(&self, text: &[char], i: usize) -> Result<(Quantifier, usize), RegexError> {
		let (quantifier, mut next) = match text.get(i) {
			Some('?') => (Quantifier::new(0, 1), i + 1),
			Some('*') => (Quantifier::new(0, UNBOUNDED_EXTRA), i + 1),
			Some('+') => (Quantifier::new(1, 1 + UNBOUNDED_EXTRA), i + 1),
			Some('{') => match self.counted(text, i)? {
				Some(counted) => counted,
				None => return Ok((Quantifier::ONE, i)),
			},
			_ => return Ok((Quantifier::ONE, i)),
		};
		if text.get(next) == Some(&'?') {
			next += 1;
		}
		Ok((quantifier, next))
	}

	/// `{m}`, `{m,}`, `{m,n}` or `{,n}` at `open`.
	///
	/// `None` when the braces do not hold bounds, so `{` stays a literal.
	fn counted(&self, text: &[char], open: usize) -> Result<Option<(Quantifier, usize)>, RegexError> {
		let Some(close) = text[open..].iter().position(|c| *c == '}').map(|offset| open + offset) else {
			return Ok(None);
		};
		let body: String = text[open + 1..close].iter().collect();

		let bound = |s: &str| -> Option<usize> {
			if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
				return None;
			}
			s.parse().ok()
		};
		let bounds = match body.split_once(',') {
			None => bound(&body).map(|n| (n, n)),
			Some((low, high)) => {
				let min = if low.is_empty() { Some(0) } else { bound(low) };
				min.and_then(|min| {
					let max = if high.is_empty() { Some(min.saturating_add(UNBOUNDED_EXTRA)) } else { bound(high) };
					max.map(|max| (min, max))
				})
			}
		};

		let Some((min, max)) = bounds else {
			return Ok(None);
		};
		if min > max {
			return Err(self.invalid(format!("reversed repetition bounds {{{body}}}")));
		}
		Ok(Some((Quantifier::new(min, max), close + 1)))
	}
}

/// Control escapes; anything else stands for itself.
fn unescape(c: char) -> char {
	match c {
		'a' => '\u{7}',
		'n' => '\n',
		't' => '\t',
		'r' => '\r',
		'f' => '\u{c}',
		'v' => '\u{b}',
		c => c,
	}
}

/// Text kept verbatim, one literal per character.
fn residue(text: &[char]) -> InstructionKind {
	InstructionKind::Group(Group {
		source: text.iter().collect(),
		body: text.iter().map(|c| Instruction::once(InstructionKind::Literal(*c))).collect(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(pattern: &str) -> Vec<InstructionKind> {
		compile(pattern).unwrap().instructions.into_iter().map(|i| i.kind).collect()
	}

	fn quantifiers(pattern: &str) -> Vec<(usize, usize)> {
		compile(pattern)
			.unwrap()
			.instructions
			.iter()
			.map(|i| (i.quantifier.min, i.quantifier.max))
			.collect()
	}

	fn source(kind: &InstructionKind) -> Vec<String> {
		match kind {
			InstructionKind::Alternation(groups) => groups.iter().map(|g| g.source.clone()).collect(),
			InstructionKind::Group(group) => vec![group.source.clone()],
			_ => Vec::new(),
		}
	}

	#[test]
	fn group_alternation_and_class() {
		let compiled = compile("(user|admin)[0-9]{3}").unwrap();
		assert!(compiled.unsupported.is_empty());
		assert_eq!(compiled.instructions.len(), 2);

		let first = &compiled.instructions[0];
		assert_eq!(source(&first.kind), vec!["user", "admin"]);
		assert_eq!(first.quantifier, Quantifier::ONE);

		let second = &compiled.instructions[1];
		assert_eq!(second.kind, InstructionKind::Class(('0'..='9').collect()));
		assert_eq!(second.quantifier, Quantifier::new(3, 3));
	}

	#[test]
	fn top_level_bar_splits_everything() {
		let kinds = kinds("ab|c(d|e)|f");
		assert_eq!(kinds.len(), 1);
		assert_eq!(source(&kinds[0]), vec!["ab", "c(d|e)", "f"]);
	}

	#[test]
	fn quantifier_forms() {
		assert_eq!(
			quantifiers("a?b*c+d{2}e{2,}f{2,5}g{,3}"),
			vec![(0, 1), (0, 10), (1, 11), (2, 2), (2, 12), (2, 5), (0, 3)]
		);
		// Lazy suffix is consumed
		assert_eq!(quantifiers("a+?b"), vec![(1, 11), (1, 1)]);
		// Braces without bounds are literal
		assert_eq!(kinds("a{x}").len(), 4);
	}

	#[test]
	fn anchors_are_skipped() {
		assert_eq!(kinds("^ab$"), vec![InstructionKind::Literal('a'), InstructionKind::Literal('b')]);
	}

	#[test]
	fn bracket_ranges_are_expanded() {
		assert_eq!(kinds("[a-c0-2_]"), vec![InstructionKind::Class(vec!['0', '1', '2', '_', 'a', 'b', 'c'])]);
		assert_eq!(kinds("[ab-]"), vec![InstructionKind::Class(vec!['-', 'a', 'b'])]);
	}

	#[test]
	fn escapes_inside_and_outside_classes() {
		assert_eq!(kinds("[a\\-z]"), vec![InstructionKind::Class(vec!['-', 'a', 'z'])]);
		assert_eq!(kinds("[-ab]"), vec![InstructionKind::Class(vec!['-', 'a', 'b'])]);
		assert_eq!(kinds("[]a]"), vec![InstructionKind::Class(vec![']', 'a'])]);
		assert_eq!(kinds("\\.\\x41\\t"), vec![
			InstructionKind::Literal('.'),
			InstructionKind::Literal('A'),
			InstructionKind::Literal('\t'),
		]);

		let InstructionKind::Class(negated) = &kinds("[^\\d]")[0] else { panic!("expected a class") };
		assert!(negated.iter().all(|c| !c.is_ascii_digit()));
		assert_eq!(negated.len(), 90);
	}

	#[test]
	fn named_and_non_capturing_groups_are_plain() {
		let kinds = kinds("(?P<year>\\d{4})(?:ab)(?<tag>x)");
		assert_eq!(kinds.len(), 3);
		assert_eq!(source(&kinds[0]), vec!["\\d{4}"]);
		assert_eq!(source(&kinds[1]), vec!["ab"]);
		assert_eq!(source(&kinds[2]), vec!["x"]);
	}

	#[test]
	fn unsupported_constructs_become_literals() {
		let compiled = compile("\\bword\\b(?i)\\pL").unwrap();
		let features: Vec<String> = compiled
			.unsupported
			.iter()
			.map(|e| match e {
				RegexError::UnsupportedFeature { feature, .. } => feature.clone(),
				other => panic!("unexpected {other:?}"),
			})
			.collect();
		assert_eq!(features, vec!["assertion \\b", "assertion \\b", "inline flags", "unicode class \\pL"]);
		assert_eq!(compiled.instructions[0].kind, InstructionKind::Literal('b'));
	}

	#[test]
	fn validation_source_fills_open_lower_bounds() {
		assert_eq!(compile("a{,3}b{2,}c{,}").unwrap().validation_source, "a{0,3}b{2,}c{0,}");
		// Escaped braces and class members are left alone
		assert_eq!(compile("\\{,3}[{,]{,2}").unwrap().validation_source, "\\{,3}[{,]{0,2}");
		assert_eq!(compile("[]{,1}]x").unwrap().validation_source, "[]{,1}]x");
	}

	#[test]
	fn code_point_escapes() {
		assert_eq!(kinds("\\u0041\\U00000042\\u{1F600}\\a"), vec![
			InstructionKind::Literal('A'),
			InstructionKind::Literal('B'),
			InstructionKind::Literal('\u{1F600}'),
			InstructionKind::Literal('\u{7}'),
		]);
		assert_eq!(kinds("[\\x41-\\x43]"), vec![InstructionKind::Class(vec!['A', 'B', 'C'])]);
		assert!(compile("\\u00").is_err());
	}

	#[test]
	fn only_unescaped_brackets_are_nested_classes() {
		let escaped = compile("[\\[a]").unwrap();
		assert!(escaped.unsupported.is_empty());
		assert_eq!(escaped.instructions[0].kind, InstructionKind::Class(vec!['[', 'a']));

		assert_eq!(compile("[[:alpha:]]").unwrap().unsupported.len(), 1);
	}

	#[test]
	fn malformed_patterns_are_rejected() {
		for pattern in ["[abc", "(ab", "ab)", "[z-a]", "a{3,1}", "abc\\", "(?P<name", "\\x{zz}", "\\x4"] {
			assert!(
				matches!(compile(pattern), Err(RegexError::InvalidPattern { .. })),
				"{pattern} should be rejected"
			);
		}
	}
}
