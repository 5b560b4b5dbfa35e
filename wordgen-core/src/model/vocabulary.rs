use std::collections::HashMap;

use crate::error::{Error, Result};

/// Integer code of a vocabulary word.
pub type Code = i32;

/// Bidirectional mapping between words and integer codes.
///
/// Codes are assigned densely in first-seen order starting at 0. The
/// sentinel pair (`UNKNOWN`, `UNKNOWN_CODE`) is implicit and always
/// resolvable in both directions.
///
/// # Invariants
/// - `words[code]` is the word of `code`
/// - `codes[words[code]] == code`
/// - An assigned code never changes
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
	codes: HashMap<String, Code>,
	words: Vec<String>,
}

impl Vocabulary {
	/// Marker returned when decoding a code without a word.
	pub const UNKNOWN: &'static str = "[UNKNOWN]";

	/// Code returned when encoding a word that was never observed.
	pub const UNKNOWN_CODE: Code = -1;

	pub fn new() -> Self {
		Self::default()
	}

	/// Rebuilds a vocabulary from its code-ordered word list.
	///
	/// # Errors
	/// Returns `Malformed` if a word appears twice or the list contains the
	/// unknown marker.
	pub fn from_words(words: Vec<String>) -> Result<Self> {
		let mut codes = HashMap::with_capacity(words.len());
		for (code, word) in words.iter().enumerate() {
			if word == Self::UNKNOWN {
				return Err(Error::Malformed("vocabulary contains the unknown marker".to_owned()));
			}
			let code = Code::try_from(code)
				.map_err(|_| Error::Malformed("vocabulary is too large".to_owned()))?;
			if codes.insert(word.clone(), code).is_some() {
				return Err(Error::Malformed(format!("duplicate vocabulary word '{}'", word)));
			}
		}
		Ok(Self { codes, words })
	}

	/// Returns the code of `word`, assigning the next free code if it is new.
	pub fn observe(&mut self, word: &str) -> Code {
		if let Some(code) = self.codes.get(word) {
			return *code;
		}
		let code = self.words.len() as Code;
		self.codes.insert(word.to_owned(), code);
		self.words.push(word.to_owned());
		code
	}

	/// Returns the code of `word`, or `UNKNOWN_CODE`.
	pub fn encode(&self, word: &str) -> Code {
		self.codes.get(word).copied().unwrap_or(Self::UNKNOWN_CODE)
	}

	/// Returns the word of `code`, or `UNKNOWN`.
	pub fn decode(&self, code: Code) -> &str {
		usize::try_from(code)
			.ok()
			.and_then(|index| self.words.get(index))
			.map(String::as_str)
			.unwrap_or(Self::UNKNOWN)
	}

	pub fn encode_many<S: AsRef<str>>(&self, words: &[S]) -> Vec<Code> {
		words.iter().map(|word| self.encode(word.as_ref())).collect()
	}

	pub fn decode_many(&self, codes: &[Code]) -> Vec<&str> {
		codes.iter().map(|code| self.decode(*code)).collect()
	}

	/// Number of observed words (the sentinel is not counted).
	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Observed words in code order.
	pub fn words(&self) -> &[String] {
		&self.words
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_observe_assigns_dense_codes_in_first_seen_order() {
		let mut vocabulary = Vocabulary::new();
		assert_eq!(vocabulary.observe("мир"), 0);
		assert_eq!(vocabulary.observe("дом"), 1);
		assert_eq!(vocabulary.observe("мир"), 0);
		assert_eq!(vocabulary.observe("кот"), 2);
		assert_eq!(vocabulary.len(), 3);
	}

	#[test]
	fn test_encode_does_not_observe() {
		let vocabulary = Vocabulary::new();
		assert_eq!(vocabulary.encode("мир"), Vocabulary::UNKNOWN_CODE);
		assert!(vocabulary.is_empty());
	}

	#[test]
	fn test_decode_roundtrip_and_unknown() {
		let mut vocabulary = Vocabulary::new();
		for word in ["один", "два", "три"] {
			vocabulary.observe(word);
		}
		for word in ["один", "два", "три"] {
			assert_eq!(vocabulary.decode(vocabulary.encode(word)), word);
		}
		assert_eq!(vocabulary.encode("четыре"), Vocabulary::UNKNOWN_CODE);
		assert_eq!(vocabulary.decode(Vocabulary::UNKNOWN_CODE), Vocabulary::UNKNOWN);
		assert_eq!(vocabulary.decode(42), Vocabulary::UNKNOWN);
	}

	#[test]
	fn test_batch_variants_preserve_order() {
		let mut vocabulary = Vocabulary::new();
		vocabulary.observe("а");
		vocabulary.observe("б");
		assert_eq!(vocabulary.encode_many(&["б", "в", "а"]), vec![1, -1, 0]);
		assert_eq!(vocabulary.decode_many(&[1, 0, 7]), vec!["б", "а", Vocabulary::UNKNOWN]);
	}

	#[test]
	fn test_from_words_rejects_duplicates() {
		let words = vec!["а".to_owned(), "б".to_owned(), "а".to_owned()];
		assert!(matches!(Vocabulary::from_words(words), Err(Error::Malformed(_))));

		let words = vec!["а".to_owned(), Vocabulary::UNKNOWN.to_owned()];
		assert!(matches!(Vocabulary::from_words(words), Err(Error::Malformed(_))));

		let vocabulary = Vocabulary::from_words(vec!["а".to_owned(), "б".to_owned()]).unwrap();
		assert_eq!(vocabulary.encode("б"), 1);
	}
}
