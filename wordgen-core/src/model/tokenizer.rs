use std::sync::LazyLock;

use regex::Regex;

use crate::config::TokenizerConfig;
use super::vocabulary::{Code, Vocabulary};

// Constant patterns, compiling them cannot fail.
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());
static LATIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)[a-z]").unwrap());
static SENTENCE_TERMINATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\s\w]").unwrap());

/// A single training example: the words preceding a position and the word
/// observed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingPair<'a> {
	pub context: &'a [String],
	pub target: &'a str,
}

/// Turns raw text into sentences of normalized words.
///
/// Normalization lowercases the text and blanks out digits (and, by
/// default, Latin letters). Any character that is neither whitespace nor a
/// word character ends a sentence; words are split on whitespace.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
	config: TokenizerConfig,
}

impl Tokenizer {
	pub fn new(config: TokenizerConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &TokenizerConfig {
		&self.config
	}

	/// Normalizes and segments one document.
	pub fn document(&self, raw_text: &str) -> Document {
		let text = self.preprocess(raw_text);
		let sentences = SENTENCE_TERMINATORS
			.split(&text)
			.map(|sentence| self.split_into_words(sentence))
			.filter(|words| !words.is_empty())
			.collect();
		Document { sentences }
	}

	fn preprocess(&self, raw_text: &str) -> String {
		let text = raw_text.to_lowercase();
		let text = DIGITS.replace_all(&text, " ");
		if self.config.strip_latin {
			LATIN.replace_all(&text, " ").into_owned()
		} else {
			text.into_owned()
		}
	}

	fn split_into_words(&self, sentence: &str) -> Vec<String> {
		sentence
			.split_whitespace()
			.filter(|word| word.chars().count() > self.config.min_word_length)
			.map(str::to_owned)
			.collect()
	}
}

/// A segmented document: non-empty sentences of normalized words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	sentences: Vec<Vec<String>>,
}

impl Document {
	pub fn sentences(&self) -> &[Vec<String>] {
		&self.sentences
	}

	/// Number of words across all sentences.
	pub fn word_count(&self) -> usize {
		self.sentences.iter().map(Vec::len).sum()
	}

	/// Registers every word of every sentence, including sentences too
	/// short to yield training pairs.
	pub fn observe_into(&self, vocabulary: &mut Vocabulary) {
		for word in self.sentences.iter().flatten() {
			vocabulary.observe(word);
		}
	}

	/// Emits the sliding-window training pairs for every context order in
	/// `min_ngram..=max_ngram`.
	///
	/// Sentences with at most `max_ngram` words contribute nothing.
	pub fn pairs(&self, min_ngram: usize, max_ngram: usize) -> Vec<TrainingPair<'_>> {
		let mut pairs = Vec::new();
		for words in &self.sentences {
			if words.len() <= max_ngram {
				continue;
			}
			for k in min_ngram..=max_ngram {
				for i in 0..words.len() - k {
					pairs.push(TrainingPair {
						context: &words[i..i + k],
						target: &words[i + k],
					});
				}
			}
		}
		pairs
	}

	/// Flat, order-preserving encoding of every word. Never mutates the
	/// vocabulary: unseen words become `UNKNOWN_CODE`.
	pub fn tokens(&self, vocabulary: &Vocabulary) -> Vec<Code> {
		self.sentences
			.iter()
			.flatten()
			.map(|word| vocabulary.encode(word))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn keep_latin() -> Tokenizer {
		Tokenizer::new(TokenizerConfig { strip_latin: false, ..TokenizerConfig::default() })
	}

	fn words(document: &Document) -> Vec<Vec<&str>> {
		document
			.sentences()
			.iter()
			.map(|s| s.iter().map(String::as_str).collect())
			.collect()
	}

	#[test]
	fn test_punctuation_drives_segmentation() {
		let tokenizer = Tokenizer::default();
		let document = tokenizer.document("Привет всем! Меня звать\nРуслан, хочешь знать?");
		assert_eq!(
			words(&document),
			vec![vec!["привет", "всем"], vec!["меня", "звать", "руслан"], vec!["хочешь", "знать"]]
		);
	}

	#[test]
	fn test_digits_and_latin_are_blanked() {
		let tokenizer = Tokenizer::default();
		let document = tokenizer.document("раз два четыре123 ojaposd opa w");
		assert_eq!(words(&document), vec![vec!["раз", "два", "четыре"]]);

		let document = tokenizer.document("abc1def");
		assert_eq!(document.word_count(), 0);
	}

	#[test]
	fn test_latin_kept_when_configured() {
		let document = keep_latin().document("A b 9c");
		assert_eq!(words(&document), vec![vec!["a", "b", "c"]]);
	}

	#[test]
	fn test_min_word_length_is_strict() {
		let tokenizer = Tokenizer::new(TokenizerConfig { min_word_length: 2, strip_latin: true });
		let document = tokenizer.document("я и мы они вот");
		assert_eq!(words(&document), vec![vec!["они", "вот"]]);
	}

	#[test]
	fn test_pairs_for_every_order() {
		let document = keep_latin().document("a b c d");
		let pairs = document.pairs(1, 2);
		let rendered: Vec<(Vec<&str>, &str)> = pairs
			.iter()
			.map(|p| (p.context.iter().map(String::as_str).collect(), p.target))
			.collect();
		assert_eq!(
			rendered,
			vec![
				(vec!["a"], "b"),
				(vec!["b"], "c"),
				(vec!["c"], "d"),
				(vec!["a", "b"], "c"),
				(vec!["b", "c"], "d"),
			]
		);
	}

	#[test]
	fn test_short_sentences_only_grow_vocabulary() {
		let document = keep_latin().document("a b. c d e f");
		let pairs = document.pairs(2, 2);
		assert!(pairs.iter().all(|p| p.context[0] != "a"));
		assert_eq!(pairs.len(), 2);

		let mut vocabulary = Vocabulary::new();
		document.observe_into(&mut vocabulary);
		assert_eq!(vocabulary.len(), 6);
		assert_eq!(vocabulary.encode("a"), 0);
	}

	#[test]
	fn test_tokens_flatten_without_observing() {
		let mut vocabulary = Vocabulary::new();
		vocabulary.observe("b");
		let document = keep_latin().document("a b. b c");
		assert_eq!(document.tokens(&vocabulary), vec![-1, 0, 0, -1]);
		assert_eq!(vocabulary.len(), 1);
	}
}
