use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::error::{Error, Result};
use super::context::{ContextKey, MAX_ORDER};
use super::order_table::OrderTable;
use super::state::State;
use super::tokenizer::TrainingPair;
use super::vocabulary::{Code, Vocabulary};

/// Word n-gram count model spanning several context orders.
///
/// The model maps a context key (1..=`MAX_ORDER` codes) to the counts of
/// the tokens observed right after it. Tables of every order live side by
/// side so sampling can back off from a long context to its suffixes.
///
/// # Responsibilities
/// - Accumulate `(context, target)` observations
/// - Sample next tokens with order backoff
/// - Pick random observed contexts for cold starts
///
/// # Invariants
/// - `tables[n]` only holds keys of order `n`
/// - Counts only grow during training; sampling never mutates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NGramModel {
	tables: BTreeMap<usize, OrderTable>,
}

impl NGramModel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Encodes every pair through `vocabulary` and counts it.
	///
	/// Accumulation is commutative: the final counts do not depend on the
	/// order of arrival.
	pub fn fit(&mut self, pairs: &[TrainingPair<'_>], vocabulary: &Vocabulary) {
		for pair in pairs {
			let context = vocabulary.encode_many(pair.context);
			self.observe(&context, vocabulary.encode(pair.target));
		}
	}

	/// Counts a single encoded observation.
	///
	/// Contexts longer than `MAX_ORDER` cannot be keyed and are ignored.
	pub fn observe(&mut self, context: &[Code], target: Code) {
		let Some(key) = ContextKey::new(context) else {
			return;
		};
		self.tables
			.entry(key.len())
			.or_insert_with(|| OrderTable::new(key.len()))
			.add(key, target);
	}

	pub(crate) fn add_occurrences(&mut self, context: ContextKey, target: Code, count: u64) {
		self.tables
			.entry(context.len())
			.or_insert_with(|| OrderTable::new(context.len()))
			.add_occurrences(context, target, count);
	}

	/// Finds the longest suffix of `context` that has training data.
	fn lookup(&self, context: &[Code]) -> Option<&State> {
		let start = context.len().saturating_sub(MAX_ORDER);
		let context = &context[start..];
		(0..=context.len()).find_map(|i| {
			let key = ContextKey::new(&context[i..])?;
			self.tables.get(&key.len())?.get(&key)
		})
	}

	/// Draws up to `k` distinct next tokens for `context`.
	///
	/// Starts from the full context and drops the oldest token until a
	/// trained context is found. Draws are weighted by count and made
	/// without replacement; the first token is the single best guess.
	///
	/// # Errors
	/// Returns `NoTrainingData` if no suffix of `context`, down to the
	/// empty one, was observed. Nothing is mutated.
	pub fn sample<R: Rng + ?Sized>(&self, context: &[Code], k: usize, rng: &mut R) -> Result<Vec<Code>> {
		match self.lookup(context) {
			Some(state) => Ok(state.draw(k, rng)),
			None => Err(Error::NoTrainingData { context: context.to_vec() }),
		}
	}

	/// Equivalent to `sample(context, 1)`.
	pub fn predict<R: Rng + ?Sized>(&self, context: &[Code], rng: &mut R) -> Result<Code> {
		self.sample(context, 1, rng)?
			.first()
			.copied()
			.ok_or_else(|| Error::NoTrainingData { context: context.to_vec() })
	}

	/// Returns one observed context chosen uniformly among all orders.
	///
	/// Returns `None` if the model has no training data.
	pub fn random_context<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ContextKey> {
		self.tables
			.values()
			.flat_map(|table| table.keys())
			.choose(rng)
			.copied()
	}

	/// Transition counts observed for exactly `context` (no backoff).
	pub fn count_table(&self, context: &[Code]) -> Option<&BTreeMap<Code, u64>> {
		let key = ContextKey::new(context)?;
		self.tables.get(&key.len())?.get(&key).map(State::transitions)
	}

	/// Number of times exactly `context` was followed by some token.
	pub fn occurrences(&self, context: &[Code]) -> u64 {
		self.count_table(context).map(|t| t.values().sum()).unwrap_or(0)
	}

	/// Context orders with at least one observation.
	pub fn orders(&self) -> impl Iterator<Item = usize> + '_ {
		self.tables.keys().copied()
	}

	pub(crate) fn tables(&self) -> impl Iterator<Item = &OrderTable> {
		self.tables.values()
	}

	/// Number of distinct trained contexts across all orders.
	pub fn context_count(&self) -> usize {
		self.tables.values().map(OrderTable::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.context_count() == 0
	}
}
