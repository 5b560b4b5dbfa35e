use std::collections::BTreeMap;

use rand::Rng;

use super::vocabulary::Code;

/// Represents a context in an n-gram model.
///
/// A `State` stores all observed transitions from one context key to the
/// next token. Conceptually, this is a node in a Markov chain where
/// outgoing edges are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during learning
/// - Draw next tokens using weighted random sampling
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - Transitions iterate in code order, so draws are reproducible for a
///   seeded random source
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	/// Outgoing transitions indexed by the next token code.
	/// Example: { 12 => 42, 3 => 3 }
	transitions: BTreeMap<Code, u64>,
}

impl State {
	/// Records an occurrence of a transition toward `next`.
	pub fn add_transition(&mut self, next: Code) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Adds `count` occurrences at once (used when loading a model).
	pub(crate) fn add_occurrences(&mut self, next: Code, count: u64) {
		*self.transitions.entry(next).or_insert(0) += count;
	}

	pub fn transitions(&self) -> &BTreeMap<Code, u64> {
		&self.transitions
	}

	/// Total number of observations of this context.
	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	/// Draws up to `k` distinct next tokens without replacement.
	///
	/// Each draw picks among the remaining transitions with probability
	/// proportional to their occurrence count, using a cumulative
	/// subtraction over the candidates. Tokens are returned in draw order.
	/// If fewer than `k` transitions exist, all of them are returned.
	pub fn draw<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<Code> {
		let mut remaining: Vec<(Code, u64)> = self.transitions.iter().map(|(c, n)| (*c, *n)).collect();
		let mut total = self.total();
		let mut drawn = Vec::with_capacity(k.min(remaining.len()));

		while drawn.len() < k && total > 0 {
			let mut r = rng.random_range(0..total);
			let mut index = remaining.len() - 1;
			for (i, (_, occurrence)) in remaining.iter().enumerate() {
				if r < *occurrence {
					index = i;
					break;
				}
				r -= occurrence;
			}
			let (code, occurrence) = remaining.swap_remove(index);
			total -= occurrence;
			drawn.push(code);
		}

		drawn
	}
}
