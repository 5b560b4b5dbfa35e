use std::collections::BTreeMap;

use super::context::ContextKey;
use super::state::State;
use super::vocabulary::Code;

/// Count table for a single context order.
///
/// # Invariants
/// - Every key in `states` has exactly `order` codes
/// - Every stored state has at least one transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderTable {
	/// Number of context codes per key.
	order: usize,

	/// Mapping from a context key to its transitions.
	states: BTreeMap<ContextKey, State>,
}

impl OrderTable {
	pub fn new(order: usize) -> Self {
		Self { order, states: BTreeMap::new() }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Records one `(context, target)` observation.
	///
	/// The caller guarantees `context.len() == self.order`.
	pub fn add(&mut self, context: ContextKey, target: Code) {
		debug_assert_eq!(context.len(), self.order);
		self.states.entry(context).or_default().add_transition(target);
	}

	pub(crate) fn add_occurrences(&mut self, context: ContextKey, target: Code, count: u64) {
		self.states.entry(context).or_default().add_occurrences(target, count);
	}

	pub fn get(&self, context: &ContextKey) -> Option<&State> {
		self.states.get(context)
	}

	pub fn states(&self) -> impl Iterator<Item = (&ContextKey, &State)> {
		self.states.iter()
	}

	pub fn keys(&self) -> impl Iterator<Item = &ContextKey> {
		self.states.keys()
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}
}
