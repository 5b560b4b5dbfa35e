use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::vocabulary::Code;

/// Maximum supported context order.
pub const MAX_ORDER: usize = 8;

/// Fixed-capacity context key: the codes preceding a prediction point.
///
/// Equality, ordering and hashing only consider the first `len` codes, so
/// keys of different orders never collide.
#[derive(Clone, Copy)]
pub struct ContextKey {
	codes: [Code; MAX_ORDER],
	len: u8,
}

impl ContextKey {
	/// The zero-length context.
	pub const EMPTY: Self = Self { codes: [0; MAX_ORDER], len: 0 };

	/// Builds a key from `codes`.
	///
	/// Returns `None` if `codes` is longer than `MAX_ORDER`.
	pub fn new(codes: &[Code]) -> Option<Self> {
		if codes.len() > MAX_ORDER {
			return None;
		}
		let mut key = Self::EMPTY;
		key.codes[..codes.len()].copy_from_slice(codes);
		key.len = codes.len() as u8;
		Some(key)
	}

	pub fn as_slice(&self) -> &[Code] {
		&self.codes[..self.len as usize]
	}

	/// Order of the key (number of codes).
	pub fn len(&self) -> usize {
		self.len as usize
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl PartialEq for ContextKey {
	fn eq(&self, other: &Self) -> bool {
		self.as_slice() == other.as_slice()
	}
}

impl Eq for ContextKey {}

impl Hash for ContextKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.as_slice().hash(state);
	}
}

impl PartialOrd for ContextKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ContextKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.as_slice().cmp(other.as_slice())
	}
}

impl fmt::Debug for ContextKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ContextKey").field(&self.as_slice()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn test_equality_ignores_unused_slots() {
		let mut a = ContextKey::new(&[1, 2]).unwrap();
		let b = ContextKey::new(&[1, 2]).unwrap();
		// Garbage past `len` must not matter.
		a.codes[5] = 99;
		assert_eq!(a, b);

		let mut set = HashSet::new();
		set.insert(a);
		assert!(set.contains(&b));
	}

	#[test]
	fn test_different_orders_differ() {
		let short = ContextKey::new(&[0]).unwrap();
		let long = ContextKey::new(&[0, 0]).unwrap();
		assert_ne!(short, long);
		assert!(short < long);
		assert_ne!(ContextKey::EMPTY, short);
	}

	#[test]
	fn test_too_long() {
		assert!(ContextKey::new(&[0; MAX_ORDER]).is_some());
		assert!(ContextKey::new(&[0; MAX_ORDER + 1]).is_none());
	}
}
