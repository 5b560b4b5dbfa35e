use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{Error, Result};

/// Source of word vectors used to steer generation toward a topic.
///
/// Implementations must be deterministic for a given word. Words without a
/// vector return `None`, which callers treat as "no usable direction".
pub trait Embedder {
	/// Dimension of every returned vector.
	fn dimension(&self) -> usize;

	fn embed(&self, word: &str) -> Option<Vec<f32>>;
}

/// Embedder that knows no words, disabling thematic steering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmbedder;

impl Embedder for NullEmbedder {
	fn dimension(&self) -> usize {
		0
	}

	fn embed(&self, _word: &str) -> Option<Vec<f32>> {
		None
	}
}

/// In-memory word vector table.
#[derive(Debug, Clone, Default)]
pub struct VectorTable {
	dimension: usize,
	vectors: HashMap<String, Vec<f32>>,
}

impl VectorTable {
	pub fn new(dimension: usize) -> Self {
		Self { dimension, vectors: HashMap::new() }
	}

	/// Inserts or replaces the vector of `word`.
	///
	/// # Errors
	/// Returns an error if the vector does not match the table dimension.
	pub fn insert(&mut self, word: &str, vector: Vec<f32>) -> std::result::Result<(), String> {
		if vector.len() != self.dimension {
			return Err(format!("expected {} components, got {}", self.dimension, vector.len()));
		}
		self.vectors.insert(word.to_owned(), vector);
		Ok(())
	}

	/// Reads the word2vec / GloVe text format: one `word v1 .. vd` entry per
	/// line, with an optional leading `count dimension` header.
	///
	/// Without a header the dimension is taken from the first entry. Blank
	/// lines are skipped.
	///
	/// # Errors
	/// Returns `Embeddings` for unparsable components or inconsistent
	/// dimensions, `Io` for read failures.
	pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
		let mut table: Option<Self> = None;

		for (index, line) in reader.lines().enumerate() {
			let line = line?;
			let number = index + 1;
			let fields: Vec<&str> = line.split_whitespace().collect();
			let Some((word, values)) = fields.split_first() else {
				continue;
			};

			// "count dimension" header, both integers
			if index == 0 {
				if let [dimension] = values {
					if let (Ok(_), Ok(dimension)) = (word.parse::<usize>(), dimension.parse::<usize>()) {
						table = Some(Self::new(dimension));
						continue;
					}
				}
			}

			let components = values
				.iter()
				.map(|value| value.parse::<f32>())
				.collect::<std::result::Result<Vec<_>, _>>()
				.map_err(|e| Error::Embeddings { line: number, message: e.to_string() })?;

			let table = table.get_or_insert_with(|| Self::new(components.len()));
			table
				.insert(word, components)
				.map_err(|message| Error::Embeddings { line: number, message })?;
		}

		Ok(table.unwrap_or_default())
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}
}

impl Embedder for VectorTable {
	fn dimension(&self) -> usize {
		self.dimension
	}

	fn embed(&self, word: &str) -> Option<Vec<f32>> {
		self.vectors.get(word).cloned()
	}
}

/// Running sum of the embeddings of the words of the current sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeVector {
	sum: Vec<f32>,
}

impl ThemeVector {
	pub fn new(dimension: usize) -> Self {
		Self { sum: vec![0.0; dimension] }
	}

	/// Accumulates `vector`. Vectors of the wrong dimension are ignored.
	pub fn add(&mut self, vector: &[f32]) {
		if vector.len() != self.sum.len() {
			return;
		}
		for (total, component) in self.sum.iter_mut().zip(vector) {
			*total += component;
		}
	}

	pub fn reset(&mut self) {
		self.sum.iter_mut().for_each(|c| *c = 0.0);
	}

	pub fn as_slice(&self) -> &[f32] {
		&self.sum
	}

	/// Angle in radians between the theme and `vector`.
	///
	/// Returns `None` when either side has no direction (zero norm) or the
	/// dimensions differ.
	pub fn angle_to(&self, vector: &[f32]) -> Option<f32> {
		if vector.len() != self.sum.len() {
			return None;
		}
		let dot: f32 = self.sum.iter().zip(vector).map(|(a, b)| a * b).sum();
		let theme_norm = magnitude(&self.sum);
		let vector_norm = magnitude(vector);
		if theme_norm == 0.0 || vector_norm == 0.0 {
			return None;
		}
		Some((dot / (theme_norm * vector_norm)).clamp(-1.0, 1.0).acos())
	}

	/// Index of the candidate closest in angle to the theme.
	///
	/// Candidates are ranked in three tiers:
	/// 1. the smallest defined angle (ties keep the earliest candidate)
	/// 2. without any defined angle (zero theme), the first candidate that
	///    has an embedding
	/// 3. without any embedding, the first candidate
	///
	/// A candidate without an embedding is never chosen over one that has it.
	pub fn closest(&self, candidates: &[Option<Vec<f32>>]) -> Option<usize> {
		if candidates.is_empty() {
			return None;
		}
		let mut best: Option<(usize, f32)> = None;
		for (index, candidate) in candidates.iter().enumerate() {
			let Some(angle) = candidate.as_deref().and_then(|vector| self.angle_to(vector)) else {
				continue;
			};
			if best.is_none_or(|(_, best_angle)| angle < best_angle) {
				best = Some((index, angle));
			}
		}
		if let Some((index, _)) = best {
			return Some(index);
		}
		Some(candidates.iter().position(Option::is_some).unwrap_or(0))
	}
}

fn magnitude(vector: &[f32]) -> f32 {
	vector.iter().map(|c| c * c).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unit(degrees: f32) -> Vec<f32> {
		let radians = degrees.to_radians();
		vec![radians.cos(), radians.sin()]
	}

	#[test]
	fn test_theme_accumulates() {
		let mut theme = ThemeVector::new(2);
		theme.add(&[1.0, 0.0]);
		theme.add(&[0.0, 2.0]);
		theme.add(&[5.0]);
		assert_eq!(theme.as_slice(), &[1.0, 2.0]);
		theme.reset();
		assert_eq!(theme.as_slice(), &[0.0, 0.0]);
	}

	#[test]
	fn test_angle() {
		let mut theme = ThemeVector::new(2);
		assert_eq!(theme.angle_to(&[1.0, 0.0]), None);
		theme.add(&[3.0, 0.0]);
		let angle = theme.angle_to(&unit(90.0)).unwrap();
		assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
		assert_eq!(theme.angle_to(&[0.0, 0.0]), None);
		assert_eq!(theme.angle_to(&[1.0, 0.0, 0.0]), None);
	}

	#[test]
	fn test_closest_picks_smallest_angle() {
		let mut theme = ThemeVector::new(2);
		theme.add(&[1.0, 0.0]);
		let candidates = vec![Some(unit(170.0)), Some(unit(10.0))];
		assert_eq!(theme.closest(&candidates), Some(1));
	}

	#[test]
	fn test_closest_without_directions_keeps_first() {
		let theme = ThemeVector::new(2);
		let candidates = vec![Some(unit(170.0)), Some(unit(10.0))];
		assert_eq!(theme.closest(&candidates), Some(0));

		let mut theme = ThemeVector::new(2);
		theme.add(&[1.0, 0.0]);
		assert_eq!(theme.closest(&[None, None]), Some(0));
		assert_eq!(theme.closest(&[None, Some(unit(120.0))]), Some(1));
		assert_eq!(theme.closest(&[]), None);
	}

	#[test]
	fn test_closest_prefers_embedded_candidates() {
		// Zero theme: no angle is defined, the first embedded candidate wins.
		let theme = ThemeVector::new(2);
		assert_eq!(theme.closest(&[None, Some(vec![1.0, 0.0])]), Some(1));
		assert_eq!(theme.closest(&[None, None, Some(unit(30.0)), Some(unit(10.0))]), Some(2));

		let mut theme = ThemeVector::new(2);
		theme.add(&[1.0, 0.0]);
		assert_eq!(theme.closest(&[None, Some(vec![0.0, 0.0]), Some(unit(170.0))]), Some(2));
		assert_eq!(theme.closest(&[None, Some(vec![0.0, 0.0])]), Some(1));
	}

	#[test]
	fn test_vector_table_header_needs_integers() {
		// A one-dimensional entry whose word is a number is not a header.
		let table = VectorTable::from_reader("5 0.3\nкот 0.7\n".as_bytes()).unwrap();
		assert_eq!(table.dimension(), 1);
		assert_eq!(table.len(), 2);
		assert_eq!(table.embed("5"), Some(vec![0.3]));

		let table = VectorTable::from_reader("1 2\nкот 0.5 0.5\n".as_bytes()).unwrap();
		assert_eq!(table.dimension(), 2);
		assert_eq!(table.len(), 1);
		assert_eq!(table.embed("1"), None);

		let table = VectorTable::from_reader("10 3.7\n".as_bytes()).unwrap();
		assert_eq!(table.dimension(), 1);
		assert_eq!(table.embed("10"), Some(vec![3.7]));
	}

	#[test]
	fn test_vector_table_from_reader() {
		let text = "2 3\nмир 1 0 0\n\nдом 0 1 0\n";
		let table = VectorTable::from_reader(text.as_bytes()).unwrap();
		assert_eq!(table.dimension(), 3);
		assert_eq!(table.len(), 2);
		assert_eq!(table.embed("дом"), Some(vec![0.0, 1.0, 0.0]));
		assert_eq!(table.embed("кот"), None);

		let table = VectorTable::from_reader("мир 0.5 0.5\n".as_bytes()).unwrap();
		assert_eq!(table.dimension(), 2);
	}

	#[test]
	fn test_vector_table_rejects_bad_lines() {
		let err = VectorTable::from_reader("мир 1 0\nдом 1\n".as_bytes()).unwrap_err();
		assert!(matches!(err, Error::Embeddings { line: 2, .. }));

		let err = VectorTable::from_reader("мир 1 x\n".as_bytes()).unwrap_err();
		assert!(matches!(err, Error::Embeddings { line: 1, .. }));
	}

	#[test]
	fn test_null_embedder() {
		assert_eq!(NullEmbedder.dimension(), 0);
		assert_eq!(NullEmbedder.embed("мир"), None);
	}
}
