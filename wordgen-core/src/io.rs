use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Reads every regular file under `dir`, recursively, one document per file.
///
/// - Files are visited in sorted path order so training is reproducible
/// - Files that are not valid UTF-8 are skipped with a warning
///
/// # Errors
/// Returns an error if `dir` (or a subdirectory) cannot be listed or a file
/// cannot be read.
pub fn read_corpus_dir<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut files = Vec::new();
	list_files(dir.as_ref(), &mut files)?;
	files.sort();

	let mut documents = Vec::with_capacity(files.len());
	for path in files {
		match fs::read_to_string(&path) {
			Ok(text) => {
				debug!("Read {} ({} bytes)", path.display(), text.len());
				documents.push(text);
			}
			Err(e) if e.kind() == io::ErrorKind::InvalidData => {
				warn!("Skipping {}: not UTF-8 text", path.display());
			}
			Err(e) => return Err(e),
		}
	}
	Ok(documents)
}

/// Collects all regular files below `dir`.
fn list_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		// Symbolic links are not followed, so link cycles cannot recurse.
		let file_type = entry.file_type()?;
		if file_type.is_dir() {
			list_files(&entry.path(), files)?;
		} else if file_type.is_file() {
			files.push(entry.path());
		}
	}
	Ok(())
}

/// Reads the first line of a line-oriented stream as a single document.
///
/// An empty stream yields no document.
pub fn read_first_line<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
	let mut line = String::new();
	if reader.read_line(&mut line)? == 0 {
		return Ok(Vec::new());
	}
	Ok(vec![line])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_read_corpus_dir_recursive_sorted() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("b.txt"), "второй").unwrap();
		fs::write(dir.path().join("a.txt"), "первый").unwrap();
		fs::create_dir(dir.path().join("c")).unwrap();
		fs::write(dir.path().join("c").join("inner"), "третий").unwrap();
		fs::write(dir.path().join("binary"), [0xff, 0xfe, 0x00]).unwrap();

		let documents = read_corpus_dir(dir.path()).unwrap();
		assert_eq!(documents, vec!["первый", "второй", "третий"]);
	}

	#[cfg(unix)]
	#[test]
	fn test_read_corpus_dir_ignores_symlink_cycle() {
		let dir = tempfile::tempdir().unwrap();
		fs::create_dir(dir.path().join("inner")).unwrap();
		fs::write(dir.path().join("inner").join("text"), "слово").unwrap();
		std::os::unix::fs::symlink(dir.path(), dir.path().join("inner").join("loop")).unwrap();

		let documents = read_corpus_dir(dir.path()).unwrap();
		assert_eq!(documents, vec!["слово"]);
	}

	#[test]
	fn test_read_corpus_dir_missing() {
		let dir = tempfile::tempdir().unwrap();
		assert!(read_corpus_dir(dir.path().join("nope")).is_err());
	}

	#[test]
	fn test_read_first_line() {
		let documents = read_first_line("строка один\nстрока два\n".as_bytes()).unwrap();
		assert_eq!(documents, vec!["строка один\n"]);
		assert!(read_first_line("".as_bytes()).unwrap().is_empty());
	}
}
