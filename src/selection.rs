//! # File Selector
//!
//! Lists the regular files of a measurement directory and draws a fixed-size
//! random batch from them.
//!
//! The listing is sorted by name before sampling, so a seeded generator always
//! yields the same batch for the same directory contents. The batch itself is
//! in random order; downstream layout assigns lanes by position.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::BATCH_SIZE;

/// Errors that can occur while forming a selection batch
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// The measurement directory could not be listed
    #[error("Failed to list directory {path}: {source}")]
    Io {
        /// Directory that was being listed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Not enough regular files to form a batch
    #[error("Directory must contain at least {required} data files, found {found}")]
    InsufficientFiles {
        /// Number of files a batch needs
        required: usize,
        /// Number of regular files found
        found: usize,
    },

    /// A replayed batch does not have exactly [`BATCH_SIZE`] names
    #[error("A batch holds exactly {required} files, got {found}")]
    BatchSize {
        /// Number of files a batch needs
        required: usize,
        /// Number of names given
        found: usize,
    },

    /// A replayed batch names the same file twice
    #[error("Duplicate file in batch: {0}")]
    DuplicateName(String),
}

/// An ordered batch of distinct measurement file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionBatch {
    names: Vec<String>,
}

impl SelectionBatch {
    /// Build a batch from already-chosen names.
    ///
    /// Used to replay a known selection (for example to run both pipeline
    /// variants over the same files). The names must be exactly
    /// [`BATCH_SIZE`] distinct entries.
    pub fn from_names<I, S>(names: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if out.contains(&name) {
                return Err(SelectionError::DuplicateName(name));
            }
            out.push(name);
        }
        if out.len() != BATCH_SIZE {
            return Err(SelectionError::BatchSize {
                required: BATCH_SIZE,
                found: out.len(),
            });
        }
        Ok(Self { names: out })
    }

    /// File names in batch order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of files in the batch
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the names in batch order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// List the names of regular files in `dir`, sorted.
///
/// Symlinks are followed; entries that are directories (or dangling links)
/// are skipped. Names that are not valid UTF-8 are skipped with a warning,
/// since they could never match an annotation row.
pub fn list_regular_files(dir: &Path) -> Result<Vec<String>, SelectionError> {
    let io_err = |source| SelectionError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let is_file = fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping non UTF-8 file name: {:?}", raw),
        }
    }

    names.sort();
    debug!("Found {} regular files in {}", names.len(), dir.display());
    Ok(names)
}

/// Draw exactly [`BATCH_SIZE`] distinct names from `names`.
///
/// The draw is uniform without replacement and the result is fully shuffled.
pub fn sample_batch<R: Rng + ?Sized>(
    names: &[String],
    rng: &mut R,
) -> Result<SelectionBatch, SelectionError> {
    if names.len() < BATCH_SIZE {
        return Err(SelectionError::InsufficientFiles {
            required: BATCH_SIZE,
            found: names.len(),
        });
    }

    let picked = rand::seq::index::sample(rng, names.len(), BATCH_SIZE)
        .into_iter()
        .map(|i| names[i].clone())
        .collect();

    Ok(SelectionBatch { names: picked })
}

/// List `dir` and draw a batch from it.
///
/// With `seed` the draw is reproducible; without it the generator is seeded
/// from OS entropy.
pub fn select_batch(dir: &Path, seed: Option<u64>) -> Result<SelectionBatch, SelectionError> {
    let names = list_regular_files(dir)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    sample_batch(&names, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("well_{:02}.txt", i)).collect()
    }

    #[test]
    fn test_sample_exact_size_and_distinct() {
        let pool = names(20);
        let mut rng = StdRng::seed_from_u64(7);
        let batch = sample_batch(&pool, &mut rng).unwrap();

        assert_eq!(batch.len(), BATCH_SIZE);
        let unique: HashSet<_> = batch.iter().collect();
        assert_eq!(unique.len(), BATCH_SIZE);
        assert!(batch.iter().all(|n| pool.iter().any(|p| p == n)));
    }

    #[test]
    fn test_sample_exactly_nine_uses_all() {
        let pool = names(BATCH_SIZE);
        let mut rng = StdRng::seed_from_u64(1);
        let batch = sample_batch(&pool, &mut rng).unwrap();

        let mut got: Vec<_> = batch.names().to_vec();
        got.sort();
        assert_eq!(got, pool);
    }

    #[test]
    fn test_sample_insufficient() {
        let pool = names(5);
        let mut rng = StdRng::seed_from_u64(1);
        let err = sample_batch(&pool, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::InsufficientFiles { required: 9, found: 5 }
        ));
    }

    #[test]
    fn test_list_skips_directories() {
        let dir = tempdir().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(format!("f{}", i)), "1 2 3\n").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();

        let listed = list_regular_files(dir.path()).unwrap();
        assert_eq!(listed, vec!["f0", "f1", "f2"]);
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let dir = tempdir().unwrap();
        for i in 0..15 {
            fs::write(dir.path().join(format!("m{:02}", i)), "1 2 3\n").unwrap();
        }

        let a = select_batch(dir.path(), Some(99)).unwrap();
        let b = select_batch(dir.path(), Some(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_names_keeps_order() {
        let pool = names(BATCH_SIZE);
        let batch = SelectionBatch::from_names(pool.iter().rev().cloned()).unwrap();
        assert_eq!(batch.names()[0], "well_08.txt");
        assert_eq!(batch.len(), BATCH_SIZE);
    }

    #[test]
    fn test_from_names_rejects_duplicates() {
        let mut pool = names(BATCH_SIZE);
        pool[5] = pool[2].clone();
        let err = SelectionBatch::from_names(pool).unwrap_err();
        assert!(matches!(err, SelectionError::DuplicateName(n) if n == "well_02.txt"));

        let err = SelectionBatch::from_names(["a", "a"]).unwrap_err();
        assert!(matches!(err, SelectionError::DuplicateName(_)));
    }

    #[test]
    fn test_from_names_rejects_wrong_size() {
        let err = SelectionBatch::from_names(["a"]).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::BatchSize { required: 9, found: 1 }
        ));
        assert!(SelectionBatch::from_names(names(10)).is_err());
    }
}
