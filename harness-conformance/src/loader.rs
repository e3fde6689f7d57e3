//! Fixture discovery.

use std::path::{Path, PathBuf};

use crate::config::FixtureNaming;
use crate::types::{ExpectedOutput, Fixture};

/// Errors that can occur when discovering or loading fixtures.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid fixture naming pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to list fixtures in {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture {input} has no expected output file {expected}")]
    MissingExpected { input: String, expected: String },

    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Lazy sequence of fixtures discovered in one directory.
///
/// The directory is listed once, up front, and the matching names sorted;
/// file contents are read only as the iterator advances.
#[derive(Debug)]
pub struct FixtureScan {
    dir: PathBuf,
    naming: FixtureNaming,
    pending: std::vec::IntoIter<(String, String)>,
}

impl FixtureScan {
    /// Number of fixtures not yet yielded.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Iterator for FixtureScan {
    type Item = Result<Fixture, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (input_name, id) = self.pending.next()?;
        Some(load_fixture(&self.dir, &self.naming, input_name, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

/// Discover fixtures in `dir`, ordered lexicographically by file name.
pub fn scan_fixtures(dir: &Path, naming: &FixtureNaming) -> Result<FixtureScan, LoadError> {
    let matcher = naming.matcher()?;
    let read_dir_err = |source| LoadError::ReadDir {
        path: dir.display().to_string(),
        source,
    };

    let mut pending = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        if entry.path().is_dir() {
            continue;
        }
        // Non-UTF-8 names cannot match the pattern.
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let id = match matcher.captures(&name) {
            Some(caps) => caps[1].to_string(),
            None => continue,
        };
        pending.push((name, id));
    }

    pending.sort();

    Ok(FixtureScan {
        dir: dir.to_path_buf(),
        naming: naming.clone(),
        pending: pending.into_iter(),
    })
}

/// Read one fixture's input and its golden output.
fn load_fixture(
    dir: &Path,
    naming: &FixtureNaming,
    input_name: String,
    id: String,
) -> Result<Fixture, LoadError> {
    let expected_name = naming.expected_name(&id);
    let expected_path = dir.join(&expected_name);
    if !expected_path.is_file() {
        return Err(LoadError::MissingExpected {
            input: input_name,
            expected: expected_name,
        });
    }

    let input = read_bytes(&dir.join(&input_name))?;
    let expected = ExpectedOutput::new(expected_name, read_bytes(&expected_path)?);

    Ok(Fixture {
        id,
        input_name,
        input,
        expected,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|e| LoadError::Read {
        path: path.display().to_string(),
        source: e,
    })
}
