//! Size report built from the archives found in a build workspace

use crate::error::{HeftError, Result};
use crate::workspace::PackagePathTable;
use serde::Serialize;
use std::fs;

/// A package and the size of the archive compiled for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    name: String,
    size: u64,
}

impl LibraryEntry {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Archive size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Standard library packages have no dot in their import path
    pub fn is_standard(&self) -> bool {
        !self.name.contains('.')
    }
}

/// Libraries sorted by size, largest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryReport {
    entries: Vec<LibraryEntry>,
    total: Option<u64>,
}

impl LibraryReport {
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LibraryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every archive size; absent when a minimum size filtered the view
    pub fn total(&self) -> Option<u64> {
        self.total
    }
}

impl<'a> IntoIterator for &'a LibraryReport {
    type Item = &'a LibraryEntry;
    type IntoIter = std::slice::Iter<'a, LibraryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Turns a package table into a [`LibraryReport`]
#[derive(Debug, Clone, Default)]
pub struct SizeReportBuilder {
    min_size: Option<u64>,
}

impl SizeReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide libraries smaller than `min_size` bytes (this also drops the total)
    pub fn with_min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    /// Stat every archive in `table` and build the sorted report
    pub fn build(&self, table: &PackagePathTable) -> Result<LibraryReport> {
        let mut entries = Vec::with_capacity(table.len());

        for (package, path) in table.iter() {
            let metadata = fs::metadata(path).map_err(|source| HeftError::ResolutionError {
                package: package.to_string(),
                path: path.to_path_buf(),
                source,
            })?;

            entries.push(LibraryEntry::new(package, metadata.len()));
        }

        // table iterates by name, so a stable sort keeps ties in name order
        entries.sort_by(|a, b| b.size.cmp(&a.size));

        let threshold = self.min_size.unwrap_or(0);
        let total = if threshold > 0 {
            entries.retain(|entry| entry.size >= threshold);
            None
        } else {
            Some(entries.iter().map(LibraryEntry::size).sum())
        };

        Ok(LibraryReport { entries, total })
    }
}
