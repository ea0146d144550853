//! Build workspace scanning
//!
//! `go build -work` leaves one directory per compiled package under `$WORK`,
//! each holding an `importcfg`. Folding all of them together yields the
//! archive backing every package that went into the binary.

pub mod descriptor;

pub use descriptor::{normalize_package_name, ArchiveRef, DESCRIPTOR_FILE_NAME};

use crate::error::{HeftError, Result};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Package name to archive path, where the first path recorded for a package wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagePathTable {
    paths: BTreeMap<String, PathBuf>,
}

impl PackagePathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` for `package` unless the package is already known.
    ///
    /// Returns `true` if the entry was added.
    pub fn insert_if_absent(&mut self, package: String, path: PathBuf) -> bool {
        if self.paths.contains_key(&package) {
            return false;
        }

        self.paths.insert(package, path);
        true
    }

    pub fn get(&self, package: &str) -> Option<&Path> {
        self.paths.get(package).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over `(package, archive)` pairs ordered by package name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }
}

impl Extend<ArchiveRef> for PackagePathTable {
    fn extend<I: IntoIterator<Item = ArchiveRef>>(&mut self, refs: I) {
        for archive in refs {
            self.insert_if_absent(archive.package, archive.path);
        }
    }
}

/// Walks a build workspace and collects the archives of every package
pub struct WorkspaceScanner {
    descriptor_name: String,
}

impl WorkspaceScanner {
    pub fn new() -> Self {
        Self {
            descriptor_name: DESCRIPTOR_FILE_NAME.to_string(),
        }
    }

    /// Scan every package directory directly under `root`.
    ///
    /// Directories are visited in file-name order; the first unreadable
    /// descriptor stops the scan.
    pub fn scan(&self, root: &Path) -> Result<PackagePathTable> {
        let mut table = PackagePathTable::new();
        let mut visited = 0usize;

        for package_dir in self.package_dirs(root)? {
            let descriptor = package_dir.join(&self.descriptor_name);
            table.extend(descriptor::parse_file(&descriptor)?);
            visited += 1;
        }

        debug!(
            "Scanned {} package directories in {}, found {} packages",
            visited,
            root.display(),
            table.len()
        );

        Ok(table)
    }

    fn package_dirs(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                HeftError::DescriptorReadError {
                    path,
                    source: e.into(),
                }
            })?;

            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            } else {
                debug!("Skipping non-directory entry {}", entry.path().display());
            }
        }

        if dirs.is_empty() {
            debug!("Workspace {} has no package directories", root.display());
        }

        Ok(dirs)
    }
}

impl Default for WorkspaceScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write_descriptor(root: &Path, dir: &str, content: &str) {
        let package_dir = root.join(dir);
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(package_dir.join(DESCRIPTOR_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_table_first_writer_wins() {
        let mut table = PackagePathTable::new();

        assert!(table.insert_if_absent("bar".to_string(), PathBuf::from("/a.a")));
        assert!(!table.insert_if_absent("bar".to_string(), PathBuf::from("/b.a")));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("bar"), Some(Path::new("/a.a")));
    }

    #[test]
    fn test_scan_folds_descriptors_in_directory_order() {
        let work = tempfile::tempdir().unwrap();
        write_descriptor(
            work.path(),
            "b001",
            "packagefile vendor/mod/foo=/wk/a.a\npackagefile bar=/wk/b.a\n",
        );
        write_descriptor(work.path(), "b002", "packagefile bar=/wk/b2.a\n");
        fs::write(work.path().join("trimpath.txt"), "not a package").unwrap();

        let table = WorkspaceScanner::new().scan(work.path()).unwrap();

        let pairs: Vec<(&str, &Path)> = table.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("bar", Path::new("/wk/b.a")),
                ("mod/foo", Path::new("/wk/a.a")),
            ]
        );
    }

    #[test]
    fn test_scan_empty_workspace() {
        let work = tempfile::tempdir().unwrap();
        fs::write(work.path().join("stray-file"), "").unwrap();

        let table = WorkspaceScanner::new().scan(work.path()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_scan_fails_on_missing_descriptor() {
        let work = tempfile::tempdir().unwrap();
        write_descriptor(work.path(), "b001", "packagefile fmt=/wk/fmt.a\n");
        fs::create_dir(work.path().join("b002")).unwrap();

        match WorkspaceScanner::new().scan(work.path()) {
            Err(HeftError::DescriptorReadError { path, .. }) => {
                assert_eq!(path, work.path().join("b002").join(DESCRIPTOR_FILE_NAME));
            }
            other => panic!("Expected DescriptorReadError, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_missing_workspace_root() {
        let work = tempfile::tempdir().unwrap();
        let missing = work.path().join("gone");

        let result = WorkspaceScanner::new().scan(&missing);
        assert!(matches!(
            result,
            Err(HeftError::DescriptorReadError { .. })
        ));
    }
}
