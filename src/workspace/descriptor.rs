//! Parser for the `importcfg` files `go build` leaves in each package directory
//!
//! An importcfg mixes several directives (`importmap`, `packageshlib`, ...).
//! Only `packagefile <name>=<archive>` lines matter here: they say which
//! compiled archive backs each imported package.

use crate::error::{HeftError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Name of the descriptor file inside every package directory of the workspace
pub const DESCRIPTOR_FILE_NAME: &str = "importcfg";

const PACKAGE_FILE_DIRECTIVE: &str = "packagefile ";
const VENDOR_MARKER: &str = "vendor/";

/// One `packagefile` directive: a package and the archive compiled for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRef {
    /// Normalized package name
    pub package: String,
    /// Path of the compiled archive as written in the descriptor
    pub path: PathBuf,
}

/// Read a descriptor file and return every archive it references, in file order
pub fn parse_file(path: &Path) -> Result<Vec<ArchiveRef>> {
    let to_error = |source| HeftError::DescriptorReadError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(to_error)?;
    let reader = BufReader::new(file);
    let mut refs = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(to_error)?;
        if let Some(archive) = parse_line(&line) {
            refs.push(archive);
        }
    }

    Ok(refs)
}

/// Parse descriptor text that is already in memory
pub fn parse_str(content: &str) -> Vec<ArchiveRef> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ArchiveRef> {
    let spec = line.strip_prefix(PACKAGE_FILE_DIRECTIVE)?;
    let (raw_name, path) = spec.split_once('=')?;

    let raw_name = raw_name.trim();
    let path = path.trim();
    if raw_name.is_empty() || path.is_empty() {
        return None;
    }

    Some(ArchiveRef {
        package: normalize_package_name(raw_name).to_string(),
        path: PathBuf::from(path),
    })
}

/// Strip any vendoring prefix so a vendored package is named like the upstream one
///
/// Everything up to and including the first `vendor/` is dropped.
pub fn normalize_package_name(name: &str) -> &str {
    match name.find(VENDOR_MARKER) {
        Some(index) => &name[index + VENDOR_MARKER.len()..],
        None => name,
    }
}
