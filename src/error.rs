//! Error types shared by the build, scan and report stages

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while building a program and measuring its packages
#[derive(Debug, Error)]
pub enum HeftError {
    /// The source file handed to the pipeline does not exist
    #[error("Can't build binary - file {} does not exist", .path.display())]
    InputNotFound { path: PathBuf },

    /// The build tool could not be launched or its stderr could not be attached
    #[error("Can't start build process: {source}")]
    BuildStartFailed {
        #[source]
        source: std::io::Error,
    },

    /// The build tool ran but exited with a failure status
    #[error("Build process failed ({status}){}", format_diagnostics(.diagnostics))]
    BuildFailed {
        status: String,
        diagnostics: Vec<String>,
        workspace: Option<PathBuf>,
    },

    /// The build succeeded but never announced its work directory
    #[error("Build process didn't report its work directory")]
    WorkspaceNotReported,

    /// A per-package importcfg file (or the workspace itself) could not be read
    #[error("Can't read {}: {source}", .path.display())]
    DescriptorReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An archive listed in the workspace could not be stat'ed
    #[error("Can't get size of {package} archive {}: {source}", .path.display())]
    ResolutionError {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HeftError {
    /// Work directory left behind by a failed build, if the build got far enough to create one
    pub fn workspace(&self) -> Option<&Path> {
        match self {
            HeftError::BuildFailed { workspace, .. } => workspace.as_deref(),
            _ => None,
        }
    }
}

fn format_diagnostics(diagnostics: &[String]) -> String {
    match diagnostics.last() {
        Some(line) => format!(": {line}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, HeftError>;
