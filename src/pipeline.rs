//! Build → scan → report pipeline
//!
//! The work directory created by `go build -work` is single-use scratch
//! space. It is owned by a [`Workspace`] guard from the moment the build
//! reports it, so every exit path removes it.

use crate::build::BuildOrchestrator;
use crate::error::{HeftError, Result};
use crate::report::{LibraryReport, SizeReportBuilder};
use crate::workspace::WorkspaceScanner;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Transient build directory, removed when dropped
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        remove_workspace(&self.root);
    }
}

/// Best-effort removal; failures are logged and never replace the real error
fn remove_workspace(root: &Path) {
    match fs::remove_dir_all(root) {
        Ok(()) => debug!("Removed work directory {}", root.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Can't remove work directory {}: {}", root.display(), e),
    }
}

/// Result of a successful pipeline run
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Sizes of every library linked into the program
    Report(LibraryReport),
    /// The build produced no package archives
    NothingFound,
}

/// Sequences the build, the workspace scan and the size report
pub struct Pipeline {
    orchestrator: BuildOrchestrator,
    scanner: WorkspaceScanner,
    report_builder: SizeReportBuilder,
}

impl Pipeline {
    pub fn new(orchestrator: BuildOrchestrator, report_builder: SizeReportBuilder) -> Self {
        Self {
            orchestrator,
            scanner: WorkspaceScanner::new(),
            report_builder,
        }
    }

    /// Build `source` and measure every package archive it links
    pub async fn run(&self, source: &Path) -> Result<PipelineOutcome> {
        if !source.exists() {
            return Err(HeftError::InputNotFound {
                path: source.to_path_buf(),
            });
        }

        let workspace = match self.orchestrator.build(source).await {
            Ok(root) => Workspace::new(root),
            Err(err) => {
                if let Some(root) = err.workspace() {
                    remove_workspace(root);
                }
                return Err(err);
            }
        };

        self.measure(&workspace)
    }

    /// Scan an already built workspace and size its archives
    pub fn measure(&self, workspace: &Workspace) -> Result<PipelineOutcome> {
        let table = self.scanner.scan(workspace.root())?;

        if table.is_empty() {
            return Ok(PipelineOutcome::NothingFound);
        }

        let report = self.report_builder.build(&table)?;
        Ok(PipelineOutcome::Report(report))
    }
}
