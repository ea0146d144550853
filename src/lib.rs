//! goheft - list the sizes of the static libraries linked into a Go binary
//!
//! A library for rebuilding a Go program with its work directory preserved,
//! reading the per-package `importcfg` files from that directory and sizing
//! every compiled package archive.

pub mod build;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod workspace;

// Re-export main types for convenience
pub use build::{BuildConfig, BuildOrchestrator, BuildProgress};
pub use cli::{Args, CliApp, OutputFormat};
pub use error::{HeftError, Result};
pub use pipeline::{Pipeline, PipelineOutcome, Workspace};
pub use report::{LibraryEntry, LibraryReport, SizeReportBuilder};
pub use workspace::{normalize_package_name, PackagePathTable, WorkspaceScanner};
