//! `go build` orchestration
//!
//! Runs a forced, verbose rebuild that keeps its work directory and follows
//! the tool's stderr to learn where that directory is. The first stderr line
//! is `WORK=<dir>`, every following line names a package being compiled.

use crate::error::{HeftError, Result};
use crate::workspace::normalize_package_name;
use log::debug;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

const WORK_DIR_PREFIX: &str = "WORK=";
const FATAL_PREFIX: &str = "can't load package";

/// Number of trailing stderr lines kept for error messages
const DIAGNOSTIC_TAIL: usize = 20;

/// Configuration for the build tool invocation
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Path to the go executable
    pub go_path: String,
    /// Build tags passed with `-tags`
    pub tags: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            go_path: "go".to_string(),
            tags: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Tags joined the way `-tags` expects them, `None` when there are no tags
    pub fn tags_arg(&self) -> Option<String> {
        let tags: Vec<&str> = self
            .tags
            .iter()
            .flat_map(|tag| tag.split([',', ' ']))
            .filter(|tag| !tag.is_empty())
            .collect();

        if tags.is_empty() {
            None
        } else {
            Some(tags.join(","))
        }
    }
}

/// Receives progress notices while the build runs
pub trait BuildProgress: Send + Sync {
    /// The build process has been started
    fn started(&self) {}

    /// A package is being compiled
    fn compiling(&self, package: &str);

    /// The build process exited, successfully or not
    fn finished(&self) {}
}

/// What the stderr reader learned by the time the stream ended
#[derive(Debug, Default)]
struct StreamSummary {
    work_dir: Option<PathBuf>,
    diagnostics: VecDeque<String>,
}

impl StreamSummary {
    fn remember(&mut self, line: String) {
        if self.diagnostics.len() == DIAGNOSTIC_TAIL {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(line);
    }
}

/// Runs `go build` and reports the work directory it leaves behind
pub struct BuildOrchestrator {
    config: BuildConfig,
    progress: Option<Arc<dyn BuildProgress>>,
}

impl BuildOrchestrator {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Forward per-package notices to `progress`
    pub fn with_progress(mut self, progress: Arc<dyn BuildProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Check if the go tool can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.config.go_path)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Arguments passed to the go tool for `source`
    pub fn build_args(&self, source: &Path) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            "-work".to_string(),
            "-a".to_string(),
            "-v".to_string(),
        ];

        if let Some(tags) = self.config.tags_arg() {
            args.push("-tags".to_string());
            args.push(tags);
        }

        args.push(source.to_string_lossy().into_owned());
        args
    }

    /// Rebuild `source` from scratch and return the work directory.
    ///
    /// On a failed build the error still carries the work directory when the
    /// tool announced one, so the caller can remove it.
    pub async fn build(&self, source: &Path) -> Result<PathBuf> {
        let args = self.build_args(source);
        debug!("Running {} {}", self.config.go_path, args.join(" "));

        let mut child = Command::new(&self.config.go_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HeftError::BuildStartFailed { source })?;

        let stderr = child.stderr.take().ok_or_else(|| HeftError::BuildStartFailed {
            source: std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Can't redirect 'go build' output",
            ),
        })?;

        let reader = tokio::spawn(read_stream(stderr, self.progress.clone()));

        if let Some(progress) = &self.progress {
            progress.started();
        }

        let status = child.wait().await;

        if let Some(progress) = &self.progress {
            progress.finished();
        }

        // The reader ends once stderr closes, which happens with the process
        let summary = reader.await.unwrap_or_else(|e| {
            debug!("Build output reader failed: {e}");
            StreamSummary::default()
        });

        finish_build(status, summary)
    }
}

/// Map the exit of the build process to its work directory.
///
/// The process was started, so any work directory it announced is handed
/// back with the error, including when waiting on it failed.
fn finish_build(status: std::io::Result<ExitStatus>, summary: StreamSummary) -> Result<PathBuf> {
    let status = match status {
        Ok(status) if status.success() => status,
        Ok(status) => {
            return Err(HeftError::BuildFailed {
                status: status.to_string(),
                diagnostics: summary.diagnostics.into(),
                workspace: summary.work_dir,
            });
        }
        Err(e) => {
            return Err(HeftError::BuildFailed {
                status: format!("wait failed: {e}"),
                diagnostics: summary.diagnostics.into(),
                workspace: summary.work_dir,
            });
        }
    };

    let work_dir = summary.work_dir.ok_or(HeftError::WorkspaceNotReported)?;
    debug!("Build finished ({status}), work directory is {}", work_dir.display());

    Ok(work_dir)
}

impl Default for BuildOrchestrator {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

async fn read_stream<R>(stream: R, progress: Option<Arc<dyn BuildProgress>>) -> StreamSummary
where
    R: AsyncRead + Unpin,
{
    let mut summary = StreamSummary::default();
    let mut lines = BufReader::new(stream).lines();
    let mut first = true;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!("Can't read build output: {e}");
                break;
            }
        };

        if std::mem::take(&mut first) {
            if let Some(dir) = line.strip_prefix(WORK_DIR_PREFIX).map(str::trim) {
                // The work directory is removed afterwards, so it must be absolute
                if Path::new(dir).is_absolute() {
                    summary.work_dir = Some(PathBuf::from(dir));
                    continue;
                }
                debug!("Ignoring work directory that is not absolute: {dir}");
            }
        }

        if line.starts_with(FATAL_PREFIX) {
            summary.remember(line);
            break;
        }

        if let Some(progress) = &progress {
            progress.compiling(normalize_package_name(&line));
        }

        summary.remember(line);
    }

    summary
}
