//! CLI module for goheft
//!
//! This module provides the command-line interface functionality including
//! argument parsing, terminal detection, build progress and output formatting.

pub mod args;
pub mod output;

pub use args::{Args, OutputFormat};
pub use output::{Color, OutputFormatter};

use crate::build::{BuildConfig, BuildOrchestrator, BuildProgress};
use crate::error::HeftError;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::report::SizeReportBuilder;
use anyhow::Result;
use colored::*;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Terminal capabilities the output depends on
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    pub stdout_tty: bool,
    pub stderr_tty: bool,
    pub no_color_env: bool,
    pub ci: bool,
}

impl Terminal {
    /// Detect capabilities from the running process
    pub fn detect() -> Self {
        Self {
            stdout_tty: io::stdout().is_terminal(),
            stderr_tty: io::stderr().is_terminal(),
            no_color_env: std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
            ci: std::env::var_os("CI").is_some_and(|v| !v.is_empty()),
        }
    }
}

/// Single status line on stderr showing which package is being compiled
struct StatusLine {
    use_color: bool,
}

impl StatusLine {
    fn show(&self, text: &str) {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[K{text}");
        let _ = stderr.flush();
    }
}

impl BuildProgress for StatusLine {
    fn started(&self) {
        self.show("Processing sources…");
    }

    fn compiling(&self, package: &str) {
        let package = if self.use_color {
            package.bold().to_string()
        } else {
            package.to_string()
        };
        self.show(&format!("Compiling {package}…"));
    }

    fn finished(&self) {
        self.show("");
    }
}

/// Main CLI application runner
pub struct CliApp {
    args: Args,
    terminal: Terminal,
}

impl CliApp {
    /// Create a new CLI application with parsed arguments
    pub fn new(args: Args) -> Self {
        Self::with_terminal(args, Terminal::detect())
    }

    pub fn with_terminal(args: Args, terminal: Terminal) -> Self {
        Self { args, terminal }
    }

    /// Output format: explicit choice, otherwise raw when stdout is not a terminal
    pub fn output_format(&self) -> OutputFormat {
        self.args.format.unwrap_or(if self.terminal.stdout_tty {
            OutputFormat::Pretty
        } else {
            OutputFormat::Raw
        })
    }

    fn use_color(&self) -> bool {
        !self.args.no_color && !self.terminal.no_color_env && self.terminal.stdout_tty
    }

    fn show_progress(&self) -> bool {
        self.output_format() == OutputFormat::Pretty && self.terminal.stderr_tty && !self.terminal.ci
    }

    fn build_config(&self) -> BuildConfig {
        BuildConfig {
            go_path: self.args.go_path.clone(),
            tags: self.args.tags.clone(),
        }
    }

    fn pipeline(&self) -> Pipeline {
        let mut orchestrator = BuildOrchestrator::new(self.build_config());
        if self.show_progress() {
            orchestrator = orchestrator.with_progress(Arc::new(StatusLine {
                use_color: self.use_color(),
            }));
        }

        Pipeline::new(
            orchestrator,
            SizeReportBuilder::new().with_min_size(self.args.min_size),
        )
    }

    /// Run the CLI application and return the process exit code
    pub async fn run(&self) -> Result<i32> {
        let formatter = OutputFormatter::new(
            self.output_format(),
            self.use_color(),
            self.args.external,
        );

        match self.pipeline().run(&self.args.file).await {
            Ok(PipelineOutcome::Report(report)) => {
                let mut stdout = io::stdout().lock();
                formatter.write_report(&mut stdout, &report)?;
                Ok(0)
            }
            Ok(PipelineOutcome::NothingFound) => {
                formatter.write_nothing_found(&mut io::stderr())?;
                Ok(0)
            }
            Err(e) => {
                log::debug!("Pipeline failed: {e:?}");
                let message = self.error_message(&e).await;
                formatter.write_error(&mut io::stderr(), &message)?;
                Ok(1)
            }
        }
    }

    /// User-facing text for a failed run
    async fn error_message(&self, err: &HeftError) -> String {
        if let HeftError::BuildStartFailed { .. } = err {
            let orchestrator = BuildOrchestrator::new(self.build_config());
            if !orchestrator.is_available().await {
                return format!("Can't find go executable '{}'", self.args.go_path);
            }
        }

        err.to_string()
    }
}
