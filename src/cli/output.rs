//! CLI output formatting module
//!
//! Renders a [`LibraryReport`] as a colored table, raw `<bytes> <package>`
//! lines or JSON.

use crate::cli::args::OutputFormat;
use crate::report::{LibraryEntry, LibraryReport};
use anyhow::Result;
use bytesize::ByteSize;
use colored::*;
use std::io::Write;

const SIZE_HUGE: u64 = 5 * 1024 * 1024;
const SIZE_BIG: u64 = 1024 * 1024;
const SIZE_SMALL: u64 = 25 * 1024;

/// Width of the size column in pretty output
const SIZE_WIDTH: usize = 10;

/// Main output formatter that handles different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_color: bool,
    shadow_standard: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(format: OutputFormat, use_color: bool, shadow_standard: bool) -> Self {
        Self {
            format,
            use_color,
            shadow_standard,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format and write a size report
    pub fn write_report<W: Write>(&self, writer: &mut W, report: &LibraryReport) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => self.write_pretty_output(writer, report),
            OutputFormat::Raw => self.write_raw_output(writer, report),
            OutputFormat::Json => self.write_json_output(writer, report),
        }
    }

    /// Write the notice shown when a build produced no archives
    pub fn write_nothing_found<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(
            writer,
            "{}",
            self.colorize("No *.a files are found", Color::Yellow)
        )?;
        Ok(())
    }

    /// Write a single-line error message
    pub fn write_error<W: Write>(&self, writer: &mut W, message: &str) -> Result<()> {
        writeln!(writer, "{}", self.colorize(message, Color::Red))?;
        Ok(())
    }

    fn write_pretty_output<W: Write>(&self, writer: &mut W, report: &LibraryReport) -> Result<()> {
        writeln!(writer)?;

        for entry in report {
            self.write_entry(writer, entry)?;
        }

        if let Some(total) = report.total() {
            writeln!(
                writer,
                "\n {:>width$}  {} {}",
                pretty_size(total),
                self.colorize("Total", Color::Bold),
                self.colorize(&format!("(packages: {})", report.len()), Color::Dimmed),
                width = SIZE_WIDTH
            )?;
        }

        writeln!(writer)?;
        Ok(())
    }

    fn write_entry<W: Write>(&self, writer: &mut W, entry: &LibraryEntry) -> Result<()> {
        let size = format!("{:>width$}", pretty_size(entry.size()), width = SIZE_WIDTH);

        if self.shadow_standard && entry.is_standard() {
            writeln!(
                writer,
                " {}  {}",
                self.colorize(&size, Color::Dimmed),
                self.colorize(entry.name(), Color::Dimmed)
            )?;
        } else {
            let size = match size_color(entry.size()) {
                Some(color) => self.colorize(&size, color),
                None => size,
            };
            writeln!(writer, " {}  {}", size, entry.name())?;
        }

        Ok(())
    }

    fn write_raw_output<W: Write>(&self, writer: &mut W, report: &LibraryReport) -> Result<()> {
        for entry in report {
            writeln!(writer, "{} {}", entry.size(), entry.name())?;
        }
        Ok(())
    }

    fn write_json_output<W: Write>(&self, writer: &mut W, report: &LibraryReport) -> Result<()> {
        let output = serde_json::json!({
            "packages": report.entries(),
            "total": report.total(),
            "count": report.len(),
        });

        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        Ok(())
    }

    /// Apply color to text if colors are enabled
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_color {
            match color {
                Color::Red => text.red().to_string(),
                Color::Yellow => text.yellow().to_string(),
                Color::Bold => text.bold().to_string(),
                Color::Dimmed => text.dimmed().to_string(),
            }
        } else {
            text.to_string()
        }
    }
}

/// Styles used in goheft output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Bold,
    Dimmed,
}

fn size_color(size: u64) -> Option<Color> {
    match size {
        s if s > SIZE_HUGE => Some(Color::Red),
        s if s > SIZE_BIG => Some(Color::Yellow),
        s if s < SIZE_SMALL => Some(Color::Dimmed),
        _ => None,
    }
}

fn pretty_size(size: u64) -> String {
    ByteSize(size).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SizeReportBuilder;
    use crate::workspace::PackagePathTable;
    use std::fs;
    use std::path::Path;

    fn create_test_report(dir: &Path, min_size: Option<u64>) -> LibraryReport {
        let mut table = PackagePathTable::new();
        for (name, size) in [
            ("runtime", 4096usize),
            ("github.com/essentialkaos/ek/v12/fmtc", 2048),
            ("errors", 512),
        ] {
            let path = dir.join(format!("{}.a", name.replace('/', "_")));
            fs::write(&path, vec![0u8; size]).unwrap();
            table.insert_if_absent(name.to_string(), path);
        }

        SizeReportBuilder::new()
            .with_min_size(min_size)
            .build(&table)
            .unwrap()
    }

    fn render(formatter: &OutputFormatter, report: &LibraryReport) -> String {
        let mut buffer = Vec::new();
        formatter.write_report(&mut buffer, report).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputFormat::Pretty, true, false);
        assert_eq!(formatter.format(), OutputFormat::Pretty);
        assert!(formatter.use_color);
        assert!(!formatter.shadow_standard);
    }

    #[test]
    fn test_raw_output() {
        let dir = tempfile::tempdir().unwrap();
        let report = create_test_report(dir.path(), None);
        let formatter = OutputFormatter::new(OutputFormat::Raw, false, false);

        assert_eq!(
            render(&formatter, &report),
            "4096 runtime\n2048 github.com/essentialkaos/ek/v12/fmtc\n512 errors\n"
        );
    }

    #[test]
    fn test_pretty_output_with_total() {
        let dir = tempfile::tempdir().unwrap();
        let report = create_test_report(dir.path(), None);
        let formatter = OutputFormatter::new(OutputFormat::Pretty, false, false);

        let output = render(&formatter, &report);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "");
        assert!(lines[1].ends_with("  runtime"));
        assert!(lines[3].ends_with("  errors"));
        assert!(output.contains("Total (packages: 3)"));
    }

    #[test]
    fn test_pretty_output_without_total_when_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let report = create_test_report(dir.path(), Some(1024));
        let formatter = OutputFormatter::new(OutputFormat::Pretty, false, false);

        let output = render(&formatter, &report);

        assert!(!output.contains("Total"));
        assert!(!output.contains("errors"));
        assert!(output.contains("runtime"));
    }

    #[test]
    fn test_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let report = create_test_report(dir.path(), None);
        let formatter = OutputFormatter::new(OutputFormat::Json, false, false);

        let value: serde_json::Value = serde_json::from_str(&render(&formatter, &report)).unwrap();

        assert_eq!(value["count"], 3);
        assert_eq!(value["total"], 4096 + 2048 + 512);
        assert_eq!(value["packages"][0]["name"], "runtime");
        assert_eq!(value["packages"][0]["size"], 4096);
    }

    #[test]
    fn test_size_tiers() {
        assert_eq!(size_color(6 * 1024 * 1024), Some(Color::Red));
        assert_eq!(size_color(2 * 1024 * 1024), Some(Color::Yellow));
        assert_eq!(size_color(100 * 1024), None);
        assert_eq!(size_color(1024), Some(Color::Dimmed));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = OutputFormatter::new(OutputFormat::Pretty, false, true);
        assert_eq!(formatter.colorize("test", Color::Red), "test");
    }
}
