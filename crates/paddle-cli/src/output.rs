//! Output formatting and writing utilities
//!
//! Response bodies go to stdout (or a file); status lines go to stderr.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use paddle_core::ApiError;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Trait for formatting serializable values
pub trait OutputFormatter {
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

/// Output writer that handles formats, colors and quiet mode
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
    status: Box<dyn Write>,
}

impl OutputWriter {
    /// Writer for stdout, with status lines on stderr
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writers(
            format,
            use_color,
            quiet,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Writer with custom sinks
    pub fn with_writers(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
        status: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
            status,
        }
    }

    /// Write a formatted value to stdout
    pub fn write_value<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        writeln!(self.writer, "{}", formatted.trim_end())?;
        Ok(())
    }

    /// Write raw bytes to stdout untouched
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a formatted value to a file
    pub fn save_value<T: Serialize>(&mut self, path: &Path, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.save_bytes(path, format!("{}\n", formatted.trim_end()).as_bytes())
    }

    /// Write raw bytes to a file
    pub fn save_bytes(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "response saved");
        self.success(&format!("Saved {} bytes to {}", bytes.len(), path.display()))
    }

    /// Write a failed API call as a structured record
    pub fn write_api_error(&mut self, error: &ApiError) -> Result<()> {
        self.write_value(error)
    }

    /// Status line for a successful operation
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.use_color {
            writeln!(self.status, "{} {}", "✓".green().bold(), message)?;
        } else {
            writeln!(self.status, "✓ {}", message)?;
        }
        Ok(())
    }

    /// Informational status line
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.use_color {
            writeln!(self.status, "{}", message.dimmed())?;
        } else {
            writeln!(self.status, "{}", message)?;
        }
        Ok(())
    }
}
