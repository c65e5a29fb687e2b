//! File sink: append-only text output for persisted records
//!
//! Each published record becomes one line:
//!
//! ```text
//! <YYYY-MM-DD-HH:MM:SS.mmm>,<record>
//! ```
//!
//! The record part is the record's `Display` form, so prices are already in
//! fractional notation.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;
use types::errors::ServiceError;

use backbone::Connector;

/// Output timestamp layout, millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S%.3f";

/// Render a timestamp the way every output line starts.
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Controls when buffered lines are flushed to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush after every line.
    EveryWrite,
    /// Flush every N lines, and on drop.
    EveryN(usize),
}

#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub path: PathBuf,
    pub flush_policy: FlushPolicy,
    /// Discard existing content on open instead of appending to it.
    pub truncate: bool,
}

impl SinkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_policy: FlushPolicy::EveryWrite,
            truncate: false,
        }
    }

    pub fn truncating(mut self) -> Self {
        self.truncate = true;
        self
    }
}

/// Outbound connector appending timestamped lines to a file.
pub struct FileSink {
    config: SinkConfig,
    writer: BufWriter<File>,
    lines_written: u64,
    writes_since_flush: usize,
}

impl FileSink {
    /// Open (or create) the output file, creating parent directories as
    /// needed. Appends unless the config asks for truncation.
    pub fn open(config: SinkConfig) -> io::Result<Self> {
        if let Some(dir) = config.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut options = OpenOptions::new();
        options.create(true);
        if config.truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(&config.path)?;

        Ok(Self {
            config,
            writer: BufWriter::new(file),
            lines_written: 0,
            writes_since_flush: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Append `<timestamp>,<record>` using the current local time.
    pub fn write_record(&mut self, record: &dyn fmt::Display) -> io::Result<()> {
        self.write_record_at(Local::now(), record)
    }

    pub fn write_record_at(
        &mut self,
        at: DateTime<Local>,
        record: &dyn fmt::Display,
    ) -> io::Result<()> {
        writeln!(self.writer, "{},{}", format_timestamp(at), record)?;
        self.lines_written += 1;
        self.writes_since_flush += 1;
        self.apply_flush_policy()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writes_since_flush = 0;
        Ok(())
    }

    fn apply_flush_policy(&mut self) -> io::Result<()> {
        let should_flush = match self.config.flush_policy {
            FlushPolicy::EveryWrite => true,
            FlushPolicy::EveryN(n) => self.writes_since_flush >= n,
        };
        if should_flush {
            self.flush()?;
        }
        Ok(())
    }
}

impl<V: fmt::Display> Connector<V> for FileSink {
    fn publish(&mut self, data: &V) -> Result<(), ServiceError> {
        self.write_record(data).map_err(|e| ServiceError::Sink {
            reason: format!("{}: {}", self.config.path.display(), e),
        })?;
        debug!(path = %self.config.path.display(), lines = self.lines_written, "Record persisted");
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
