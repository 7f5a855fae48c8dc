//! Report sinks: where compiled reports go once a scenario is done.
//!
//! The compiler never writes anything itself; callers hand the snapshot to a
//! [`ReportSink`]:
//! - `JsonFileSink` writes one `<id>.json` file per scenario
//! - `JsonWriterSink` streams JSON to any `io::Write` (stdout in the CLI)
//! - `MemorySink` keeps reports in memory for tests

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config;
use crate::report::{ReportResult, ScenarioReport};

/// Destination for compiled reports
pub trait ReportSink {
    /// Persist one report
    fn write(&mut self, report: &ScenarioReport) -> ReportResult<()>;
}

/// Writes each report to `<dir>/<id>.json`
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pretty: config::get().output.pretty,
        }
    }

    /// Sink for the configured output directory
    pub fn from_config() -> Self {
        Self::new(config::output_dir())
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the given report is written to
    pub fn report_path(&self, report: &ScenarioReport) -> PathBuf {
        self.dir.join(format!("{}.json", report.id))
    }
}

impl ReportSink for JsonFileSink {
    fn write(&mut self, report: &ScenarioReport) -> ReportResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.report_path(report);
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        fs::write(&path, json)?;

        tracing::info!(scenario = %report.name, path = %path.display(), "report written");
        Ok(())
    }
}

/// Writes each report as one JSON document to a writer
#[derive(Debug)]
pub struct JsonWriterSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonWriterSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonWriterSink<W> {
    fn write(&mut self, report: &ScenarioReport) -> ReportResult<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, report)?;
        } else {
            serde_json::to_writer(&mut self.writer, report)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects reports in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub reports: Vec<ScenarioReport>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn write(&mut self, report: &ScenarioReport) -> ReportResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
