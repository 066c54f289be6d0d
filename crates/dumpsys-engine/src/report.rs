//! Report renderer - turns a finished [`Report`] into dumpsys text
//!
//! Successful output goes to `out`, per-service problems to `err`. Rendering
//! is purely a function of the report, so the same report always produces
//! the same bytes.

use std::io::{self, Write};
use std::time::Duration;

use dumpsys_core::{DumpOutcome, Report, ReportKind, ServiceReport};

const SEPARATOR: &str =
    "-------------------------------------------------------------------------------";

/// Writes reports to a primary and an error stream
pub struct Renderer<O: Write, E: Write> {
    out: O,
    err: E,
}

impl<O: Write, E: Write> Renderer<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Render `report` and flush both streams
    pub fn render(&mut self, report: &Report) -> io::Result<()> {
        match report.kind {
            ReportKind::Dump => self.render_dump(report)?,
            ReportKind::List => {
                self.write_summary("Currently running services:", report)?;
                self.write_missing(report)?;
            }
            ReportKind::HardwareList => {
                self.write_summary("Currently running hardware services:", report)?;
            }
            ReportKind::Single => self.render_single(report)?,
        }

        self.out.flush()?;
        self.err.flush()
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn render_dump(&mut self, report: &Report) -> io::Result<()> {
        self.write_summary("Currently running services:", report)?;

        for service in &report.services {
            let name = service.name.as_str();
            match &service.outcome {
                DumpOutcome::Dumped { text, elapsed } => self.write_block(name, text, *elapsed)?,
                DumpOutcome::TimedOut { .. } => {
                    self.write_header(name)?;
                    self.write_timeout(name, report.timeout)?;
                }
                DumpOutcome::NotRunning => self.write_not_found(name)?,
                DumpOutcome::Failed {
                    text,
                    elapsed,
                    reason,
                } => {
                    if !text.is_empty() {
                        self.write_block(name, text, *elapsed)?;
                    }
                    self.write_failure(name, reason)?;
                }
                DumpOutcome::Listed | DumpOutcome::Skipped => {}
            }
        }
        Ok(())
    }

    fn render_single(&mut self, report: &Report) -> io::Result<()> {
        for service in &report.services {
            let name = service.name.as_str();
            match &service.outcome {
                DumpOutcome::Dumped { text, .. } => self.out.write_all(text)?,
                DumpOutcome::TimedOut { .. } => self.write_timeout(name, report.timeout)?,
                DumpOutcome::NotRunning => self.write_not_found(name)?,
                DumpOutcome::Failed { text, reason, .. } => {
                    self.out.write_all(text)?;
                    self.write_failure(name, reason)?;
                }
                DumpOutcome::Listed | DumpOutcome::Skipped => {}
            }
        }
        Ok(())
    }

    /// Running targets, skip-set members last, each group in report order
    fn write_summary(&mut self, title: &str, report: &Report) -> io::Result<()> {
        writeln!(self.out, "{}", title)?;

        let (skipped, plain): (Vec<&ServiceReport>, Vec<&ServiceReport>) =
            report.running().partition(|s| s.skipped);
        for service in plain {
            writeln!(self.out, "  {}", service.name)?;
        }
        for service in skipped {
            writeln!(self.out, "  {} (skipped)", service.name)?;
        }

        if report.kind == ReportKind::Dump {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn write_missing(&mut self, report: &Report) -> io::Result<()> {
        for service in report.not_running() {
            self.write_not_found(service.name.as_str())?;
        }
        Ok(())
    }

    fn write_header(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, "DUMP OF SERVICE {}:", name)
    }

    /// Header, the text exactly as captured, then the duration line
    fn write_block(&mut self, name: &str, text: &[u8], elapsed: Duration) -> io::Result<()> {
        self.write_header(name)?;
        self.out.write_all(text)?;

        // The duration line starts on a line of its own
        let lead = if text.is_empty() || text.ends_with(b"\n") {
            ""
        } else {
            "\n"
        };
        writeln!(
            self.out,
            "{}--------- {:.3}s was the duration of dumpsys {}",
            lead,
            elapsed.as_secs_f64(),
            name
        )
    }

    fn write_timeout(&mut self, name: &str, timeout: Duration) -> io::Result<()> {
        writeln!(
            self.out,
            "*** SERVICE '{}' DUMP TIMEOUT ({}s) EXPIRED ***",
            name,
            format_secs(timeout)
        )
    }

    fn write_not_found(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.err, "Can't find service: {}", name)
    }

    fn write_failure(&mut self, name: &str, reason: &str) -> io::Result<()> {
        writeln!(self.err, "Error dumping service info: ({}) {}", reason, name)
    }
}

/// Whole seconds when exact, fractional otherwise
fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        duration.as_secs_f64().to_string()
    }
}
