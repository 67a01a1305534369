use std::io::{self, Stdout, Write};
use std::path::Path;

use colored::{ColoredString, Colorize};
use tracing::warn;

use crate::ext::BestEffortPathExt;
use crate::report::{EntryEvent, Reporter, Summary};
use crate::tree::EntryKind;

/// Writes one status-tagged line per event.
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("Failed to write progress line: {e}");
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn start(&mut self, base: &Path) {
        let line = format!(
            "🚀 Starting generation in: {}\n",
            self.paint(&base.best_effort_path_display(), |s| s.bold())
        );
        self.emit(&line);
    }

    fn entry(&mut self, event: &EntryEvent) {
        let line = match (&event.result, event.kind) {
            (Ok(()), EntryKind::Directory) => format!(
                "📁 {}  {}",
                self.paint("Created Dir:", |s| s.blue()),
                event.path.display()
            ),
            (Ok(()), EntryKind::File) => format!(
                "📄 {} {}",
                self.paint("Created File:", |s| s.green()),
                event.path.display()
            ),
            (Err(error), _) => format!("❌ {}", self.paint(&error.to_string(), |s| s.red())),
        };
        self.emit(&line);
    }

    fn finish(&mut self, summary: &Summary) {
        let counts = format!(
            "({} directories, {} files, {} failed)",
            summary.directories, summary.files, summary.failures
        );
        let line = format!(
            "\n✨ Structure generation complete. {}",
            self.paint(&counts, |s| s.dimmed())
        );
        self.emit(&line);
    }
}
