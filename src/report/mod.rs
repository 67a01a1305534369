//! Progress events emitted while a tree is materialized.

mod console;

use std::path::{Path, PathBuf};

pub use console::ConsoleReporter;

use crate::tree::{EntryCreationError, EntryKind};

/// Outcome of one attempted entry.
#[derive(Debug)]
pub struct EntryEvent {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub result: Result<(), EntryCreationError>,
}

/// Counts collected over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub directories: usize,
    pub files: usize,
    pub failures: usize,
    /// Failures caused by an ancestor directory that was not created.
    pub skipped: usize,
}

impl Summary {
    pub fn record(&mut self, event: &EntryEvent) {
        match (&event.result, event.kind) {
            (Ok(()), EntryKind::Directory) => self.directories += 1,
            (Ok(()), EntryKind::File) => self.files += 1,
            (Err(error), _) => {
                self.failures += 1;
                if error.is_skipped_descendant() {
                    self.skipped += 1;
                }
            }
        }
    }
}

pub trait Reporter {
    fn start(&mut self, base: &Path);
    fn entry(&mut self, event: &EntryEvent);
    fn finish(&mut self, summary: &Summary);
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEntry {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub ok: bool,
}

/// Keeps every event in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub started: Option<PathBuf>,
    pub events: Vec<RecordedEntry>,
    pub finished: Option<Summary>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.events.iter().map(|event| event.path.clone()).collect()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn start(&mut self, base: &Path) {
        self.started = Some(base.to_path_buf());
    }

    fn entry(&mut self, event: &EntryEvent) {
        self.events.push(RecordedEntry {
            kind: event.kind,
            path: event.path.clone(),
            ok: event.result.is_ok(),
        });
    }

    fn finish(&mut self, summary: &Summary) {
        self.finished = Some(*summary);
    }
}
