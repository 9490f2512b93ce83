//! Per-record outcomes, the reporter seam and the run tally

use std::fmt;
use std::io::{self, Stderr, Stdout, Write};

use chrono::{DateTime, Utc};

use crate::enums::Direction;
use crate::error::CipherError;

/// Why a record was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyEncrypted,
    NotEncrypted,
    AlreadyCurrentKey,
}

impl SkipReason {
    pub fn message(self) -> &'static str {
        match self {
            SkipReason::AlreadyEncrypted => "already encrypted, skipped.",
            SkipReason::NotEncrypted => "not encrypted, skipped.",
            SkipReason::AlreadyCurrentKey => "already encrypted with current key, skipped.",
        }
    }
}

/// Final state of one fetched identity
#[derive(Debug)]
pub enum Outcome {
    Skipped { id: i64, reason: SkipReason },
    Transformed { id: i64, direction: Direction },
    Failed { id: i64, error: CipherError },
}

impl Outcome {
    pub fn id(&self) -> i64 {
        match self {
            Outcome::Skipped { id, .. }
            | Outcome::Transformed { id, .. }
            | Outcome::Failed { id, .. } => *id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Skipped { id, reason } => write!(f, "id: {id}, {}", reason.message()),
            Outcome::Transformed { id, direction } => {
                write!(f, "id: {id}, {}.", direction.past_tense())
            }
            Outcome::Failed { id, error } => write!(f, "id: {id}, {error}"),
        }
    }
}

/// Receives every outcome, in processing order
pub trait Reporter {
    fn report(&mut self, outcome: &Outcome);
}

impl<F: FnMut(&Outcome)> Reporter for F {
    fn report(&mut self, outcome: &Outcome) {
        self(outcome)
    }
}

/// Operator output: success and skip lines on one stream, failures on another
pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsoleReporter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn report(&mut self, outcome: &Outcome) {
        // A closed pipe must not abort the migration itself
        let _ = if outcome.is_failure() {
            writeln!(self.err, "{outcome}")
        } else {
            writeln!(self.out, "{outcome}")
        };
    }
}

/// Tally of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub direction: Direction,
    pub pages: u64,
    pub transformed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn start(direction: Direction) -> Self {
        Self {
            direction,
            pages: 0,
            transformed: 0,
            skipped: 0,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Transformed { .. } => self.transformed += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> u64 {
        self.transformed + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}, {} skipped, {} failed ({} record(s) in {} page(s)",
            self.direction,
            self.transformed,
            self.direction.past_tense(),
            self.skipped,
            self.failed,
            self.total(),
            self.pages,
        )?;
        if let Some(ms) = self.elapsed_ms() {
            write!(f, ", {ms} ms")?;
        }
        f.write_str(")")
    }
}
