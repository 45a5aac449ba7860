//! Sequence allocation for human-readable entry and journal numbers.
//!
//! Two numbering schemes exist side by side:
//! - Journal numbers: each `Journal` owns a mutable counter with optional
//!   yearly reset; the counter is persisted with the journal record.
//! - Entry numbers: one counter per (entry kind, year), with fixed per-kind
//!   prefixes (`MAN`, `AUT`, `ADJ`, `OPN`, `CLS`, `REV`).
//!
//! Both reduce to a counter keyed by [`SequenceKey`] behind the store, which
//! guarantees atomic increments (lock or CAS). A number once allocated is
//! consumed even if the surrounding operation later fails, so callers
//! allocate only after all other preconditions pass.

use serde::{Deserialize, Serialize};
use tally_shared::types::JournalId;

use super::types::EntryKind;

/// Scope + period key identifying one sequence counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceKey {
    /// Counter scope, e.g. an entry-kind prefix or a journal code.
    pub scope: String,
    /// Period the counter belongs to; `None` for non-resetting sequences.
    pub year: Option<i32>,
}

impl SequenceKey {
    /// Key for an entry-kind counter in a given year.
    #[must_use]
    pub fn for_kind(kind: EntryKind, year: Option<i32>) -> Self {
        Self {
            scope: kind.sequence_prefix().to_string(),
            year,
        }
    }
}

/// Composes a number string as `{prefix}/{year}/{n}` or `{prefix}/{n}`,
/// zero-padding `n` to `padding` digits.
#[must_use]
pub fn compose_number(prefix: &str, year: Option<i32>, n: i64, padding: u32) -> String {
    let width = padding as usize;
    match year {
        Some(year) => format!("{prefix}/{year}/{n:0width$}"),
        None => format!("{prefix}/{n:0width$}"),
    }
}

/// A journal owning its own number sequence.
///
/// The counter is mutated on every allocation; the store persists it together
/// with the journal record and serializes concurrent allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Unique identifier.
    pub id: JournalId,
    /// Journal code.
    pub code: String,
    /// Prefix used when composing numbers.
    pub prefix: String,
    /// Last allocated sequence number.
    pub current_sequence_number: i64,
    /// Zero-padding width.
    pub padding: u32,
    /// Whether composed numbers include the year segment.
    pub include_year_in_sequence: bool,
    /// Whether the counter resets when the year changes.
    pub reset_sequence_yearly: bool,
    /// Year of the last reset, if any reset has happened.
    pub last_reset_year: Option<i32>,
}

impl Journal {
    /// Allocates the next number from this journal's sequence.
    ///
    /// If the journal resets yearly and `as_of_year` differs from the last
    /// reset year, the counter restarts from zero and the new year is
    /// recorded before incrementing.
    pub fn allocate(&mut self, as_of_year: i32) -> String {
        if self.reset_sequence_yearly && self.last_reset_year != Some(as_of_year) {
            self.current_sequence_number = 0;
            self.last_reset_year = Some(as_of_year);
        }
        self.current_sequence_number += 1;

        let year = self.include_year_in_sequence.then_some(as_of_year);
        compose_number(&self.prefix, year, self.current_sequence_number, self.padding)
    }
}
