use serde::Serialize;
use std::fmt;

/// Why a feed entry did not make it into the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BadDate,
    MissingField(&'static str),
    NoIdentifier,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BadDate => write!(f, "unparsable publish date"),
            SkipReason::MissingField(field) => write!(f, "missing {}", field),
            SkipReason::NoIdentifier => write!(f, "no identifier in link or guid"),
        }
    }
}

/// What happened to a single feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Added,
    Duplicate,
    Stale,
    Skipped(SkipReason),
}

/// Counts for one feed page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub entries: usize,
    pub added: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub skipped: usize,
}

impl BatchStats {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        self.entries += 1;
        match outcome {
            EntryOutcome::Added => self.added += 1,
            EntryOutcome::Duplicate => self.duplicates += 1,
            EntryOutcome::Stale => self.stale += 1,
            EntryOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Counts for a whole pagination run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub pages: usize,
    pub entries: usize,
    pub added: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub skipped: usize,
}

impl RunStats {
    pub fn absorb(&mut self, batch: &BatchStats) {
        self.pages += 1;
        self.entries += batch.entries;
        self.added += batch.added;
        self.duplicates += batch.duplicates;
        self.stale += batch.stale;
        self.skipped += batch.skipped;
    }
}

/// Why pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The feed returned a page with no entries.
    Exhausted,
    /// A non-empty page contributed nothing new.
    CutoffReached,
    /// The page held fewer entries than requested.
    ShortPage,
    /// The offset ceiling was passed.
    SafetyLimit,
    /// A page could not be fetched or parsed.
    FetchFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Exhausted => "feed exhausted",
            StopReason::CutoffReached => "cutoff reached",
            StopReason::ShortPage => "short page",
            StopReason::SafetyLimit => "offset safety limit",
            StopReason::FetchFailed => "fetch failed",
        };
        f.write_str(text)
    }
}
