use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};

use crate::history::HistoryEntry;
use crate::timestamp::resolve_entry_time;

/// Pruning window selector for the download history
///
/// Each period names the downloads that get REMOVED: `Today` clears what
/// was downloaded today, `Week` everything from the last 7 days, `Month`
/// everything from the last 30 days, `All` the whole history. Entries
/// older than the window survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPeriod {
    Today,
    Week,
    Month,
    All,
}

impl FromStr for RetentionPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown retention period {:?}, expected today|week|month|all",
                other
            )),
        }
    }
}

impl fmt::Display for RetentionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        };
        write!(f, "{}", name)
    }
}

/// Prune a history by retention period, returning the surviving entries
///
/// Pure: performs no I/O, persisting the result is the caller's job.
/// Idempotent for a fixed `now`. Entries whose timestamp cannot be
/// resolved are always kept; data we cannot classify is never destroyed.
pub fn prune(
    history: &[HistoryEntry],
    period: RetentionPeriod,
    now: NaiveDateTime,
) -> Vec<HistoryEntry> {
    history
        .iter()
        .filter(|entry| is_kept(entry, period, now))
        .cloned()
        .collect()
}

fn is_kept(entry: &HistoryEntry, period: RetentionPeriod, now: NaiveDateTime) -> bool {
    // All wipes unconditionally, before any timestamp inspection
    if period == RetentionPeriod::All {
        return false;
    }

    let entry_time = match resolve_entry_time(entry) {
        Ok(time) => time,
        // Unclassifiable entries survive every non-All prune
        Err(_) => return true,
    };

    match period {
        RetentionPeriod::Today => entry_time.date() != now.date(),
        RetentionPeriod::Week => now - entry_time > Duration::days(7),
        RetentionPeriod::Month => now - entry_time > Duration::days(30),
        RetentionPeriod::All => unreachable!(),
    }
}
