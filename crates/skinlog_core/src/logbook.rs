//! crates/skinlog_core/src/logbook.rs
//!
//! Turns a completed routine into usage log entries. This is the only way the
//! history collection grows.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{RoutineStep, UsageLogEntry};
use crate::ports::{PortResult, StorageService};

/// One entry per step, all stamped with the same instant.
pub fn entries_for_routine(steps: &[RoutineStep], now: DateTime<Utc>) -> Vec<UsageLogEntry> {
    steps
        .iter()
        .map(|step| UsageLogEntry {
            date: now,
            device_mode: step.device_mode,
            category_used: step.product.category,
        })
        .collect()
}

/// Appends the routine to the usage log as a single batch and returns what was written.
pub async fn log_routine(
    storage: &dyn StorageService,
    steps: &[RoutineStep],
    now: DateTime<Utc>,
) -> PortResult<Vec<UsageLogEntry>> {
    let entries = entries_for_routine(steps, now);
    if entries.is_empty() {
        return Ok(entries);
    }
    storage.append_history(&entries).await?;
    info!(count = entries.len(), "Routine logged to history");
    Ok(entries)
}
