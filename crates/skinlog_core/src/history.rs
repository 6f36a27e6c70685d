//! crates/skinlog_core/src/history.rs
//!
//! Derives short-term behavioural signals from the usage log: whether an exfoliant
//! was used on the previous calendar day and whether the Air Shot mode is still
//! cooling down. Calendar days are UTC dates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::{DeviceMode, UsageLogEntry};

/// How long the skin rests after an Air Shot session.
pub const AIR_SHOT_COOLDOWN_DAYS: i64 = 3;

/// Width of the trailing "recent history" window.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Facts derived from the usage log at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAnalysis {
    /// Entries inside the trailing seven-day window, most recent first.
    pub last_7_days: Vec<UsageLogEntry>,
    pub used_exfoliant_yesterday: bool,
    pub air_shot_cooldown: bool,
}

/// Analyzes the log as seen at `now`.
///
/// Ties on timestamp keep the stored log order.
pub fn analyze_history(history: &[UsageLogEntry], now: DateTime<Utc>) -> HistoryAnalysis {
    let mut sorted: Vec<&UsageLogEntry> = history.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let recent_window = Duration::days(RECENT_WINDOW_DAYS);
    let last_7_days = sorted
        .iter()
        .filter(|entry| now - entry.date < recent_window)
        .map(|entry| (*entry).clone())
        .collect();

    let yesterday = now.date_naive().pred_opt();
    let used_exfoliant_yesterday = yesterday.is_some_and(|day| {
        history
            .iter()
            .any(|entry| entry.date.date_naive() == day && entry.category_used.is_exfoliant())
    });

    let air_shot_cooldown = sorted
        .iter()
        .find(|entry| entry.device_mode == DeviceMode::AirShot)
        .is_some_and(|last| now - last.date < Duration::days(AIR_SHOT_COOLDOWN_DAYS));

    HistoryAnalysis {
        last_7_days,
        used_exfoliant_yesterday,
        air_shot_cooldown,
    }
}

/// Number of distinct calendar days that appear in the log.
pub fn unique_days(history: &[UsageLogEntry]) -> usize {
    history
        .iter()
        .map(|entry| entry.date.date_naive())
        .collect::<BTreeSet<NaiveDate>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IngredientCategory;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 21, 0, 0).unwrap()
    }

    fn entry(date: DateTime<Utc>, mode: DeviceMode, category: IngredientCategory) -> UsageLogEntry {
        UsageLogEntry {
            date,
            device_mode: mode,
            category_used: category,
        }
    }

    #[test]
    fn empty_history_yields_no_signals() {
        let analysis = analyze_history(&[], now());
        assert!(analysis.last_7_days.is_empty());
        assert!(!analysis.used_exfoliant_yesterday);
        assert!(!analysis.air_shot_cooldown);
    }

    #[test]
    fn exfoliant_on_previous_calendar_day_is_detected() {
        // 00:30 on the 9th is more than 24h before now, but still "yesterday".
        let early_yesterday = Utc.with_ymd_and_hms(2024, 5, 9, 0, 30, 0).unwrap();
        let history = vec![entry(early_yesterday, DeviceMode::None, IngredientCategory::ClayMask)];
        assert!(analyze_history(&history, now()).used_exfoliant_yesterday);
    }

    #[test]
    fn exfoliant_within_24h_but_today_is_not_yesterday() {
        let earlier_today = Utc.with_ymd_and_hms(2024, 5, 10, 1, 0, 0).unwrap();
        let history = vec![entry(
            earlier_today,
            DeviceMode::None,
            IngredientCategory::AcidExfoliant,
        )];
        assert!(!analyze_history(&history, now()).used_exfoliant_yesterday);
    }

    #[test]
    fn non_exfoliant_yesterday_does_not_count() {
        let yesterday = Utc.with_ymd_and_hms(2024, 5, 9, 22, 0, 0).unwrap();
        let history = vec![
            entry(yesterday, DeviceMode::None, IngredientCategory::Retinoid),
            entry(yesterday, DeviceMode::Booster, IngredientCategory::SerumWater),
        ];
        assert!(!analyze_history(&history, now()).used_exfoliant_yesterday);
    }

    #[test]
    fn two_days_ago_exfoliant_does_not_count() {
        let two_days = Utc.with_ymd_and_hms(2024, 5, 8, 23, 59, 0).unwrap();
        let history = vec![entry(two_days, DeviceMode::None, IngredientCategory::AcidExfoliant)];
        assert!(!analyze_history(&history, now()).used_exfoliant_yesterday);
    }

    #[test]
    fn air_shot_cooldown_boundary_is_exclusive() {
        let just_inside = now() - Duration::days(3) + Duration::seconds(1);
        let exactly = now() - Duration::days(3);
        let beyond = now() - Duration::days(4);

        let air_shot_at =
            |date| vec![entry(date, DeviceMode::AirShot, IngredientCategory::AcidExfoliant)];
        let inside = air_shot_at(just_inside);
        let at = air_shot_at(exactly);
        let past = air_shot_at(beyond);

        assert!(analyze_history(&inside, now()).air_shot_cooldown);
        assert!(!analyze_history(&at, now()).air_shot_cooldown);
        assert!(!analyze_history(&past, now()).air_shot_cooldown);
    }

    #[test]
    fn cooldown_uses_most_recent_air_shot_regardless_of_log_order() {
        let old = now() - Duration::days(10);
        let recent = now() - Duration::hours(30);
        // Log order is not chronological order.
        let history = vec![
            entry(recent, DeviceMode::AirShot, IngredientCategory::AcidExfoliant),
            entry(old, DeviceMode::AirShot, IngredientCategory::AcidExfoliant),
        ];
        assert!(analyze_history(&history, now()).air_shot_cooldown);
    }

    #[test]
    fn last_7_days_is_sorted_descending_and_windowed() {
        let a = now() - Duration::days(1);
        let b = now() - Duration::days(6);
        let c = now() - Duration::days(8);
        let history = vec![
            entry(b, DeviceMode::None, IngredientCategory::Cleanser),
            entry(c, DeviceMode::None, IngredientCategory::Cleanser),
            entry(a, DeviceMode::None, IngredientCategory::Moisturizer),
        ];
        let analysis = analyze_history(&history, now());
        let dates: Vec<_> = analysis.last_7_days.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![a, b]);
    }

    #[test]
    fn equal_timestamps_keep_log_order() {
        let t = now() - Duration::hours(2);
        let history = vec![
            entry(t, DeviceMode::None, IngredientCategory::Cleanser),
            entry(t, DeviceMode::None, IngredientCategory::Moisturizer),
        ];
        let analysis = analyze_history(&history, now());
        assert_eq!(analysis.last_7_days[0].category_used, IngredientCategory::Cleanser);
        assert_eq!(analysis.last_7_days[1].category_used, IngredientCategory::Moisturizer);
    }

    #[test]
    fn unique_days_counts_calendar_dates() {
        let cleanse_at = |day, hour| {
            let date = Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap();
            entry(date, DeviceMode::None, IngredientCategory::Cleanser)
        };
        let history = vec![cleanse_at(1, 8), cleanse_at(1, 22), cleanse_at(3, 22)];
        assert_eq!(unique_days(&history), 2);
        assert_eq!(unique_days(&[]), 0);
    }
}
