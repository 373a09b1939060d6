//! Cumulative amount views: the amount-over-time series and the current
//! net level of the container.
use crate::core::observation::Observation;
use crate::core::rate::sorted_chronologically;
use chrono::NaiveDateTime;

pub const DEFAULT_CAPACITY: f64 = 2000.0;
pub const DEFAULT_MARK_STEP: f64 = 100.0;
pub const MAX_MARKS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountPoint {
    pub timestamp: NaiveDateTime,
    pub amount: f64,
}

/// Cumulative amount per observation in chronological order.
pub fn amount_series(entries: &[Observation]) -> Vec<AmountPoint> {
    sorted_chronologically(entries)
        .into_iter()
        .map(|entry| AmountPoint {
            timestamp: entry.timestamp,
            amount: entry.amount,
        })
        .collect()
}

/// The chronologically latest observation. Among equal timestamps the one
/// inserted last wins.
pub fn latest(entries: &[Observation]) -> Option<&Observation> {
    entries
        .iter()
        .enumerate()
        .max_by_key(|(index, entry)| (entry.timestamp, *index))
        .map(|(_, entry)| entry)
}

/// Net amount of the latest observation with its carryover removed.
/// Not clamped.
pub fn net_amount(entries: &[Observation]) -> Option<f64> {
    latest(entries).map(|entry| entry.amount - entry.carryover)
}

/// Fill level of a single container of fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BagLevel {
    pub raw: f64,
    pub capacity: f64,
}

impl BagLevel {
    pub fn new(raw: f64, capacity: f64) -> Self {
        Self { raw, capacity }
    }

    pub fn from_entries(entries: &[Observation], capacity: f64) -> Option<Self> {
        net_amount(entries).map(|raw| Self::new(raw, capacity))
    }

    /// The level clamped to `[0, capacity]`. NaN stays NaN.
    pub fn displayed(&self) -> f64 {
        self.raw.clamp(0.0, self.capacity.max(0.0))
    }

    pub fn fill_percentage(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        self.displayed() / self.capacity * 100.0
    }

    pub fn is_overflowing(&self) -> bool {
        self.raw > self.capacity
    }
}

/// Graduation marks from zero up to `capacity`, every `step` ml.
///
/// The step is widened to a multiple of itself when more than
/// [`MAX_MARKS`] marks would be needed.
pub fn measurement_marks(capacity: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || !capacity.is_finite() || capacity < 0.0 {
        return Vec::new();
    }
    let mut count = (capacity / step).floor() as usize;
    let mut step = step;
    if count > MAX_MARKS {
        step *= count.div_ceil(MAX_MARKS) as f64;
        count = (capacity / step).floor() as usize;
    }
    (0..=count).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn hour(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    #[test]
    fn test_amount_series_is_chronological() {
        let entries = vec![
            Observation::new(hour(5), 250.0),
            Observation::new(hour(1), 100.0),
        ];
        let series = amount_series(&entries);
        assert_eq!(series[0].timestamp, hour(1));
        assert_eq!(series[1].amount, 250.0);
    }

    #[test]
    fn test_net_amount_subtracts_carryover() {
        let entries = vec![
            Observation::new(hour(0), 200.0),
            Observation::with_carryover(hour(3), 1800.0, 300.0),
        ];
        assert_eq!(net_amount(&entries), Some(1500.0));
        assert_eq!(net_amount(&[]), None);
    }

    #[test]
    fn test_net_amount_uses_chronologically_latest_entry() {
        let entries = vec![
            Observation::with_carryover(hour(9), 900.0, 100.0),
            Observation::with_carryover(hour(2), 300.0, 0.0),
        ];
        assert_eq!(net_amount(&entries), Some(800.0));
    }

    #[test]
    fn test_latest_prefers_last_inserted_on_tie() {
        let entries = vec![
            Observation::new(hour(4), 100.0),
            Observation::new(hour(4), 150.0),
        ];
        assert_eq!(latest(&entries).map(|e| e.amount), Some(150.0));
    }

    #[test]
    fn test_bag_level_clamps_only_for_display() {
        let over = BagLevel::new(2600.0, DEFAULT_CAPACITY);
        assert_eq!(over.raw, 2600.0);
        assert_eq!(over.displayed(), 2000.0);
        assert_eq!(over.fill_percentage(), 100.0);
        assert!(over.is_overflowing());

        let under = BagLevel::new(-50.0, DEFAULT_CAPACITY);
        assert_eq!(under.raw, -50.0);
        assert_eq!(under.displayed(), 0.0);

        let half = BagLevel::new(1000.0, DEFAULT_CAPACITY);
        assert_eq!(half.fill_percentage(), 50.0);
        assert!(!half.is_overflowing());
    }

    #[test]
    fn test_measurement_marks_every_step() {
        let marks = measurement_marks(DEFAULT_CAPACITY, DEFAULT_MARK_STEP);
        assert_eq!(marks.len(), 21);
        assert_eq!(marks.first(), Some(&0.0));
        assert_eq!(marks.last(), Some(&2000.0));

        assert_eq!(measurement_marks(250.0, 100.0), vec![0.0, 100.0, 200.0]);
        assert!(measurement_marks(1000.0, 0.0).is_empty());
    }

    #[test]
    fn test_measurement_marks_widen_step_for_large_capacity() {
        let marks = measurement_marks(1e15, DEFAULT_MARK_STEP);
        assert!(marks.len() <= MAX_MARKS + 1);
        assert!(marks.len() > 1);
        assert!(marks.iter().all(|mark| mark % DEFAULT_MARK_STEP == 0.0));
        assert!(*marks.last().unwrap() <= 1e15);

        // 20000 / 100 = 200 marks -> every 200 ml
        let marks = measurement_marks(20_000.0, DEFAULT_MARK_STEP);
        assert_eq!(marks.len(), 101);
        assert_eq!(marks[1], 200.0);
    }
}
