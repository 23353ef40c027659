//! The FSRS forgetting-curve model and the value/weight metric family
//! built on top of it. Pure functions of a card's memory state and the
//! evaluation time; statistics passes call these on every refresh so the
//! display reflects decay without a new fetch.

use crate::errors::RetmapError;
use crate::options::{ValueMetric, WeightMetric};
use crate::tree::CardRecord;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Retrievability of a card at `now` (Unix seconds), in [0, 1].
///
/// `stability == 0` is a defined 0 (a card never successfully reviewed),
/// not an error. A non-finite result (malformed `decay` is the usual
/// culprit) is surfaced as an error, never coerced.
pub fn retention(card: &CardRecord, now: f64) -> Result<f64, RetmapError> {
    if card.stability == 0.0 {
        return Ok(0.0);
    }
    let factor = 0.9_f64.powf(1.0 / -card.decay) - 1.0;
    let elapsed_days = elapsed_days(card, now);
    let value = (elapsed_days / card.stability * factor + 1.0).powf(-card.decay);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RetmapError::NonFiniteStatistic {
            stability: card.stability,
            decay: card.decay,
            elapsed_days,
        })
    }
}

/// Days since the last review, clamped at zero for clock skew.
pub fn elapsed_days(card: &CardRecord, now: f64) -> f64 {
    ((now - card.last_review) / SECONDS_PER_DAY).max(0.0)
}

/// Evaluate the selected value metric for one card.
pub fn card_value(metric: ValueMetric, card: &CardRecord, now: f64) -> Result<f64, RetmapError> {
    match metric {
        ValueMetric::Retention => retention(card, now),
        ValueMetric::StabilityRemaining => Ok(card.stability - elapsed_days(card, now)),
        ValueMetric::StabilityDays => Ok(card.stability),
    }
}

/// Evaluate the selected weight metric for one card.
pub fn card_weight(metric: WeightMetric, card: &CardRecord) -> f64 {
    match metric {
        WeightMetric::Count => 1.0,
        WeightMetric::Difficulty => card.difficulty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(stability: f64, decay: f64, last_review: f64) -> CardRecord {
        CardRecord {
            cid: None,
            front: String::new(),
            back: String::new(),
            stability,
            difficulty: 5.0,
            decay,
            last_review,
            paused: false,
        }
    }

    #[test]
    fn zero_stability_is_defined_zero() {
        let c = card(0.0, 0.5, 0.0);
        assert_eq!(retention(&c, 1e9).unwrap(), 0.0);
        assert_eq!(retention(&c, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn retention_is_one_at_review_time() {
        let c = card(10.0, 0.5, 1_700_000_000.0);
        let r = retention(&c, 1_700_000_000.0).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn retention_decays_monotonically() {
        let c = card(10.0, 0.5, 1_700_000_000.0);
        let mut prev = 1.0;
        for days in 1..60 {
            let now = 1_700_000_000.0 + days as f64 * 86_400.0;
            let r = retention(&c, now).unwrap();
            assert!(r < prev, "retention must strictly decrease (day {days})");
            assert!(r > 0.0 && r < 1.0);
            prev = r;
        }
    }

    #[test]
    fn future_review_time_clamps_elapsed_to_zero() {
        let c = card(10.0, 0.5, 1_700_000_000.0);
        let r = retention(&c, 1_600_000_000.0).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_decay_is_an_error_not_a_nan() {
        let c = card(10.0, 0.0, 0.0);
        match retention(&c, 86_400.0) {
            Err(RetmapError::NonFiniteStatistic { decay, .. }) => assert_eq!(decay, 0.0),
            other => panic!("expected NonFiniteStatistic, got {other:?}"),
        }
    }

    #[test]
    fn stability_remaining_counts_down_in_days() {
        let c = card(10.0, 0.5, 1_700_000_000.0);
        let now = 1_700_000_000.0 + 3.0 * 86_400.0;
        let v = card_value(ValueMetric::StabilityRemaining, &c, now).unwrap();
        assert!((v - 7.0).abs() < 1e-9);
        let v0 = card_value(ValueMetric::StabilityDays, &c, now).unwrap();
        assert_eq!(v0, 10.0);
    }

    #[test]
    fn weight_metric_selects_count_or_difficulty() {
        let c = card(10.0, 0.5, 0.0);
        assert_eq!(card_weight(WeightMetric::Count, &c), 1.0);
        assert_eq!(card_weight(WeightMetric::Difficulty, &c), 5.0);
    }
}
