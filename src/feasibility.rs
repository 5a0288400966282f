//! Goal feasibility evaluation
//!
//! Compares the runner's current capability at the goal distance against the
//! target time and classifies how achievable it is within the prep window:
//!
//! - feasible: required improvement within the prep-week allowance and weekly
//!   volume ceiling at least 3x the race distance
//! - borderline: required improvement within 120% of the allowance
//! - not feasible: anything beyond that, paired with recommended weeks and a
//!   recommended target time (3% under current capability)

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::error::{CalculationError, Result, ValidationError};
use crate::models::{Feasibility, FeasibilityResult, Goal, PerformanceRecord};
use crate::prediction::PerformancePredictor;

/// Weekly volume ceiling must reach this multiple of the race distance
const VOLUME_TO_DISTANCE_RATIO: Decimal = dec!(3);

/// Borderline band above the reasonable improvement allowance
const BORDERLINE_MARGIN: Decimal = dec!(1.2);

/// Share of current capability offered as the fallback target
const RECOMMENDED_TARGET_FACTOR: Decimal = dec!(0.97);

/// Evaluates a goal against a recent performance
#[derive(Debug, Clone, Default)]
pub struct FeasibilityEvaluator {
    predictor: PerformancePredictor,
}

impl FeasibilityEvaluator {
    pub fn new(predictor: PerformancePredictor) -> Self {
        Self { predictor }
    }

    pub fn evaluate(&self, performance: &PerformanceRecord, goal: &Goal) -> Result<FeasibilityResult> {
        let known_time = Decimal::from(performance.elapsed_seconds);
        let predicted =
            self.predictor
                .predict_time(performance.distance_km, known_time, goal.distance_km)?;

        if predicted <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                field: "performance.elapsed_seconds".to_string(),
                value: performance.elapsed_seconds.to_string(),
            }
            .into());
        }

        let (target_time_seconds, target_time_suggested) = match goal.target_time_seconds {
            Some(target) if target > 0 => (target, false),
            _ => (
                round_seconds(predicted * improvement_factor(goal.prep_weeks), "suggested target time")?,
                true,
            ),
        };

        let target = Decimal::from(target_time_seconds);
        let required_improvement_pct = (predicted - target)
            .checked_div(predicted)
            .and_then(|share| share.checked_mul(dec!(100)))
            .ok_or_else(|| CalculationError::overflow("required improvement"))?;
        let max_reasonable_improvement_pct = max_reasonable_improvement(goal.prep_weeks);
        let weekly_volume_adequate = goal
            .distance_km
            .checked_mul(VOLUME_TO_DISTANCE_RATIO)
            .is_some_and(|needed| goal.max_weekly_km >= needed);

        let feasibility = classify(
            required_improvement_pct,
            max_reasonable_improvement_pct,
            weekly_volume_adequate,
        );

        let recommended_weeks = if feasibility == Feasibility::NotFeasible {
            weeks_needed(goal.prep_weeks, required_improvement_pct, max_reasonable_improvement_pct)?
        } else {
            goal.prep_weeks
        };

        let recommended_target_time_seconds =
            round_seconds(predicted * RECOMMENDED_TARGET_FACTOR, "recommended target time")?;

        debug!(
            predicted = %predicted.round_dp(1),
            target = target_time_seconds,
            required_pct = %required_improvement_pct.round_dp(2),
            max_pct = %max_reasonable_improvement_pct,
            weekly_volume_adequate,
            %feasibility,
            "Evaluated goal feasibility"
        );

        Ok(FeasibilityResult {
            feasibility,
            required_improvement_pct,
            max_reasonable_improvement_pct,
            weekly_volume_adequate,
            recommended_weeks,
            recommended_target_time_seconds,
            target_time_seconds,
            target_time_suggested,
            predicted_time_seconds: predicted,
            current_ability: self.predictor.current_ability(performance)?,
        })
    }
}

/// Fraction of current capability suggested as a target when none is given
///
/// Shorter prep windows get a higher factor, i.e. a smaller implied improvement.
pub fn improvement_factor(prep_weeks: u32) -> Decimal {
    if prep_weeks >= 12 {
        dec!(0.95)
    } else if prep_weeks >= 8 {
        dec!(0.97)
    } else {
        dec!(0.98)
    }
}

/// Improvement (percent) considered reachable in the prep window
pub fn max_reasonable_improvement(prep_weeks: u32) -> Decimal {
    if prep_weeks >= 16 {
        dec!(10)
    } else if prep_weeks >= 12 {
        dec!(7)
    } else if prep_weeks >= 8 {
        dec!(5)
    } else {
        dec!(3)
    }
}

/// Ties at a threshold resolve to the more permissive class
pub fn classify(
    required_improvement_pct: Decimal,
    max_reasonable_improvement_pct: Decimal,
    weekly_volume_adequate: bool,
) -> Feasibility {
    if required_improvement_pct <= max_reasonable_improvement_pct && weekly_volume_adequate {
        Feasibility::Feasible
    } else if required_improvement_pct <= max_reasonable_improvement_pct * BORDERLINE_MARGIN {
        Feasibility::Borderline
    } else {
        Feasibility::NotFeasible
    }
}

/// Prep weeks at which the required improvement becomes reasonable
pub fn weeks_needed(
    prep_weeks: u32,
    required_improvement_pct: Decimal,
    max_reasonable_improvement_pct: Decimal,
) -> Result<u32> {
    Decimal::from(prep_weeks)
        .checked_mul(required_improvement_pct)
        .and_then(|scaled| scaled.checked_div(max_reasonable_improvement_pct))
        .and_then(|weeks| weeks.ceil().to_u32())
        .ok_or_else(|| CalculationError::overflow("recommended preparation weeks").into())
}

/// Whole seconds, or an error when the value does not fit a finish time
fn round_seconds(seconds: Decimal, calculation: &str) -> Result<u32> {
    seconds
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .ok_or_else(|| CalculationError::overflow(calculation).into())
}
