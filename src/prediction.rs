//! Cross-distance race time prediction (Riegel power law)

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{CalculationError, Result, ValidationError};
use crate::models::{PerformanceRecord, RacePredictions, StandardDistance};

/// Riegel fatigue exponent used unless configured otherwise
pub const DEFAULT_FATIGUE_EXPONENT: Decimal = dec!(1.06);

/// Predicts finish times at other distances from one known performance
#[derive(Debug, Clone, PartialEq)]
pub struct PerformancePredictor {
    fatigue_exponent: Decimal,
}

impl Default for PerformancePredictor {
    fn default() -> Self {
        Self {
            fatigue_exponent: DEFAULT_FATIGUE_EXPONENT,
        }
    }
}

impl PerformancePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom fatigue exponent
    pub fn with_exponent(fatigue_exponent: Decimal) -> std::result::Result<Self, ValidationError> {
        if fatigue_exponent <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                field: "engine.fatigue_exponent".to_string(),
                value: fatigue_exponent.to_string(),
            });
        }
        Ok(Self { fatigue_exponent })
    }

    pub fn fatigue_exponent(&self) -> Decimal {
        self.fatigue_exponent
    }

    /// `known_time * (target_distance / known_distance) ^ exponent`, in seconds
    pub fn predict_time(
        &self,
        known_distance_km: Decimal,
        known_time_seconds: Decimal,
        target_distance_km: Decimal,
    ) -> Result<Decimal> {
        predict_time(
            known_distance_km,
            known_time_seconds,
            target_distance_km,
            self.fatigue_exponent,
        )
    }

    /// Predicted times at 5K, 10K, half and full marathon
    pub fn current_ability(&self, performance: &PerformanceRecord) -> Result<RacePredictions> {
        let known_time = Decimal::from(performance.elapsed_seconds);
        let at = |distance: StandardDistance| {
            self.predict_time(performance.distance_km, known_time, distance.km())
        };

        Ok(RacePredictions {
            five_k: at(StandardDistance::FiveK)?,
            ten_k: at(StandardDistance::TenK)?,
            half_marathon: at(StandardDistance::HalfMarathon)?,
            marathon: at(StandardDistance::Marathon)?,
        })
    }
}

/// Riegel prediction with an explicit fatigue exponent
pub fn predict_time(
    known_distance_km: Decimal,
    known_time_seconds: Decimal,
    target_distance_km: Decimal,
    fatigue_exponent: Decimal,
) -> Result<Decimal> {
    require_positive("known_distance_km", known_distance_km)?;
    require_positive("known_time_seconds", known_time_seconds)?;
    require_positive("target_distance_km", target_distance_km)?;

    if target_distance_km == known_distance_km {
        return Ok(known_time_seconds);
    }

    let ratio = target_distance_km
        .checked_div(known_distance_km)
        .ok_or_else(|| CalculationError::overflow("riegel distance ratio"))?
        .to_f64()
        .ok_or_else(|| non_finite("riegel distance ratio"))?;
    let exponent = fatigue_exponent
        .to_f64()
        .ok_or_else(|| non_finite("riegel fatigue exponent"))?;

    let factor = ratio.powf(exponent);
    if !factor.is_finite() {
        return Err(non_finite("riegel prediction").into());
    }

    let factor = Decimal::from_f64(factor).ok_or_else(|| CalculationError::overflow("riegel prediction"))?;
    known_time_seconds
        .checked_mul(factor)
        .ok_or_else(|| CalculationError::overflow("riegel prediction").into())
}

fn require_positive(field: &str, value: Decimal) -> std::result::Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn non_finite(calculation: &str) -> CalculationError {
    CalculationError::NonFinite {
        calculation: calculation.to_string(),
    }
}
