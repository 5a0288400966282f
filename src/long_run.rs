//! Long slow distance (LSD) dosing
//!
//! The weekly long run is the smallest of three caps:
//! - 28% of the week's target volume
//! - 150 minutes at easy pace
//! - 1.2x race distance, scaled by phase (Base 0.7, Build 1.0, Taper 0.5)
//!
//! Every 4th week is a recovery week and takes 80% of that value.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{CalculationError, Result};
use crate::models::Phase;

const VOLUME_SHARE: Decimal = dec!(0.28);
const MAX_DURATION_MINUTES: Decimal = dec!(150);
const RACE_DISTANCE_MULTIPLIER: Decimal = dec!(1.2);
const RECOVERY_FACTOR: Decimal = dec!(0.8);
const RECOVERY_CYCLE: u32 = 4;

/// How the 150-minute duration cap converts to kilometers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongRunCapFormula {
    /// `150 / easy_pace` km: minutes divided by minutes-per-km
    #[default]
    Duration,
    /// `easy_pace * 150 / 60`, kept only for compatibility with plans
    /// produced by older releases; the units do not work out to kilometers
    LegacyPaceScaled,
}

/// Individual caps behind one week's long run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRunBreakdown {
    pub percentage_cap: Decimal,
    pub duration_cap: Decimal,
    pub race_limit_cap: Decimal,
    pub phase: Phase,
    pub is_recovery_week: bool,
    /// Final distance, rounded to 0.1 km
    pub lsd_km: Decimal,
}

impl LongRunBreakdown {
    pub fn binding_cap(&self) -> Decimal {
        self.percentage_cap
            .min(self.duration_cap)
            .min(self.race_limit_cap)
    }
}

/// Computes the weekly long run distance
#[derive(Debug, Clone, Copy, Default)]
pub struct LongRunRuleEngine {
    formula: LongRunCapFormula,
}

impl LongRunRuleEngine {
    pub fn new(formula: LongRunCapFormula) -> Self {
        Self { formula }
    }

    pub fn formula(&self) -> LongRunCapFormula {
        self.formula
    }

    /// Long run distance in km, one decimal
    pub fn compute_long_run(
        &self,
        weekly_target_km: Decimal,
        easy_pace_min_per_km: Decimal,
        goal_distance_km: Decimal,
        week_number: u32,
        total_weeks: u32,
    ) -> Result<Decimal> {
        self.breakdown(
            weekly_target_km,
            easy_pace_min_per_km,
            goal_distance_km,
            week_number,
            total_weeks,
        )
        .map(|b| b.lsd_km)
    }

    pub fn breakdown(
        &self,
        weekly_target_km: Decimal,
        easy_pace_min_per_km: Decimal,
        goal_distance_km: Decimal,
        week_number: u32,
        total_weeks: u32,
    ) -> Result<LongRunBreakdown> {
        if easy_pace_min_per_km <= Decimal::ZERO {
            return Err(CalculationError::DivisionByZero {
                calculation: "long run duration cap".to_string(),
            }
            .into());
        }

        let percentage_cap = weekly_target_km
            .checked_mul(VOLUME_SHARE)
            .ok_or_else(|| CalculationError::overflow("long run volume cap"))?;

        let duration_cap = match self.formula {
            LongRunCapFormula::Duration => MAX_DURATION_MINUTES.checked_div(easy_pace_min_per_km),
            LongRunCapFormula::LegacyPaceScaled => easy_pace_min_per_km
                .checked_mul(MAX_DURATION_MINUTES)
                .map(|scaled| scaled / dec!(60)),
        }
        .ok_or_else(|| CalculationError::overflow("long run duration cap"))?;

        let phase = phase_for_week(week_number, total_weeks);
        let race_limit_cap = goal_distance_km
            .checked_mul(RACE_DISTANCE_MULTIPLIER * phase_multiplier(phase))
            .ok_or_else(|| CalculationError::overflow("long run race distance cap"))?;

        let is_recovery_week = is_recovery_week(week_number);
        let progression = if is_recovery_week {
            RECOVERY_FACTOR
        } else {
            dec!(1)
        };

        let capped = percentage_cap.min(duration_cap).min(race_limit_cap);
        let lsd_km = (capped * progression)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

        trace!(
            week = week_number,
            %phase,
            %percentage_cap,
            %duration_cap,
            %race_limit_cap,
            is_recovery_week,
            %lsd_km,
            "Dosed long run"
        );

        Ok(LongRunBreakdown {
            percentage_cap,
            duration_cap,
            race_limit_cap,
            phase,
            is_recovery_week,
            lsd_km,
        })
    }
}

/// Phase by fractional position in the plan: first 40% Base, to 80% Build, then Taper
pub fn phase_for_week(week_number: u32, total_weeks: u32) -> Phase {
    let week = Decimal::from(week_number);
    let total = Decimal::from(total_weeks);
    if week <= total * dec!(0.4) {
        Phase::Base
    } else if week <= total * dec!(0.8) {
        Phase::Build
    } else {
        Phase::Taper
    }
}

pub fn is_recovery_week(week_number: u32) -> bool {
    week_number % RECOVERY_CYCLE == 0
}

fn phase_multiplier(phase: Phase) -> Decimal {
    match phase {
        Phase::Base => dec!(0.7),
        Phase::Build => dec!(1.0),
        Phase::Taper => dec!(0.5),
    }
}
