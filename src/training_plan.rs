use chrono::{Duration, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::error::{CalculationError, Result, ValidationError};
use crate::long_run::{is_recovery_week, LongRunRuleEngine};
use crate::models::{
    format_pace, DayWorkout, Goal, HeartRateZones, PerformanceRecord, Phase, WeekPlan, WorkoutType,
};
use crate::zones::ZoneCalculator;

/// Volume every non-taper ramp starts from
const RAMP_START_KM: Decimal = dec!(20);
const TAPER_VOLUME_SHARE: Decimal = dec!(0.6);

const TEMPO_BUILD_KM: Decimal = dec!(8);
const TEMPO_KM: Decimal = dec!(6);
const INTERVAL_KM: Decimal = dec!(6);
const INTERVAL_MINUTES: u32 = 45;
const EASY_KM: Decimal = dec!(6);
const EASY_TAPER_KM: Decimal = dec!(5);

const LSD_DAY: Weekday = Weekday::Sun;
const TEMPO_DAY: Weekday = Weekday::Wed;
const INTERVAL_DAY: Weekday = Weekday::Fri;

/// Easy days take the first free day in this order
const EASY_ROTATION: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Thu,
    Weekday::Sat,
    Weekday::Wed,
    Weekday::Fri,
];

/// Training paces derived from the goal pace, in min/km
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingPaces {
    pub target: Decimal,
    pub easy: Decimal,
    pub tempo: Decimal,
    pub interval: Decimal,
}

impl TrainingPaces {
    pub fn from_target(target_time_seconds: u32, goal_distance_km: Decimal) -> Result<Self> {
        if goal_distance_km <= Decimal::ZERO {
            return Err(CalculationError::DivisionByZero {
                calculation: "target pace".to_string(),
            }
            .into());
        }

        if target_time_seconds == 0 {
            return Err(CalculationError::DivisionByZero {
                calculation: "training paces".to_string(),
            }
            .into());
        }

        let target = (Decimal::from(target_time_seconds) / dec!(60))
            .checked_div(goal_distance_km)
            .ok_or_else(|| CalculationError::overflow("target pace"))?;
        let scaled = |factor: Decimal| {
            target
                .checked_mul(factor)
                .ok_or_else(|| CalculationError::overflow("training paces"))
        };

        Ok(Self {
            target,
            easy: scaled(dec!(1.25))?,
            tempo: scaled(dec!(1.10))?,
            interval: scaled(dec!(0.95))?,
        })
    }
}

/// Week counts per phase: 40% Base, 40% Build (both floored), remainder Taper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSplit {
    pub base_weeks: u32,
    pub build_weeks: u32,
    pub taper_weeks: u32,
}

impl PhaseSplit {
    pub fn new(prep_weeks: u32) -> Self {
        let base_weeks = prep_weeks * 2 / 5;
        let build_weeks = prep_weeks * 2 / 5;
        Self {
            base_weeks,
            build_weeks,
            taper_weeks: prep_weeks - base_weeks - build_weeks,
        }
    }

    pub fn phase_of(&self, week: u32) -> Phase {
        if week <= self.base_weeks {
            Phase::Base
        } else if week <= self.base_weeks + self.build_weeks {
            Phase::Build
        } else {
            Phase::Taper
        }
    }

    /// Second half of Build switches intervals from 1000m to 800m repeats
    fn is_late_build(&self, week: u32) -> bool {
        Decimal::from(week) > Decimal::from(self.base_weeks) + Decimal::from(self.build_weeks) / dec!(2)
    }
}

/// Builds the week-by-week, day-by-day plan
#[derive(Debug, Clone, Default)]
pub struct PeriodizedPlanGenerator {
    long_run: LongRunRuleEngine,
}

impl PeriodizedPlanGenerator {
    pub fn new(long_run: LongRunRuleEngine) -> Self {
        Self { long_run }
    }

    /// Generate exactly `goal.prep_weeks` weeks
    pub fn generate_plan(
        &self,
        performance: &PerformanceRecord,
        goal: &Goal,
        target_time_seconds: u32,
        zones: Option<&HeartRateZones>,
    ) -> Result<Vec<WeekPlan>> {
        let paces = TrainingPaces::from_target(target_time_seconds, goal.distance_km)?;
        let split = PhaseSplit::new(goal.prep_weeks);

        debug!(
            baseline_km = %performance.distance_km,
            baseline_seconds = performance.elapsed_seconds,
            target_pace = %paces.target.round_dp(2),
            base = split.base_weeks,
            build = split.build_weeks,
            taper = split.taper_weeks,
            "Generating periodized plan"
        );

        let plan_start = goal
            .race_date
            .map(|race| shift_date(race, -Duration::weeks(goal.prep_weeks as i64), goal))
            .transpose()?;

        (1..=goal.prep_weeks)
            .map(|week| -> Result<WeekPlan> {
                let mut plan = self.create_week(week, &split, &paces, goal, zones)?;
                if let Some(start) = plan_start {
                    let week_start = shift_date(start, Duration::weeks(week as i64 - 1), goal)?;
                    plan.start_date = Some(week_start);
                    plan.end_date = Some(shift_date(week_start, Duration::days(6), goal)?);
                }
                Ok(plan)
            })
            .collect()
    }

    /// Ramp target for a week: taper holds at 60% of the ceiling, other weeks
    /// climb linearly from 20 km toward the ceiling
    pub fn weekly_volume(week: u32, phase: Phase, prep_weeks: u32, max_weekly_km: Decimal) -> Decimal {
        if phase == Phase::Taper {
            return max_weekly_km * TAPER_VOLUME_SHARE;
        }
        let progress = Decimal::from(week) / Decimal::from(prep_weeks.max(1));
        let ramp = RAMP_START_KM + progress * (max_weekly_km - RAMP_START_KM);
        ramp.min(max_weekly_km)
    }

    fn create_week(
        &self,
        week: u32,
        split: &PhaseSplit,
        paces: &TrainingPaces,
        goal: &Goal,
        zones: Option<&HeartRateZones>,
    ) -> Result<WeekPlan> {
        let phase = split.phase_of(week);
        let volume_target_km = Self::weekly_volume(week, phase, goal.prep_weeks, goal.max_weekly_km);
        let lsd_km = self.long_run.compute_long_run(
            volume_target_km,
            paces.easy,
            goal.distance_km,
            week,
            goal.prep_weeks,
        )?;

        let days_per_week = goal.days_per_week as usize;
        let mut days = Vec::with_capacity(days_per_week);

        days.push(Self::workout(
            LSD_DAY,
            WorkoutType::Lsd,
            lsd_km,
            paces.easy,
            None,
            zones,
            format!("Long slow distance {} km at {} min/km", lsd_km, format_pace(paces.easy)),
        )?);

        if goal.days_per_week >= 4 && phase != Phase::Taper {
            let tempo_km = if phase == Phase::Build { TEMPO_BUILD_KM } else { TEMPO_KM };
            days.push(Self::workout(
                TEMPO_DAY,
                WorkoutType::Tempo,
                tempo_km,
                paces.tempo,
                None,
                zones,
                format!("Tempo run {} km at {} min/km", tempo_km, format_pace(paces.tempo)),
            )?);
        }

        if goal.days_per_week >= 5 && phase == Phase::Build {
            let sets = if split.is_late_build(week) { "6×800m" } else { "5×1000m" };
            days.push(Self::workout(
                INTERVAL_DAY,
                WorkoutType::Interval,
                INTERVAL_KM,
                paces.interval,
                Some(INTERVAL_MINUTES),
                zones,
                format!(
                    "Intervals {} at {} min/km with 400m jog recoveries",
                    sets,
                    format_pace(paces.interval)
                ),
            )?);
        }

        let easy_km = if phase == Phase::Taper { EASY_TAPER_KM } else { EASY_KM };
        while days.len() < days_per_week {
            let Some(day) = EASY_ROTATION
                .iter()
                .copied()
                .find(|d| days.iter().all(|w| w.day != *d))
            else {
                break;
            };
            days.push(Self::workout(
                day,
                WorkoutType::Easy,
                easy_km,
                paces.easy,
                None,
                zones,
                format!("Easy run {} km at {} min/km", easy_km, format_pace(paces.easy)),
            )?);
        }

        let total_km: Decimal = days.iter().map(|d| d.distance_km).sum();
        let lsd_percentage = if total_km > Decimal::ZERO {
            (lsd_km / total_km * dec!(100)).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };

        debug!(week, %phase, %volume_target_km, %total_km, %lsd_km, days = days.len(), "Composed week");

        Ok(WeekPlan {
            week,
            phase,
            total_km,
            volume_target_km: volume_target_km.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
            lsd_km,
            lsd_percentage,
            is_recovery_week: is_recovery_week(week),
            start_date: None,
            end_date: None,
            days,
        })
    }

    fn workout(
        day: Weekday,
        workout_type: WorkoutType,
        distance_km: Decimal,
        pace: Decimal,
        fixed_minutes: Option<u32>,
        zones: Option<&HeartRateZones>,
        description: String,
    ) -> Result<DayWorkout> {
        let duration_minutes = match fixed_minutes {
            Some(minutes) => minutes,
            None => distance_km
                .checked_mul(pace)
                .and_then(|minutes| {
                    minutes
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                        .to_u32()
                })
                .ok_or_else(|| CalculationError::overflow("workout duration"))?,
        };

        Ok(DayWorkout {
            day,
            workout_type,
            distance_km,
            pace_min_per_km: pace.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            duration_minutes,
            heart_rate_zone: ZoneCalculator::target_for(workout_type, zones),
            description,
        })
    }
}

/// Calendar arithmetic that reports dates outside chrono's range against the race date
fn shift_date(date: NaiveDate, by: Duration, goal: &Goal) -> std::result::Result<NaiveDate, ValidationError> {
    date.checked_add_signed(by).ok_or_else(|| ValidationError::Malformed {
        field: "goal.race_date".to_string(),
        value: goal.race_date.map(|d| d.to_string()).unwrap_or_default(),
        expected: format!("a date leaving room for {} preparation weeks", goal.prep_weeks),
    })
}
