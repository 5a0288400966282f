//! One-call plan generation
//!
//! `TrainingPlanner::generate` validates the typed inputs, then runs zones,
//! feasibility, periodization and fueling in that order and returns a single
//! immutable `PlanResult`. The planner holds configuration only, so the same
//! instance can be shared across threads.

use tracing::{debug, info_span};

use crate::config::EngineSettings;
use crate::error::Result;
use crate::feasibility::FeasibilityEvaluator;
use crate::long_run::LongRunRuleEngine;
use crate::models::{Goal, PerformanceRecord, PlanResult, RunnerProfile};
use crate::nutrition::NutritionStrategyAdvisor;
use crate::prediction::PerformancePredictor;
use crate::training_plan::PeriodizedPlanGenerator;
use crate::validation::PlanInputs;
use crate::zones::{ZoneCalculator, ZoneMode};

#[derive(Debug, Clone, Default)]
pub struct TrainingPlanner {
    zone_mode: ZoneMode,
    evaluator: FeasibilityEvaluator,
    generator: PeriodizedPlanGenerator,
}

impl TrainingPlanner {
    pub fn new(settings: &EngineSettings) -> Result<Self> {
        settings.validate()?;
        let predictor = PerformancePredictor::with_exponent(settings.fatigue_exponent)?;

        Ok(Self {
            zone_mode: settings.zone_mode.clone(),
            evaluator: FeasibilityEvaluator::new(predictor),
            generator: PeriodizedPlanGenerator::new(LongRunRuleEngine::new(settings.long_run_cap)),
        })
    }

    pub fn generate(
        &self,
        profile: &RunnerProfile,
        performance: &PerformanceRecord,
        goal: &Goal,
    ) -> Result<PlanResult> {
        let span = info_span!(
            "generate",
            goal_km = %goal.distance_km,
            prep_weeks = goal.prep_weeks,
            days_per_week = goal.days_per_week
        );
        let _enter = span.enter();

        profile.validate()?;
        performance.validate()?;
        goal.validate()?;

        let zones = ZoneCalculator::compute_zones(profile.hr_max, profile.hr_rest, &self.zone_mode)?;
        let performance_zone = zones
            .as_ref()
            .zip(performance.average_heart_rate)
            .map(|(zones, hr)| ZoneCalculator::zone_for(hr, zones));
        let feasibility = self.evaluator.evaluate(performance, goal)?;
        let plan = self.generator.generate_plan(
            performance,
            goal,
            feasibility.target_time_seconds,
            zones.as_ref(),
        )?;
        // Fueling is sized for the race the runner is aiming at
        let fuel = NutritionStrategyAdvisor::advise(feasibility.target_time_seconds);

        debug!(
            feasibility = %feasibility.feasibility,
            weeks = plan.len(),
            gels = fuel.gel_count,
            "Generated plan"
        );

        Ok(PlanResult {
            feasibility,
            zones,
            performance_zone,
            plan,
            fuel,
        })
    }

    pub fn generate_from(&self, inputs: &PlanInputs) -> Result<PlanResult> {
        self.generate(&inputs.profile, &inputs.performance, &inputs.goal)
    }
}

/// Generate with default engine settings
pub fn generate(profile: &RunnerProfile, performance: &PerformanceRecord, goal: &Goal) -> Result<PlanResult> {
    TrainingPlanner::default().generate(profile, performance, goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlannerError, ValidationError};
    use crate::long_run::LongRunCapFormula;
    use crate::models::{Feasibility, ZoneBoundaryConfig};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn profile() -> RunnerProfile {
        RunnerProfile {
            hr_max: Some(190),
            hr_rest: Some(60),
            ..Default::default()
        }
    }

    fn goal() -> Goal {
        Goal {
            distance_km: dec!(10),
            target_time_seconds: None,
            prep_weeks: 12,
            days_per_week: 4,
            max_weekly_km: dec!(40),
            race_date: None,
        }
    }

    #[test]
    fn test_generate_end_to_end() {
        let result = generate(&profile(), &PerformanceRecord::new(dec!(5), 1500), &goal()).unwrap();

        assert_eq!(result.feasibility.feasibility, Feasibility::Feasible);
        assert_eq!(result.feasibility.target_time_seconds, 2971);
        assert_eq!(result.plan.len(), 12);

        let zones = result.zones.unwrap();
        assert_eq!(zones.zone(1).min, 125);
        assert_eq!(zones.zone(1).max, 138);

        // 2971 s is just under 50 minutes
        assert_eq!(result.fuel.water_serving_count, 1);
        assert_eq!(result.fuel.gel_count, 0);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let performance = PerformanceRecord::new(dec!(5), 1500);
        let first = generate(&profile(), &performance, &goal()).unwrap();
        let second = generate(&profile(), &performance, &goal()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_without_heart_rates() {
        let result = generate(
            &RunnerProfile::default(),
            &PerformanceRecord::new(dec!(5), 1500),
            &goal(),
        )
        .unwrap();
        assert!(result.zones.is_none());
        assert_eq!(result.performance_zone, None);
        assert_eq!(result.plan[0].days[0].heart_rate_zone.label(), "Zone 2");
    }

    #[test]
    fn test_performance_zone_from_average_heart_rate() {
        let performance = PerformanceRecord {
            average_heart_rate: Some(170),
            ..PerformanceRecord::new(dec!(5), 1500)
        };
        let result = generate(&profile(), &performance, &goal()).unwrap();
        // Zone 4 spans 164-177 for 190/60
        assert_eq!(result.performance_zone, Some(4));

        let result = generate(&profile(), &PerformanceRecord::new(dec!(5), 1500), &goal()).unwrap();
        assert_eq!(result.performance_zone, None);
    }

    #[test]
    fn test_oversized_prep_window_rejected_before_planning() {
        let long_goal = Goal {
            prep_weeks: 20_000_000,
            race_date: chrono::NaiveDate::from_ymd_opt(2026, 5, 31),
            ..goal()
        };
        let err = generate(&profile(), &PerformanceRecord::new(dec!(5), 1500), &long_goal).unwrap_err();
        match err {
            PlannerError::Validation(e) => assert_eq!(e.field(), "goal.prep_weeks"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_distance_rejected_before_planning() {
        let far_goal = Goal {
            distance_km: Decimal::from_i128_with_scale(10i128.pow(20), 0),
            ..goal()
        };
        let err = generate(
            &profile(),
            &PerformanceRecord::new(dec!(0.00001), 3600),
            &far_goal,
        )
        .unwrap_err();
        assert!(matches!(err, PlannerError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_validation_before_computation() {
        let mut bad_goal = goal();
        bad_goal.distance_km = dec!(0);
        let err = generate(&profile(), &PerformanceRecord::new(dec!(5), 1500), &bad_goal).unwrap_err();
        match err {
            PlannerError::Validation(e) => assert_eq!(e.field(), "goal.distance_km"),
            other => panic!("expected validation error, got {:?}", other),
        }

        let bad_profile = RunnerProfile {
            hr_max: Some(60),
            hr_rest: Some(70),
            ..Default::default()
        };
        assert!(matches!(
            generate(&bad_profile, &PerformanceRecord::new(dec!(5), 1500), &goal()),
            Err(PlannerError::Validation(ValidationError::HeartRateOrder { .. }))
        ));
    }

    #[test]
    fn test_custom_settings() {
        let settings = EngineSettings {
            fatigue_exponent: dec!(1.06),
            long_run_cap: LongRunCapFormula::LegacyPaceScaled,
            zone_mode: ZoneMode::Manual(
                ZoneBoundaryConfig::new([dec!(55), dec!(65), dec!(75), dec!(85), dec!(95)]).unwrap(),
            ),
        };
        let planner = TrainingPlanner::new(&settings).unwrap();
        let result = planner
            .generate(&profile(), &PerformanceRecord::new(dec!(5), 1500), &goal())
            .unwrap();

        // 60 + 130 * 0.95 = 183.5 -> 184
        assert_eq!(result.zones.unwrap().zone(5).max, 184);

        let invalid = EngineSettings {
            fatigue_exponent: dec!(-1),
            ..Default::default()
        };
        assert!(TrainingPlanner::new(&invalid).is_err());
    }
}
