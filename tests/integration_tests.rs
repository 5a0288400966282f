use racecraft::{models, planner, scenarios, validation};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

/// Integration tests that run complete planning workflows

#[cfg(test)]
mod integration_tests {
    use super::*;
    use racecraft::config::{EngineSettings, PlannerConfig};
    use racecraft::long_run::LongRunCapFormula;
    use racecraft::models::{Feasibility, Goal, PerformanceRecord, Phase, RunnerProfile, WorkoutType};
    use racecraft::{PlannerError, TrainingPlanner, ZoneMode};
    use rust_decimal::Decimal;
    use std::fs;
    use tempfile::tempdir;

    fn create_test_profile() -> RunnerProfile {
        RunnerProfile {
            age: Some(35),
            gender: models::Gender::Female,
            hr_max: Some(190),
            hr_rest: Some(60),
        }
    }

    fn create_test_goal() -> Goal {
        Goal {
            distance_km: dec!(10),
            target_time_seconds: None,
            prep_weeks: 12,
            days_per_week: 4,
            max_weekly_km: dec!(40),
            race_date: None,
        }
    }

    /// 25:00 5K toward a 10K in 12 weeks, target suggested
    #[test]
    fn test_suggested_10k_workflow() {
        let result = planner::generate(
            &create_test_profile(),
            &PerformanceRecord::new(dec!(5), 1500),
            &create_test_goal(),
        )
        .unwrap();

        let feasibility = &result.feasibility;
        assert!(feasibility.predicted_time_seconds > dec!(3127));
        assert!(feasibility.predicted_time_seconds < dec!(3128));
        assert_eq!(feasibility.target_time_seconds, 2971);
        assert!(feasibility.target_time_suggested);
        assert_eq!(feasibility.max_reasonable_improvement_pct, dec!(7));
        assert_eq!(feasibility.feasibility, Feasibility::Feasible);

        let zones = result.zones.as_ref().unwrap();
        let expected = [(125, 138), (138, 151), (151, 164), (164, 177), (177, 190)];
        for ((_, zone), (min, max)) in zones.iter().zip(expected) {
            assert_eq!((zone.min, zone.max), (min, max));
        }

        assert_eq!(result.plan.len(), 12);
        let phases: Vec<Phase> = result.plan.iter().map(|w| w.phase).collect();
        assert_eq!(phases.iter().filter(|p| **p == Phase::Base).count(), 4);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Build).count(), 4);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Taper).count(), 4);

        for week in &result.plan {
            assert!(week.days.len() <= 4);
            let total: Decimal = week.days.iter().map(|d| d.distance_km).sum();
            assert_eq!(week.total_km, total);
            assert_eq!(week.is_recovery_week, week.week % 4 == 0);
        }

        assert_eq!(result.fuel.total_carbs_grams, result.fuel.gel_count * 25);
    }

    /// 50:00 10K aiming at 40:00 in 8 weeks gets both alternatives
    #[test]
    fn test_unrealistic_goal_workflow() {
        let goal = Goal {
            target_time_seconds: Some(2400),
            prep_weeks: 8,
            days_per_week: 5,
            max_weekly_km: dec!(50),
            ..create_test_goal()
        };
        let result = planner::generate(
            &RunnerProfile::default(),
            &PerformanceRecord::new(dec!(10), 3000),
            &goal,
        )
        .unwrap();

        assert_eq!(result.feasibility.feasibility, Feasibility::NotFeasible);
        assert_eq!(result.feasibility.recommended_weeks, 32);
        assert_eq!(result.feasibility.recommended_target_time_seconds, 2910);

        // Still a full plan, paced for the stated target (4:00 min/km)
        assert_eq!(result.plan.len(), 8);
        let build_week = result.plan.iter().find(|w| w.phase == Phase::Build).unwrap();
        let interval = build_week
            .days
            .iter()
            .find(|d| d.workout_type == WorkoutType::Interval)
            .unwrap();
        assert_eq!(interval.pace_min_per_km, dec!(3.80));
        assert!(result.zones.is_none());
    }

    #[test]
    fn test_marathon_fueling() {
        let goal = Goal {
            distance_km: dec!(42.2),
            target_time_seconds: Some(4 * 3600),
            prep_weeks: 16,
            days_per_week: 5,
            max_weekly_km: dec!(80),
            race_date: NaiveDate::from_ymd_opt(2026, 11, 1),
        };
        let result = planner::generate(
            &create_test_profile(),
            &PerformanceRecord::new(dec!(21.1), 6900),
            &goal,
        )
        .unwrap();

        assert_eq!(result.fuel.gel_count, 8);
        assert_eq!(result.fuel.total_carbs_grams, 200);
        assert_eq!(result.plan[0].start_date, NaiveDate::from_ymd_opt(2026, 7, 12));
        assert_eq!(result.plan[15].end_date, NaiveDate::from_ymd_opt(2026, 10, 31));
    }

    #[test]
    fn test_scenario_file_workflow() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("half.toml");
        fs::write(
            &path,
            r#"
            [profile]
            age = "41"
            gender = "male"
            hr_max = "182"
            hr_rest = "52"

            [performance]
            distance_km = "10"
            hours = "0"
            minutes = "48"
            seconds = "30"

            [goal]
            distance_km = "21.1"
            target_hours = "1"
            target_minutes = "45"
            prep_weeks = "14"
            days_per_week = "5"
            max_weekly_km = "65"
            "#,
        )
        .unwrap();

        let scenario = validation::Scenario::from_file(&path).unwrap();
        let inputs = scenario.validate().unwrap();
        assert_eq!(inputs.performance.elapsed_seconds, 2910);
        assert_eq!(inputs.goal.target_time_seconds, Some(6300));

        let result = TrainingPlanner::default().generate_from(&inputs).unwrap();
        assert_eq!(result.plan.len(), 14);
        assert!(result.feasibility.weekly_volume_adequate);
    }

    #[test]
    fn test_json_scenario_and_result_serialization() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("scenario.json");
        fs::write(
            &path,
            r#"{"performance": {"distance_km": 5, "minutes": 22, "seconds": 15},
                "goal": {"distance_km": 5, "prep_weeks": 6, "days_per_week": 3, "max_weekly_km": 25}}"#,
        )
        .unwrap();

        let inputs = validation::Scenario::from_file(&path).unwrap().validate().unwrap();
        let result = TrainingPlanner::default().generate_from(&inputs).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["plan"].as_array().unwrap().len(), 6);
        assert_eq!(json["feasibility"]["target_time_suggested"], true);
        assert_eq!(json["plan"][0]["days"][0]["workout_type"], "LSD");
    }

    #[test]
    fn test_missing_field_is_reported_by_name() {
        let scenario = validation::Scenario::from_toml_str(
            r#"
            [performance]
            distance_km = "5"
            minutes = "25"

            [goal]
            distance_km = "10"
            prep_weeks = "12"
            max_weekly_km = "40"
            "#,
        )
        .unwrap();

        let err = scenario.validate().unwrap_err();
        assert_eq!(err.field(), "goal.days_per_week");

        let planner_error: PlannerError = err.into();
        assert!(planner_error.user_message().contains("goal.days_per_week"));
    }

    #[test]
    fn test_config_driven_planner() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = PlannerConfig::default();
        config.engine.long_run_cap = LongRunCapFormula::LegacyPaceScaled;
        config.save_to_file(&path).unwrap();

        let loaded = PlannerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.engine.long_run_cap, LongRunCapFormula::LegacyPaceScaled);
        assert_eq!(loaded.engine.zone_mode, ZoneMode::Automatic);

        let planner = TrainingPlanner::new(&loaded.engine).unwrap();
        let result = planner
            .generate(
                &create_test_profile(),
                &PerformanceRecord::new(dec!(5), 1500),
                &create_test_goal(),
            )
            .unwrap();
        assert_eq!(result.plan.len(), 12);
    }

    #[test]
    fn test_batch_what_if_matches_single_runs() {
        let profile = create_test_profile();
        let performance = PerformanceRecord::new(dec!(5), 1500);
        let goals = scenarios::prep_week_variants(&create_test_goal(), &[6, 8, 10, 12, 16]);
        let settings = EngineSettings::default();

        let outcomes = scenarios::evaluate_goals(&profile, &performance, &goals, &settings).unwrap();
        assert_eq!(outcomes.len(), 5);

        for outcome in &outcomes {
            let single = planner::generate(&profile, &performance, &outcome.goal).unwrap();
            assert_eq!(outcome.result.as_ref().unwrap(), &single);
            assert_eq!(single.plan.len() as u32, outcome.goal.prep_weeks);
        }
    }

    #[test]
    fn test_oversized_inputs_fail_validation_without_panicking() {
        let scenario = validation::Scenario::from_toml_str(
            r#"
            [performance]
            distance_km = "5"
            minutes = "25"

            [goal]
            distance_km = "10"
            prep_weeks = "20000000"
            days_per_week = "4"
            max_weekly_km = "40"
            race_date = "2026-05-31"
            "#,
        )
        .unwrap();
        assert_eq!(scenario.validate().unwrap_err().field(), "goal.prep_weeks");

        let scenario = validation::Scenario::from_toml_str(
            r#"
            [performance]
            distance_km = "0.00001"
            hours = "1"

            [goal]
            distance_km = "100000000000000000000"
            prep_weeks = "12"
            days_per_week = "4"
            max_weekly_km = "40"
            "#,
        )
        .unwrap();
        assert_eq!(scenario.validate().unwrap_err().field(), "goal.distance_km");
    }

    #[test]
    fn test_typed_goal_beyond_distance_ceiling() {
        let goal = Goal {
            distance_km: dec!(100000),
            max_weekly_km: dec!(400),
            ..create_test_goal()
        };
        let err = TrainingPlanner::default()
            .generate(&create_test_profile(), &PerformanceRecord::new(dec!(1), 359999), &goal)
            .unwrap_err();
        assert!(err.user_message().contains("goal.distance_km"));
    }
}
