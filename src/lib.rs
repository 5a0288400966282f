// Library interface for racecraft
// The binary and integration tests both go through these modules

pub mod config;
pub mod error;
pub mod feasibility;
pub mod logging;
pub mod long_run;
pub mod models;
pub mod nutrition;
pub mod planner;
pub mod prediction;
pub mod report;
pub mod scenarios;
pub mod training_plan;
pub mod validation;
pub mod zones;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::{EngineSettings, OutputFormat, PlannerConfig};
pub use error::{CalculationError, PlannerError, Result, ValidationError};
pub use feasibility::FeasibilityEvaluator;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use long_run::{LongRunCapFormula, LongRunRuleEngine};
pub use nutrition::NutritionStrategyAdvisor;
pub use planner::{generate, TrainingPlanner};
pub use prediction::PerformancePredictor;
pub use scenarios::{evaluate_goals, WhatIfOutcome};
pub use training_plan::PeriodizedPlanGenerator;
pub use validation::{FormValue, GoalForm, PerformanceForm, PlanInputs, ProfileForm, Scenario};
pub use zones::{ZoneCalculator, ZoneMode};
