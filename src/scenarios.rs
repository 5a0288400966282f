//! Batch what-if evaluation
//!
//! Runs the planner for many goals against one profile and performance. The
//! planner is stateless, so goals are evaluated in parallel with rayon and the
//! outcomes come back in input order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::config::EngineSettings;
use crate::error::Result;
use crate::models::{Goal, PerformanceRecord, PlanResult, RunnerProfile};
use crate::planner::TrainingPlanner;

/// One goal and what the planner made of it
#[derive(Debug)]
pub struct WhatIfOutcome {
    pub goal: Goal,
    pub result: Result<PlanResult>,
}

/// Serializable view of an outcome for JSON output
#[derive(Debug, Serialize)]
pub struct WhatIfSummary<'a> {
    pub goal: &'a Goal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a PlanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WhatIfOutcome {
    pub fn summary(&self) -> WhatIfSummary<'_> {
        match &self.result {
            Ok(result) => WhatIfSummary {
                goal: &self.goal,
                result: Some(result),
                error: None,
            },
            Err(e) => WhatIfSummary {
                goal: &self.goal,
                result: None,
                error: Some(e.user_message()),
            },
        }
    }
}

/// Evaluate every goal; a failing goal does not stop the others
pub fn evaluate_goals(
    profile: &RunnerProfile,
    performance: &PerformanceRecord,
    goals: &[Goal],
    settings: &EngineSettings,
) -> Result<Vec<WhatIfOutcome>> {
    let planner = TrainingPlanner::new(settings)?;

    info!(goals = goals.len(), "Evaluating what-if goals");

    Ok(goals
        .par_iter()
        .map(|goal| WhatIfOutcome {
            goal: goal.clone(),
            result: planner.generate(profile, performance, goal),
        })
        .collect())
}

/// Copies of `base` differing only in preparation weeks
pub fn prep_week_variants(base: &Goal, weeks: &[u32]) -> Vec<Goal> {
    weeks
        .iter()
        .map(|&prep_weeks| Goal {
            prep_weeks,
            ..base.clone()
        })
        .collect()
}
