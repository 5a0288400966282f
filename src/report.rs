//! Terminal presentation of plan results
//!
//! The engine hands back plain data; everything in here turns it into
//! strings for the CLI. Tables use `tabled`, verdict highlighting uses `colored`.

use colored::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tabled::{settings::Style, Table, Tabled};

use crate::models::{
    format_pace, Feasibility, FeasibilityResult, FuelPlan, HeartRateZones, RacePredictions,
    StandardDistance, WeekPlan,
};
use crate::scenarios::WhatIfOutcome;

/// Format whole seconds as `h:mm:ss`, or `m:ss` below one hour
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format fractional seconds, rounded to the nearest second
pub fn format_seconds(seconds: Decimal) -> String {
    let whole = seconds
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);
    format_duration(whole)
}

/// Standard race name when the distance is one, otherwise `N km`
pub fn distance_label(km: Decimal) -> String {
    match StandardDistance::from_km(km) {
        Some(distance) => distance.label().to_string(),
        None => format!("{} km", km),
    }
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Dates")]
    dates: String,
    #[tabled(rename = "Total km")]
    total_km: String,
    #[tabled(rename = "LSD km")]
    lsd_km: String,
    #[tabled(rename = "LSD %")]
    lsd_percentage: String,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Workout")]
    workout: String,
    #[tabled(rename = "km")]
    distance: String,
    #[tabled(rename = "Pace")]
    pace: String,
    #[tabled(rename = "Min")]
    duration: String,
    #[tabled(rename = "Heart rate")]
    zone: String,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: u8,
    #[tabled(rename = "Min bpm")]
    min: u16,
    #[tabled(rename = "Max bpm")]
    max: u16,
}

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Distance")]
    distance: &'static str,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Pace")]
    pace: String,
}

/// One row per week
pub fn weeks_table(plan: &[WeekPlan]) -> String {
    let rows = plan.iter().map(|week| WeekRow {
        week: if week.is_recovery_week {
            format!("{}*", week.week)
        } else {
            week.week.to_string()
        },
        phase: week.phase.to_string(),
        dates: match (week.start_date, week.end_date) {
            (Some(start), Some(end)) => format!("{} - {}", start.format("%b %d"), end.format("%b %d")),
            _ => "-".to_string(),
        },
        total_km: week.total_km.to_string(),
        lsd_km: week.lsd_km.to_string(),
        lsd_percentage: format!("{}%", week.lsd_percentage),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Daily sessions for a single week
pub fn days_table(week: &WeekPlan) -> String {
    let rows = week.days.iter().map(|day| DayRow {
        day: day.day.to_string(),
        workout: day.workout_type.to_string(),
        distance: day.distance_km.to_string(),
        pace: format_pace(day.pace_min_per_km),
        duration: day.duration_minutes.to_string(),
        zone: day.heart_rate_zone.label(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn zones_table(zones: &HeartRateZones) -> String {
    let rows = zones.iter().map(|(zone, bounds)| ZoneRow {
        zone,
        min: bounds.min,
        max: bounds.max,
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Predicted times at the four standard distances
pub fn predictions_table(predictions: &RacePredictions) -> String {
    let rows = StandardDistance::PREDICTED.iter().filter_map(|distance| {
        let seconds = predictions.get(*distance)?;
        Some(PredictionRow {
            distance: distance.label(),
            time: format_seconds(seconds),
            pace: format_pace(seconds / dec!(60) / distance.km()),
        })
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Colored one-line verdict
pub fn verdict_line(result: &FeasibilityResult) -> String {
    let verdict = match result.feasibility {
        Feasibility::Feasible => "FEASIBLE".green().bold(),
        Feasibility::Borderline => "BORDERLINE".yellow().bold(),
        Feasibility::NotFeasible => "NOT FEASIBLE".red().bold(),
    };
    format!(
        "{} target {}{} (current {}), needs {}% improvement, {}% reachable",
        verdict,
        format_duration(result.target_time_seconds),
        if result.target_time_suggested { " (suggested)" } else { "" },
        format_seconds(result.predicted_time_seconds),
        result.required_improvement_pct.round_dp(1),
        result.max_reasonable_improvement_pct,
    )
}

/// Alternatives shown with a not-feasible verdict
pub fn alternatives(result: &FeasibilityResult) -> Option<String> {
    if result.feasibility != Feasibility::NotFeasible {
        return None;
    }
    Some(format!(
        "Either extend preparation to {} weeks or aim for {} in the current window",
        result.recommended_weeks,
        format_duration(result.recommended_target_time_seconds)
    ))
}

#[derive(Tabled)]
struct WhatIfRow {
    #[tabled(rename = "Weeks")]
    weeks: u32,
    #[tabled(rename = "Verdict")]
    verdict: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Needed %")]
    required: String,
    #[tabled(rename = "Reachable %")]
    reachable: String,
    #[tabled(rename = "Peak km/wk")]
    peak_km: String,
}

/// One row per evaluated goal; failed goals show their error instead
pub fn what_if_table(outcomes: &[WhatIfOutcome]) -> String {
    let rows = outcomes.iter().map(|outcome| match &outcome.result {
        Ok(result) => WhatIfRow {
            weeks: outcome.goal.prep_weeks,
            verdict: result.feasibility.feasibility.to_string(),
            target: format_duration(result.feasibility.target_time_seconds),
            required: result.feasibility.required_improvement_pct.round_dp(1).to_string(),
            reachable: result.feasibility.max_reasonable_improvement_pct.to_string(),
            peak_km: result
                .plan
                .iter()
                .map(|week| week.total_km)
                .max()
                .unwrap_or_default()
                .to_string(),
        },
        Err(e) => WhatIfRow {
            weeks: outcome.goal.prep_weeks,
            verdict: e.user_message(),
            target: "-".to_string(),
            required: "-".to_string(),
            reachable: "-".to_string(),
            peak_km: "-".to_string(),
        },
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn fuel_summary(fuel: &FuelPlan) -> String {
    let mut lines = vec![format!(
        "Water: {} ml ({} x {} ml)   Carbs: {} g ({} gels x {} g)",
        fuel.total_water_ml,
        fuel.water_serving_count,
        fuel.water_per_serving_ml,
        fuel.total_carbs_grams,
        fuel.gel_count,
        fuel.carbs_per_gel_grams,
    )];
    lines.extend(fuel.guidance.iter().map(|line| format!("  - {}", line)));
    lines.join("\n")
}
