use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use racecraft::config::{OutputFormat, PlannerConfig};
use racecraft::logging::{init_logging, LogLevel};
use racecraft::models::{to_seconds, StandardDistance, ZoneBoundaryConfig};
use racecraft::report;
use racecraft::scenarios::{evaluate_goals, prep_week_variants};
use racecraft::validation::{FormValue, GoalForm, PerformanceForm, ProfileForm, Scenario};
use racecraft::zones::{ZoneCalculator, ZoneMode};
use racecraft::{NutritionStrategyAdvisor, PerformancePredictor, PlannerError, TrainingPlanner};

/// Racecraft - race goal planner
///
/// Checks whether a race goal is realistic from a recent performance, then
/// builds a periodized training plan with heart-rate zones and a race-day
/// fueling strategy.
#[derive(Parser)]
#[command(name = "racecraft")]
#[command(author = "Racecraft Contributors")]
#[command(version)]
#[command(about = "Race goal feasibility and training plan generator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Runner and goal inputs, either from flags or a scenario file
#[derive(Args)]
struct InputArgs {
    /// Scenario file (TOML, or JSON with a .json extension); replaces the flags below
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Maximum heart rate (bpm)
    #[arg(long)]
    hr_max: Option<String>,

    /// Resting heart rate (bpm)
    #[arg(long)]
    hr_rest: Option<String>,

    /// Recent performance distance: km or 3k, 5k, 10k, half, full
    #[arg(short, long, default_value = "5")]
    distance: String,

    /// Recent performance time (h:mm:ss or mm:ss)
    #[arg(short, long, default_value = "25:00")]
    time: String,

    /// Average heart rate during the recent performance (bpm)
    #[arg(long)]
    avg_hr: Option<String>,

    /// Goal race distance: km or 5k, 10k, half, full
    #[arg(short, long, default_value = "10")]
    goal_distance: String,

    /// Goal finish time (h:mm:ss or mm:ss); suggested when omitted
    #[arg(long)]
    target: Option<String>,

    /// Running days per week (3-6)
    #[arg(long, default_value = "4")]
    days: String,

    /// Weekly volume ceiling in km
    #[arg(long, default_value = "40")]
    max_weekly_km: String,

    /// Race day (YYYY-MM-DD), adds calendar dates to the plan
    #[arg(long)]
    race_date: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a goal and generate the full training plan
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Preparation weeks
        #[arg(short, long)]
        weeks: Option<String>,

        /// Show each week's daily workouts
        #[arg(long)]
        details: bool,
    },

    /// Show heart rate zones
    Zones {
        /// Maximum heart rate (bpm)
        #[arg(long)]
        hr_max: String,

        /// Resting heart rate (bpm)
        #[arg(long)]
        hr_rest: String,

        /// Manual zone upper bounds in % of heart rate reserve, e.g. 60,70,80,90,100
        #[arg(long, value_delimiter = ',')]
        manual: Option<Vec<Decimal>>,
    },

    /// Predict race times from a known performance
    Predict {
        /// Known distance: km or 3k, 5k, 10k, half, full
        #[arg(short, long)]
        distance: String,

        /// Known time (h:mm:ss or mm:ss)
        #[arg(short, long)]
        time: String,

        /// Single target distance; all standard distances when omitted
        #[arg(long)]
        to: Option<String>,
    },

    /// Race-day fueling plan for a finish time
    Fuel {
        /// Expected finish time (h:mm:ss or mm:ss)
        #[arg(short, long)]
        time: String,
    },

    /// Compare the same goal across several preparation lengths
    WhatIf {
        #[command(flatten)]
        input: InputArgs,

        /// Preparation weeks to compare, e.g. 8,12,16
        #[arg(short, long, value_delimiter = ',', required = true)]
        weeks: Vec<u32>,
    },

    /// Manage configuration
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlannerConfig::load_from_file(path)?,
        None => PlannerConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone();
    if let Some(level) = LogLevel::from_verbosity(cli.verbose) {
        log_config.level = level;
    }
    init_logging(&log_config)?;

    let json = cli.json || config.output.format == OutputFormat::Json;

    match cli.command {
        Commands::Generate {
            input,
            weeks,
            details,
        } => {
            let scenario = load_scenario(&input, weeks.as_deref())?;
            let inputs = scenario.validate().map_err(PlannerError::from).map_err(friendly)?;
            let planner = TrainingPlanner::new(&config.engine).map_err(friendly)?;
            let result = planner.generate_from(&inputs).map_err(friendly)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!("{}", "Goal feasibility".cyan().bold());
            println!("{}", report::verdict_line(&result.feasibility));
            if let Some(alternatives) = report::alternatives(&result.feasibility) {
                println!("{}", alternatives.yellow());
            }
            if !result.feasibility.weekly_volume_adequate {
                println!(
                    "{}",
                    format!(
                        "Weekly ceiling {} km is below 3x the race distance",
                        inputs.goal.max_weekly_km
                    )
                    .yellow()
                );
            }

            println!("\n{}", "Current ability".cyan().bold());
            println!("{}", report::predictions_table(&result.feasibility.current_ability));

            if let Some(zones) = &result.zones {
                println!("\n{}", "Heart rate zones".cyan().bold());
                println!("{}", report::zones_table(zones));
                if let Some(zone) = result.performance_zone {
                    println!("Recent performance averaged zone {}", zone);
                }
            }

            println!("\n{}", "Training plan (* recovery week)".cyan().bold());
            println!("{}", report::weeks_table(&result.plan));
            if details {
                for week in &result.plan {
                    println!("\n{}", format!("Week {} - {}", week.week, week.phase).bold());
                    println!("{}", report::days_table(week));
                }
            }

            println!("\n{}", "Race-day fueling".cyan().bold());
            println!("{}", report::fuel_summary(&result.fuel));
        }

        Commands::Zones {
            hr_max,
            hr_rest,
            manual,
        } => {
            let profile = ProfileForm {
                hr_max: Some(FormValue::from(hr_max.as_str())),
                hr_rest: Some(FormValue::from(hr_rest.as_str())),
                ..Default::default()
            }
            .validate()
            .map_err(PlannerError::from)
            .map_err(friendly)?;

            let mode = match manual {
                Some(bounds) => ZoneMode::Manual(
                    ZoneBoundaryConfig::try_from(bounds)
                        .map_err(PlannerError::from)
                        .map_err(friendly)?,
                ),
                None => config.engine.zone_mode.clone(),
            };

            let zones = ZoneCalculator::compute_zones(profile.hr_max, profile.hr_rest, &mode)
                .map_err(friendly)?
                .context("Both heart rates are required for zones")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&zones)?);
            } else {
                println!("{}", report::zones_table(&zones));
            }
        }

        Commands::Predict { distance, time, to } => {
            let performance = PerformanceForm {
                distance_km: Some(distance_value(&distance)),
                ..clock_fields(&time)?
            }
            .validate()
            .map_err(PlannerError::from)
            .map_err(friendly)?;

            let predictor = PerformancePredictor::with_exponent(config.engine.fatigue_exponent)
                .map_err(PlannerError::from)
                .map_err(friendly)?;

            match to {
                Some(target) => {
                    let target_km = parse_distance(&target)?;
                    let seconds = predictor
                        .predict_time(
                            performance.distance_km,
                            Decimal::from(performance.elapsed_seconds),
                            target_km,
                        )
                        .map_err(friendly)?;
                    if json {
                        println!(
                            "{}",
                            serde_json::json!({ "distance_km": target_km, "predicted_seconds": seconds })
                        );
                    } else {
                        println!(
                            "{}: {}",
                            report::distance_label(target_km),
                            report::format_seconds(seconds).bold()
                        );
                    }
                }
                None => {
                    let predictions = predictor.current_ability(&performance).map_err(friendly)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&predictions)?);
                    } else {
                        println!("{}", report::predictions_table(&predictions));
                    }
                }
            }
        }

        Commands::Fuel { time } => {
            let seconds = parse_clock(&time)?;
            let fuel = NutritionStrategyAdvisor::advise(seconds);
            if json {
                println!("{}", serde_json::to_string_pretty(&fuel)?);
            } else {
                println!("{}", format!("Fueling for {}", report::format_duration(seconds)).cyan().bold());
                println!("{}", report::fuel_summary(&fuel));
            }
        }

        Commands::WhatIf { input, weeks } => {
            let scenario = load_scenario(&input, None)?;
            let inputs = scenario.validate().map_err(PlannerError::from).map_err(friendly)?;
            let goals = prep_week_variants(&inputs.goal, &weeks);

            let outcomes = evaluate_goals(&inputs.profile, &inputs.performance, &goals, &config.engine)
                .map_err(friendly)?;

            if json {
                let summaries: Vec<_> = outcomes.iter().map(|o| o.summary()).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("{}", report::what_if_table(&outcomes));
            }
        }

        Commands::Config { init, force, show } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(PlannerConfig::default_config_path);

            if init {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                PlannerConfig::default().save_to_file(&path)?;
                println!("{} {}", "✓ Wrote default configuration to".green(), path.display());
            }

            if show || !init {
                println!("{}", format!("# {}", path.display()).dimmed());
                if json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    println!("{}", toml::to_string_pretty(&config)?);
                }
            }
        }
    }

    Ok(())
}

fn load_scenario(input: &InputArgs, weeks: Option<&str>) -> Result<Scenario> {
    let mut scenario = match &input.scenario {
        Some(path) => Scenario::from_file(path)
            .with_context(|| format!("Failed to load scenario: {}", path.display()))?,
        None => scenario_from_flags(input)?,
    };

    if let Some(weeks) = weeks {
        scenario.goal.prep_weeks = Some(FormValue::from(weeks));
    }
    Ok(scenario)
}

fn scenario_from_flags(input: &InputArgs) -> Result<Scenario> {
    let target = match &input.target {
        Some(target) => clock_parts(target)?,
        None => [String::new(), String::new(), String::new()],
    };
    let [target_hours, target_minutes, target_seconds] = target.map(|part| Some(FormValue::Text(part)));

    Ok(Scenario {
        profile: ProfileForm {
            hr_max: input.hr_max.as_deref().map(FormValue::from),
            hr_rest: input.hr_rest.as_deref().map(FormValue::from),
            ..Default::default()
        },
        performance: PerformanceForm {
            distance_km: Some(distance_value(&input.distance)),
            average_heart_rate: input.avg_hr.as_deref().map(FormValue::from),
            ..clock_fields(&input.time)?
        },
        goal: GoalForm {
            distance_km: Some(distance_value(&input.goal_distance)),
            target_hours,
            target_minutes,
            target_seconds,
            prep_weeks: Some(FormValue::from("12")),
            days_per_week: Some(FormValue::from(input.days.as_str())),
            max_weekly_km: Some(FormValue::from(input.max_weekly_km.as_str())),
            race_date: input.race_date.clone(),
        },
    })
}

/// Split `h:mm:ss` or `mm:ss` into hour, minute and second text
fn clock_parts(text: &str) -> Result<[String; 3]> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    match parts.as_slice() {
        [m, s] => Ok(["0".to_string(), m.to_string(), s.to_string()]),
        [h, m, s] => Ok([h.to_string(), m.to_string(), s.to_string()]),
        _ => bail!("Invalid time '{}': expected h:mm:ss or mm:ss", text),
    }
}

fn clock_fields(text: &str) -> Result<PerformanceForm> {
    let [hours, minutes, seconds] = clock_parts(text)?;
    Ok(PerformanceForm {
        hours: Some(FormValue::Text(hours)),
        minutes: Some(FormValue::Text(minutes)),
        seconds: Some(FormValue::Text(seconds)),
        ..Default::default()
    })
}

fn parse_clock(text: &str) -> Result<u32> {
    let [hours, minutes, seconds] = clock_parts(text)?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .with_context(|| format!("Invalid time '{}'", text))
    };
    Ok(to_seconds(parse(&hours)?, parse(&minutes)?, parse(&seconds)?))
}

/// Standard distance names map to their km value; anything else is passed through
fn distance_value(text: &str) -> FormValue {
    match text.parse::<StandardDistance>() {
        Ok(distance) => FormValue::Text(distance.km().to_string()),
        Err(_) => FormValue::from(text),
    }
}

fn parse_distance(text: &str) -> Result<Decimal> {
    let km = match text.parse::<StandardDistance>() {
        Ok(distance) => distance.km(),
        Err(_) => Decimal::from_str(text.trim())
            .with_context(|| format!("Invalid distance '{}'", text))?,
    };
    if km <= Decimal::ZERO {
        bail!("Distance must be greater than zero, got {}", km);
    }
    Ok(km)
}

/// Log at the error's severity and surface the user-facing message
fn friendly(error: PlannerError) -> anyhow::Error {
    match error.severity().to_tracing_level() {
        tracing::Level::WARN => tracing::warn!(%error, "Rejected input"),
        _ => tracing::error!(%error, "Planning failed"),
    }
    anyhow::anyhow!(error.user_message())
}
