use chrono::{NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Runner gender; informational only, no rule depends on it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Runner profile as collected by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerProfile {
    /// Age in years (informational)
    pub age: Option<u8>,

    /// Gender (informational)
    pub gender: Gender,

    /// Maximum heart rate in bpm
    pub hr_max: Option<u16>,

    /// Resting heart rate in bpm
    pub hr_rest: Option<u16>,
}

/// Standard race distances offered by the distance picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardDistance {
    ThreeK,
    FiveK,
    TenK,
    HalfMarathon,
    Marathon,
}

impl StandardDistance {
    pub const ALL: [StandardDistance; 5] = [
        StandardDistance::ThreeK,
        StandardDistance::FiveK,
        StandardDistance::TenK,
        StandardDistance::HalfMarathon,
        StandardDistance::Marathon,
    ];

    /// Distances reported in the current-ability snapshot
    pub const PREDICTED: [StandardDistance; 4] = [
        StandardDistance::FiveK,
        StandardDistance::TenK,
        StandardDistance::HalfMarathon,
        StandardDistance::Marathon,
    ];

    pub fn km(&self) -> Decimal {
        match self {
            StandardDistance::ThreeK => dec!(3),
            StandardDistance::FiveK => dec!(5),
            StandardDistance::TenK => dec!(10),
            StandardDistance::HalfMarathon => dec!(21.1),
            StandardDistance::Marathon => dec!(42.2),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StandardDistance::ThreeK => "3K",
            StandardDistance::FiveK => "5K",
            StandardDistance::TenK => "10K",
            StandardDistance::HalfMarathon => "Half Marathon",
            StandardDistance::Marathon => "Marathon",
        }
    }

    /// Match a free numeric distance back to a standard one
    pub fn from_km(km: Decimal) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.km() == km)
    }

}

impl std::str::FromStr for StandardDistance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "3k" => Ok(Self::ThreeK),
            "5k" => Ok(Self::FiveK),
            "10k" => Ok(Self::TenK),
            "half" | "half-marathon" | "21k" => Ok(Self::HalfMarathon),
            "full" | "marathon" | "42k" => Ok(Self::Marathon),
            _ => Err(format!("Unknown race distance: {}", s)),
        }
    }
}

/// A recent race or training performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Distance covered in kilometers
    pub distance_km: Decimal,

    /// Elapsed time in seconds
    pub elapsed_seconds: u32,

    /// Average heart rate (informational)
    pub average_heart_rate: Option<u16>,

    /// Whether this was a race effort (informational)
    pub is_race: bool,
}

impl PerformanceRecord {
    pub fn new(distance_km: Decimal, elapsed_seconds: u32) -> Self {
        Self {
            distance_km,
            elapsed_seconds,
            average_heart_rate: None,
            is_race: true,
        }
    }
}

/// Combine split hours/minutes/seconds fields into whole seconds
pub fn to_seconds(hours: u32, minutes: u32, seconds: u32) -> u32 {
    hours * 3600 + minutes * 60 + seconds
}

/// Format a pace in min/km as `m:ss`
pub fn format_pace(pace_min_per_km: Decimal) -> String {
    let total_seconds = pace_min_per_km
        .checked_mul(dec!(60))
        .map(|seconds| seconds.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|seconds| seconds.to_u64())
        .unwrap_or(u64::MAX);
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Target race and training constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Target race distance in kilometers
    pub distance_km: Decimal,

    /// Target finish time; `None` asks the engine to suggest one
    pub target_time_seconds: Option<u32>,

    /// Weeks available to prepare
    pub prep_weeks: u32,

    /// Running days per week (3-6)
    pub days_per_week: u8,

    /// Weekly volume ceiling in kilometers
    pub max_weekly_km: Decimal,

    /// Race day, used to put calendar dates on the plan
    #[serde(default)]
    pub race_date: Option<NaiveDate>,
}

/// A single heart-rate zone in bpm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateZone {
    pub min: u16,
    pub max: u16,
}

/// Five contiguous heart-rate zones, zone 1 first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateZones {
    pub zones: [HeartRateZone; 5],
}

impl HeartRateZones {
    /// Zone by 1-based number; numbers outside 1..=5 are clamped
    pub fn zone(&self, number: u8) -> HeartRateZone {
        let index = number.clamp(1, 5) as usize - 1;
        self.zones[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &HeartRateZone)> {
        self.zones.iter().enumerate().map(|(i, z)| (i as u8 + 1, z))
    }
}

/// Manual zone upper bounds as percentages of heart rate reserve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Decimal>", into = "Vec<Decimal>")]
pub struct ZoneBoundaryConfig {
    upper_percentages: [Decimal; 5],
}

impl ZoneBoundaryConfig {
    /// Lower bound of zone 1 in HRR%
    pub const FLOOR_PERCENT: Decimal = dec!(50);
    /// Highest allowed upper bound in HRR%
    pub const CEILING_PERCENT: Decimal = dec!(100);

    /// Build from five strictly increasing percentages within [50, 100]
    pub fn new(upper_percentages: [Decimal; 5]) -> Result<Self, ValidationError> {
        if upper_percentages[0] < Self::FLOOR_PERCENT {
            return Err(ValidationError::ZoneBoundaries {
                reason: format!(
                    "first boundary must be at least {}%, got {}%",
                    Self::FLOOR_PERCENT,
                    upper_percentages[0]
                ),
            });
        }
        if upper_percentages[4] > Self::CEILING_PERCENT {
            return Err(ValidationError::ZoneBoundaries {
                reason: format!(
                    "last boundary must be at most {}%, got {}%",
                    Self::CEILING_PERCENT,
                    upper_percentages[4]
                ),
            });
        }
        for pair in upper_percentages.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ValidationError::ZoneBoundaries {
                    reason: format!(
                        "boundaries must be strictly increasing ({}% followed by {}%)",
                        pair[0], pair[1]
                    ),
                });
            }
        }
        Ok(Self { upper_percentages })
    }

    pub fn upper_percentages(&self) -> &[Decimal; 5] {
        &self.upper_percentages
    }
}

impl Default for ZoneBoundaryConfig {
    fn default() -> Self {
        Self {
            upper_percentages: [dec!(60), dec!(70), dec!(80), dec!(90), dec!(100)],
        }
    }
}

impl TryFrom<Vec<Decimal>> for ZoneBoundaryConfig {
    type Error = ValidationError;

    fn try_from(values: Vec<Decimal>) -> Result<Self, Self::Error> {
        let upper: [Decimal; 5] = values.try_into().map_err(|v: Vec<Decimal>| {
            ValidationError::ZoneBoundaries {
                reason: format!("exactly 5 boundaries required, got {}", v.len()),
            }
        })?;
        Self::new(upper)
    }
}

impl From<ZoneBoundaryConfig> for Vec<Decimal> {
    fn from(config: ZoneBoundaryConfig) -> Self {
        config.upper_percentages.to_vec()
    }
}

/// Achievability verdict for a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    Feasible,
    Borderline,
    NotFeasible,
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feasibility::Feasible => write!(f, "feasible"),
            Feasibility::Borderline => write!(f, "borderline"),
            Feasibility::NotFeasible => write!(f, "not_feasible"),
        }
    }
}

/// Predicted finish times at the standard distances, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePredictions {
    pub five_k: Decimal,
    pub ten_k: Decimal,
    pub half_marathon: Decimal,
    pub marathon: Decimal,
}

impl RacePredictions {
    pub fn get(&self, distance: StandardDistance) -> Option<Decimal> {
        match distance {
            StandardDistance::FiveK => Some(self.five_k),
            StandardDistance::TenK => Some(self.ten_k),
            StandardDistance::HalfMarathon => Some(self.half_marathon),
            StandardDistance::Marathon => Some(self.marathon),
            StandardDistance::ThreeK => None,
        }
    }
}

/// Outcome of comparing current capability against the goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityResult {
    pub feasibility: Feasibility,

    /// Improvement needed over current goal-distance capability, in percent
    pub required_improvement_pct: Decimal,

    /// Improvement considered reachable in the prep window, in percent
    pub max_reasonable_improvement_pct: Decimal,

    /// Goal volume check: max weekly km at least 3x race distance
    pub weekly_volume_adequate: bool,

    /// Prep weeks needed for the target; equals prep weeks unless not feasible
    pub recommended_weeks: u32,

    /// Target reachable within the current prep window
    pub recommended_target_time_seconds: u32,

    pub target_time_seconds: u32,

    /// True when the target was suggested rather than given
    pub target_time_suggested: bool,

    /// Current capability at the goal distance
    pub predicted_time_seconds: Decimal,

    pub current_ability: RacePredictions,
}

/// Periodization phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Base,
    Build,
    Taper,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Base => write!(f, "Base"),
            Phase::Build => write!(f, "Build"),
            Phase::Taper => write!(f, "Taper"),
        }
    }
}

/// Workout types used by the plan generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutType {
    #[serde(rename = "LSD")]
    Lsd,
    Tempo,
    Interval,
    Easy,
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutType::Lsd => write!(f, "LSD"),
            WorkoutType::Tempo => write!(f, "Tempo"),
            WorkoutType::Interval => write!(f, "Interval"),
            WorkoutType::Easy => write!(f, "Easy"),
        }
    }
}

/// Heart-rate target for a workout: a zone span plus bpm when zones are known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTarget {
    pub low_zone: u8,
    pub high_zone: u8,
    pub bpm: Option<(u16, u16)>,
}

impl ZoneTarget {
    pub fn label(&self) -> String {
        let zones = if self.low_zone == self.high_zone {
            format!("Zone {}", self.low_zone)
        } else {
            format!("Zone {}-{}", self.low_zone, self.high_zone)
        };
        match self.bpm {
            Some((low, high)) => format!("{} ({}-{} bpm)", zones, low, high),
            None => zones,
        }
    }
}

impl fmt::Display for ZoneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One day's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWorkout {
    pub day: Weekday,
    pub workout_type: WorkoutType,
    pub distance_km: Decimal,
    /// Pace in minutes per kilometer, two decimals
    pub pace_min_per_km: Decimal,
    pub duration_minutes: u32,
    pub heart_rate_zone: ZoneTarget,
    pub description: String,
}

/// One week of the periodized plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    /// 1-based week number
    pub week: u32,
    pub phase: Phase,
    /// Sum of the composed day distances
    pub total_km: Decimal,
    /// Ramp target the long run was dosed against
    pub volume_target_km: Decimal,
    pub lsd_km: Decimal,
    pub lsd_percentage: Decimal,
    pub is_recovery_week: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: Vec<DayWorkout>,
}

/// Race-day fueling and hydration schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPlan {
    pub total_water_ml: u32,
    pub total_carbs_grams: u32,
    pub gel_count: u32,
    pub water_serving_count: u32,
    pub water_per_serving_ml: u32,
    pub carbs_per_gel_grams: u32,
    pub guidance: Vec<String>,
    pub strategy: String,
}

/// Immutable aggregate returned by one generate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub feasibility: FeasibilityResult,
    pub zones: Option<HeartRateZones>,
    /// Zone of the recent performance's average heart rate, when both are known
    pub performance_zone: Option<u8>,
    pub plan: Vec<WeekPlan>,
    pub fuel: FuelPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_distances() {
        assert_eq!(StandardDistance::HalfMarathon.km(), dec!(21.1));
        assert_eq!(StandardDistance::from_km(dec!(42.2)), Some(StandardDistance::Marathon));
        assert_eq!(StandardDistance::from_km(dec!(15)), None);
        assert_eq!("10k".parse::<StandardDistance>(), Ok(StandardDistance::TenK));
        assert_eq!(" Half ".parse::<StandardDistance>(), Ok(StandardDistance::HalfMarathon));
        assert!("15".parse::<StandardDistance>().is_err());
    }

    #[test]
    fn test_to_seconds() {
        assert_eq!(to_seconds(0, 25, 0), 1500);
        assert_eq!(to_seconds(1, 45, 30), 6330);
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(dec!(5)), "5:00");
        assert_eq!(format_pace(dec!(6.25)), "6:15");
        assert_eq!(format_pace(dec!(4.75)), "4:45");
        // Either side of 330.5 seconds
        assert_eq!(format_pace(dec!(5.50833)), "5:30");
        assert_eq!(format_pace(dec!(5.50834)), "5:31");
    }

    #[test]
    fn test_zone_boundary_config_validation() {
        assert!(ZoneBoundaryConfig::new([dec!(60), dec!(70), dec!(80), dec!(90), dec!(100)]).is_ok());
        assert!(ZoneBoundaryConfig::new([dec!(55), dec!(65), dec!(78), dec!(88), dec!(95)]).is_ok());

        // Not strictly increasing
        assert!(ZoneBoundaryConfig::new([dec!(60), dec!(70), dec!(70), dec!(90), dec!(100)]).is_err());
        assert!(ZoneBoundaryConfig::new([dec!(60), dec!(80), dec!(70), dec!(90), dec!(100)]).is_err());

        // Outside [50, 100]
        assert!(ZoneBoundaryConfig::new([dec!(45), dec!(70), dec!(80), dec!(90), dec!(100)]).is_err());
        assert!(ZoneBoundaryConfig::new([dec!(60), dec!(70), dec!(80), dec!(90), dec!(105)]).is_err());

        // Wrong length through the serde path
        let short: Result<ZoneBoundaryConfig, _> = vec![dec!(60), dec!(70)].try_into();
        assert!(short.is_err());
    }

    #[test]
    fn test_zone_target_labels() {
        let generic = ZoneTarget { low_zone: 2, high_zone: 2, bpm: None };
        assert_eq!(generic.label(), "Zone 2");

        let tempo = ZoneTarget { low_zone: 3, high_zone: 4, bpm: Some((151, 177)) };
        assert_eq!(tempo.label(), "Zone 3-4 (151-177 bpm)");
    }
}
