//! Input boundary: raw form values in, typed planner inputs out
//!
//! Presentation layers collect numbers as text or loosely typed values. Every
//! field is parsed and checked here once, so the engine never sees a missing
//! or non-numeric value. Errors name the offending field (`goal.prep_weeks`).

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PlannerError, Result, ValidationError};
use crate::models::{to_seconds, Gender, Goal, PerformanceRecord, RunnerProfile};

type FieldResult<T> = std::result::Result<T, ValidationError>;

const MIN_DAYS_PER_WEEK: u32 = 3;
const MAX_DAYS_PER_WEEK: u32 = 6;
const MAX_HOURS: u32 = 99;

/// Longest preparation window accepted, two years
pub const MAX_PREP_WEEKS: u32 = 104;

/// Ceiling for every distance field, race and weekly volume alike
pub const MAX_DISTANCE_KM: Decimal = dec!(1000);

/// A raw field value: a number, or text still to be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    /// Parse to a decimal; blank text yields `Ok(None)`
    pub fn to_decimal(&self, field: &str) -> FieldResult<Option<Decimal>> {
        match self {
            FormValue::Number(n) => {
                let text = n.to_string();
                if !n.is_finite() {
                    return Err(not_a_number(field, text));
                }
                Decimal::from_str(&text)
                    .map(Some)
                    .map_err(|_| not_a_number(field, text))
            }
            FormValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                Decimal::from_str(trimmed)
                    .map(Some)
                    .map_err(|_| not_a_number(field, trimmed.to_string()))
            }
        }
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<u32> for FormValue {
    fn from(value: u32) -> Self {
        FormValue::Number(value as f64)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

/// Runner profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub age: Option<FormValue>,
    pub gender: Option<String>,
    pub hr_max: Option<FormValue>,
    pub hr_rest: Option<FormValue>,
}

impl ProfileForm {
    pub fn validate(&self) -> FieldResult<RunnerProfile> {
        let profile = RunnerProfile {
            age: positive_whole("profile.age", &self.age, u8::MAX as u32)?.map(|v| v as u8),
            gender: parse_gender(self.gender.as_deref())?,
            hr_max: positive_whole("profile.hr_max", &self.hr_max, u16::MAX as u32)?.map(|v| v as u16),
            hr_rest: positive_whole("profile.hr_rest", &self.hr_rest, u16::MAX as u32)?.map(|v| v as u16),
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Recent performance fields, with the time split into h/m/s
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceForm {
    pub distance_km: Option<FormValue>,
    pub hours: Option<FormValue>,
    pub minutes: Option<FormValue>,
    pub seconds: Option<FormValue>,
    pub average_heart_rate: Option<FormValue>,
    pub is_race: Option<bool>,
}

impl PerformanceForm {
    pub fn validate(&self) -> FieldResult<PerformanceRecord> {
        let distance_km = positive_decimal("performance.distance_km", &self.distance_km)?;
        let hours = whole_in_range("performance.hours", &self.hours, 0, MAX_HOURS)?.unwrap_or(0);
        let minutes = whole_in_range("performance.minutes", &self.minutes, 0, 59)?.unwrap_or(0);
        let seconds = whole_in_range("performance.seconds", &self.seconds, 0, 59)?.unwrap_or(0);

        let record = PerformanceRecord {
            distance_km,
            elapsed_seconds: to_seconds(hours, minutes, seconds),
            average_heart_rate: positive_whole(
                "performance.average_heart_rate",
                &self.average_heart_rate,
                u16::MAX as u32,
            )?
            .map(|v| v as u16),
            is_race: self.is_race.unwrap_or(true),
        };
        record.validate()?;
        Ok(record)
    }
}

/// Goal fields; a blank target time asks for a suggested one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalForm {
    pub distance_km: Option<FormValue>,
    pub target_hours: Option<FormValue>,
    pub target_minutes: Option<FormValue>,
    pub target_seconds: Option<FormValue>,
    pub prep_weeks: Option<FormValue>,
    pub days_per_week: Option<FormValue>,
    pub max_weekly_km: Option<FormValue>,
    pub race_date: Option<String>,
}

impl GoalForm {
    pub fn validate(&self) -> FieldResult<Goal> {
        let distance_km = positive_decimal("goal.distance_km", &self.distance_km)?;

        let hours = whole_in_range("goal.target_hours", &self.target_hours, 0, MAX_HOURS)?.unwrap_or(0);
        let minutes = whole_in_range("goal.target_minutes", &self.target_minutes, 0, 59)?.unwrap_or(0);
        let seconds = whole_in_range("goal.target_seconds", &self.target_seconds, 0, 59)?.unwrap_or(0);
        let total = to_seconds(hours, minutes, seconds);

        let prep_weeks = positive_whole("goal.prep_weeks", &self.prep_weeks, MAX_PREP_WEEKS)?
            .ok_or_else(|| missing("goal.prep_weeks"))?;
        let days_per_week = whole_in_range(
            "goal.days_per_week",
            &self.days_per_week,
            MIN_DAYS_PER_WEEK,
            MAX_DAYS_PER_WEEK,
        )?
        .ok_or_else(|| missing("goal.days_per_week"))?;

        let goal = Goal {
            distance_km,
            target_time_seconds: (total > 0).then_some(total),
            prep_weeks,
            days_per_week: days_per_week as u8,
            max_weekly_km: positive_decimal("goal.max_weekly_km", &self.max_weekly_km)?,
            race_date: parse_date("goal.race_date", self.race_date.as_deref())?,
        };
        goal.validate()?;
        Ok(goal)
    }
}

impl RunnerProfile {
    /// Heart rates must be positive, and max above rest when both are known
    pub fn validate(&self) -> FieldResult<()> {
        if self.hr_max == Some(0) {
            return Err(not_positive("profile.hr_max", 0));
        }
        if self.hr_rest == Some(0) {
            return Err(not_positive("profile.hr_rest", 0));
        }
        if let (Some(hr_max), Some(hr_rest)) = (self.hr_max, self.hr_rest) {
            if hr_max <= hr_rest {
                return Err(ValidationError::HeartRateOrder { hr_max, hr_rest });
            }
        }
        Ok(())
    }
}

impl PerformanceRecord {
    pub fn validate(&self) -> FieldResult<()> {
        check_distance("performance.distance_km", self.distance_km)?;
        if self.elapsed_seconds == 0 {
            return Err(not_positive("performance.elapsed_seconds", 0));
        }
        Ok(())
    }
}

impl Goal {
    pub fn validate(&self) -> FieldResult<()> {
        check_distance("goal.distance_km", self.distance_km)?;
        if self.target_time_seconds == Some(0) {
            return Err(not_positive("goal.target_time_seconds", 0));
        }
        if self.prep_weeks == 0 {
            return Err(not_positive("goal.prep_weeks", 0));
        }
        if self.prep_weeks > MAX_PREP_WEEKS {
            return Err(out_of_range("goal.prep_weeks", 1, MAX_PREP_WEEKS, self.prep_weeks));
        }
        let days = self.days_per_week as u32;
        if !(MIN_DAYS_PER_WEEK..=MAX_DAYS_PER_WEEK).contains(&days) {
            return Err(out_of_range("goal.days_per_week", MIN_DAYS_PER_WEEK, MAX_DAYS_PER_WEEK, days));
        }
        check_distance("goal.max_weekly_km", self.max_weekly_km)?;
        Ok(())
    }
}

/// Typed inputs for one generate call
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInputs {
    pub profile: RunnerProfile,
    pub performance: PerformanceRecord,
    pub goal: Goal,
}

/// The three input forms together, as read from a scenario file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub profile: ProfileForm,
    pub performance: PerformanceForm,
    pub goal: GoalForm,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlannerError::Serialization(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| PlannerError::Serialization(e.to_string()))
    }

    /// Load a scenario file; `.json` files are read as JSON, anything else as TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Validate profile, then performance, then goal; the first failure wins
    pub fn validate(&self) -> FieldResult<PlanInputs> {
        Ok(PlanInputs {
            profile: self.profile.validate()?,
            performance: self.performance.validate()?,
            goal: self.goal.validate()?,
        })
    }
}

fn optional_decimal(field: &str, value: &Option<FormValue>) -> FieldResult<Option<Decimal>> {
    match value {
        Some(v) => v.to_decimal(field),
        None => Ok(None),
    }
}

fn positive_decimal(field: &str, value: &Option<FormValue>) -> FieldResult<Decimal> {
    let number = optional_decimal(field, value)?.ok_or_else(|| missing(field))?;
    if number <= Decimal::ZERO {
        return Err(not_positive(field, number));
    }
    Ok(number)
}

fn whole_in_range(field: &str, value: &Option<FormValue>, min: u32, max: u32) -> FieldResult<Option<u32>> {
    let Some(number) = optional_decimal(field, value)? else {
        return Ok(None);
    };
    if !number.fract().is_zero() {
        return Err(ValidationError::Malformed {
            field: field.to_string(),
            value: number.to_string(),
            expected: "a whole number".to_string(),
        });
    }
    match number.to_u32() {
        Some(whole) if (min..=max).contains(&whole) => Ok(Some(whole)),
        _ => Err(out_of_range(field, min, max, number)),
    }
}

fn positive_whole(field: &str, value: &Option<FormValue>, max: u32) -> FieldResult<Option<u32>> {
    match optional_decimal(field, value)? {
        Some(number) if number <= Decimal::ZERO => Err(not_positive(field, number)),
        _ => whole_in_range(field, value, 1, max),
    }
}

fn check_distance(field: &str, km: Decimal) -> FieldResult<()> {
    if km <= Decimal::ZERO {
        return Err(not_positive(field, km));
    }
    if km > MAX_DISTANCE_KM {
        return Err(out_of_range(field, "0", MAX_DISTANCE_KM, km));
    }
    Ok(())
}

fn parse_gender(value: Option<&str>) -> FieldResult<Gender> {
    match value.map(str::trim).map(str::to_lowercase).as_deref() {
        None | Some("") => Ok(Gender::default()),
        Some("male") => Ok(Gender::Male),
        Some("female") => Ok(Gender::Female),
        Some(other) => Err(ValidationError::Malformed {
            field: "profile.gender".to_string(),
            value: other.to_string(),
            expected: "'male' or 'female'".to_string(),
        }),
    }
}

fn parse_date(field: &str, value: Option<&str>) -> FieldResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::Malformed {
                field: field.to_string(),
                value: text.to_string(),
                expected: "a date in YYYY-MM-DD form".to_string(),
            }),
    }
}

fn missing(field: &str) -> ValidationError {
    ValidationError::Missing {
        field: field.to_string(),
    }
}

fn not_a_number(field: &str, value: String) -> ValidationError {
    ValidationError::NotANumber {
        field: field.to_string(),
        value,
    }
}

fn not_positive(field: &str, value: impl ToString) -> ValidationError {
    ValidationError::NotPositive {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn out_of_range(field: &str, min: impl ToString, max: impl ToString, value: impl ToString) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: min.to_string(),
        max: max.to_string(),
        value: value.to_string(),
    }
}
