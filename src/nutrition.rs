//! Race-day fueling and hydration dosing by predicted finish time

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::FuelPlan;

pub const GEL_CARBS_GRAMS: u32 = 25;
const SMALL_SERVING_ML: u32 = 100;
const SERVING_ML: u32 = 180;

/// Duration tiers, by finish time in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelTier {
    /// Under 30 minutes
    PreRaceOnly,
    /// 30 to 60 minutes
    SingleSip,
    /// 60 to 90 minutes
    Short,
    /// 90 to 150 minutes
    Medium,
    /// 150 minutes and beyond
    Long,
}

impl FuelTier {
    /// Lower bounds are inclusive: exactly 90 minutes is `Medium`
    pub fn from_minutes(minutes: Decimal) -> Self {
        if minutes < dec!(30) {
            FuelTier::PreRaceOnly
        } else if minutes < dec!(60) {
            FuelTier::SingleSip
        } else if minutes < dec!(90) {
            FuelTier::Short
        } else if minutes < dec!(150) {
            FuelTier::Medium
        } else {
            FuelTier::Long
        }
    }

    fn guidance(&self) -> &'static [&'static str] {
        match self {
            FuelTier::PreRaceOnly => &[
                "No on-course fueling needed.",
                "Eat a light carbohydrate snack 60-90 minutes before the start.",
            ],
            FuelTier::SingleSip => &[
                "Take one small sip of water (about 100 ml) around halfway.",
                "No gels needed; start the race well fueled.",
            ],
            FuelTier::Short => &[
                "Drink about 180 ml every 20-25 minutes.",
                "Take one gel (25 g carbohydrate) around the midpoint.",
            ],
            FuelTier::Medium => &[
                "Drink about 180 ml roughly every 20 minutes.",
                "Take a gel (25 g carbohydrate) every 30-35 minutes, starting around 30 minutes in.",
            ],
            FuelTier::Long => &[
                "Drink about 180 ml every 15-20 minutes.",
                "Take a gel (25 g carbohydrate) every 30 minutes from the start.",
                "Add electrolytes at aid stations, especially in warm conditions.",
            ],
        }
    }
}

/// Maps a predicted finish time to a fueling schedule
pub struct NutritionStrategyAdvisor;

impl NutritionStrategyAdvisor {
    pub fn advise(predicted_finish_seconds: u32) -> FuelPlan {
        let minutes = Decimal::from(predicted_finish_seconds) / dec!(60);
        let tier = FuelTier::from_minutes(minutes);

        let (water_serving_count, water_per_serving_ml) = match tier {
            FuelTier::PreRaceOnly => (0, 0),
            FuelTier::SingleSip => (1, SMALL_SERVING_ML),
            FuelTier::Short => (ceil_div(minutes, dec!(23)), SERVING_ML),
            FuelTier::Medium => (ceil_div(minutes, dec!(20)), SERVING_ML),
            FuelTier::Long => (ceil_div(minutes, dec!(18)), SERVING_ML),
        };

        let gel_count = match tier {
            FuelTier::PreRaceOnly | FuelTier::SingleSip => 0,
            FuelTier::Short => 1,
            FuelTier::Medium => floor_div(minutes, dec!(33)),
            FuelTier::Long => floor_div(minutes, dec!(30)),
        };

        let guidance: Vec<String> = tier.guidance().iter().map(|line| line.to_string()).collect();

        debug!(
            minutes = %minutes.round_dp(1),
            ?tier,
            water_serving_count,
            gel_count,
            "Advised fuel plan"
        );

        FuelPlan {
            total_water_ml: water_serving_count * water_per_serving_ml,
            total_carbs_grams: gel_count * GEL_CARBS_GRAMS,
            gel_count,
            water_serving_count,
            water_per_serving_ml,
            carbs_per_gel_grams: GEL_CARBS_GRAMS,
            strategy: guidance.join(" "),
            guidance,
        }
    }
}

fn ceil_div(minutes: Decimal, per: Decimal) -> u32 {
    (minutes / per).ceil().to_u32().unwrap_or(0)
}

fn floor_div(minutes: Decimal, per: Decimal) -> u32 {
    (minutes / per).floor().to_u32().unwrap_or(0)
}
