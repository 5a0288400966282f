use crate::error::{Result, ValidationError};
use crate::models::{HeartRateZone, HeartRateZones, WorkoutType, ZoneBoundaryConfig, ZoneTarget};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed HRR fractions at the zone boundaries in automatic mode
const AUTOMATIC_BOUNDARIES: [Decimal; 6] = [
    dec!(0.5),
    dec!(0.6),
    dec!(0.7),
    dec!(0.8),
    dec!(0.9),
    dec!(1.0),
];

/// Heart rate zone calculation modes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "boundaries")]
pub enum ZoneMode {
    /// Karvonen zones at 50/60/70/80/90/100% of heart rate reserve
    #[default]
    Automatic,
    /// Zone upper bounds taken from a validated boundary config
    Manual(ZoneBoundaryConfig),
}

impl ZoneMode {
    /// Boundary fractions of heart rate reserve, zone 1 lower bound first
    fn boundaries(&self) -> [Decimal; 6] {
        match self {
            ZoneMode::Automatic => AUTOMATIC_BOUNDARIES,
            ZoneMode::Manual(config) => {
                let mut bounds = [ZoneBoundaryConfig::FLOOR_PERCENT / dec!(100); 6];
                for (i, pct) in config.upper_percentages().iter().enumerate() {
                    bounds[i + 1] = *pct / dec!(100);
                }
                bounds
            }
        }
    }
}

/// Zone calculation utilities
pub struct ZoneCalculator;

impl ZoneCalculator {
    /// Calculate five heart rate zones with the Karvonen formula
    ///
    /// Returns `Ok(None)` when either heart rate is missing. Each boundary is
    /// `round(hr_rest + reserve * fraction)`, so adjacent zones share their
    /// boundary value.
    pub fn compute_zones(
        hr_max: Option<u16>,
        hr_rest: Option<u16>,
        mode: &ZoneMode,
    ) -> Result<Option<HeartRateZones>> {
        let (max, rest) = match (hr_max, hr_rest) {
            (Some(max), Some(rest)) => (max, rest),
            _ => return Ok(None),
        };

        Self::validate_heart_rates(max, rest)?;

        let reserve = Decimal::from(max - rest);
        let rest_decimal = Decimal::from(rest);
        let bounds = mode.boundaries();

        let mut bpm = [0u16; 6];
        for (slot, fraction) in bpm.iter_mut().zip(bounds.iter()) {
            *slot = Self::karvonen(rest_decimal, reserve, *fraction);
        }

        let zones = HeartRateZones {
            zones: std::array::from_fn(|k| HeartRateZone {
                min: bpm[k],
                max: bpm[k + 1],
            }),
        };

        debug!(hr_max = max, hr_rest = rest, ?mode, ?zones, "Computed heart rate zones");

        Ok(Some(zones))
    }

    /// Determine which zone (1-5) a heart rate falls into
    pub fn zone_for(hr: u16, zones: &HeartRateZones) -> u8 {
        zones
            .iter()
            .find(|(_, zone)| hr <= zone.max)
            .map(|(number, _)| number)
            .unwrap_or(5)
    }

    /// Heart rate target for a workout type
    ///
    /// - LSD / Easy: zone 2
    /// - Tempo: zones 3-4
    /// - Interval: zones 4-5
    pub fn target_for(workout_type: WorkoutType, zones: Option<&HeartRateZones>) -> ZoneTarget {
        let (low_zone, high_zone) = match workout_type {
            WorkoutType::Lsd | WorkoutType::Easy => (2, 2),
            WorkoutType::Tempo => (3, 4),
            WorkoutType::Interval => (4, 5),
        };

        ZoneTarget {
            low_zone,
            high_zone,
            bpm: zones.map(|z| (z.zone(low_zone).min, z.zone(high_zone).max)),
        }
    }

    fn karvonen(rest: Decimal, reserve: Decimal, fraction: Decimal) -> u16 {
        (rest + reserve * fraction)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u16()
            .unwrap_or(u16::MAX)
    }

    fn validate_heart_rates(hr_max: u16, hr_rest: u16) -> std::result::Result<(), ValidationError> {
        if hr_rest == 0 {
            return Err(ValidationError::NotPositive {
                field: "profile.hr_rest".to_string(),
                value: hr_rest.to_string(),
            });
        }
        if hr_max <= hr_rest {
            return Err(ValidationError::HeartRateOrder { hr_max, hr_rest });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automatic(hr_max: u16, hr_rest: u16) -> HeartRateZones {
        ZoneCalculator::compute_zones(Some(hr_max), Some(hr_rest), &ZoneMode::Automatic)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_automatic_zones() {
        let zones = automatic(190, 60);

        // Reserve 130
        assert_eq!(zones.zone(1), HeartRateZone { min: 125, max: 138 }); // 60+65, 60+78
        assert_eq!(zones.zone(2), HeartRateZone { min: 138, max: 151 });
        assert_eq!(zones.zone(3), HeartRateZone { min: 151, max: 164 });
        assert_eq!(zones.zone(4), HeartRateZone { min: 164, max: 177 });
        assert_eq!(zones.zone(5), HeartRateZone { min: 177, max: 190 });
    }

    #[test]
    fn test_half_bpm_rounds_up() {
        // Reserve 121: 50% lands on 60.5 above rest
        let zones = automatic(181, 60);
        assert_eq!(zones.zone(1).min, 121); // 120.5 -> 121
        assert_eq!(zones.zone(5).max, 181);
    }

    #[test]
    fn test_manual_zones() {
        let config =
            ZoneBoundaryConfig::new([dec!(65), dec!(75), dec!(82), dec!(89), dec!(95)]).unwrap();
        let zones = ZoneCalculator::compute_zones(Some(190), Some(60), &ZoneMode::Manual(config))
            .unwrap()
            .unwrap();

        assert_eq!(zones.zone(1), HeartRateZone { min: 125, max: 145 }); // 50% .. 65% (144.5)
        assert_eq!(zones.zone(2).min, zones.zone(1).max);
        assert_eq!(zones.zone(5).max, 184); // 60 + 123.5
    }

    #[test]
    fn test_manual_default_matches_automatic() {
        let manual = ZoneCalculator::compute_zones(
            Some(185),
            Some(52),
            &ZoneMode::Manual(ZoneBoundaryConfig::default()),
        )
        .unwrap();
        let auto = ZoneCalculator::compute_zones(Some(185), Some(52), &ZoneMode::Automatic).unwrap();
        assert_eq!(manual, auto);
    }

    #[test]
    fn test_missing_heart_rate_yields_none() {
        assert!(ZoneCalculator::compute_zones(None, Some(60), &ZoneMode::Automatic)
            .unwrap()
            .is_none());
        assert!(ZoneCalculator::compute_zones(Some(190), None, &ZoneMode::Automatic)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_heart_rate_order() {
        assert!(ZoneCalculator::compute_zones(Some(60), Some(60), &ZoneMode::Automatic).is_err());
        assert!(ZoneCalculator::compute_zones(Some(150), Some(170), &ZoneMode::Automatic).is_err());
        assert!(ZoneCalculator::compute_zones(Some(150), Some(0), &ZoneMode::Automatic).is_err());
    }

    #[test]
    fn test_zone_detection() {
        let zones = automatic(190, 60);

        assert_eq!(ZoneCalculator::zone_for(110, &zones), 1);
        assert_eq!(ZoneCalculator::zone_for(138, &zones), 1);
        assert_eq!(ZoneCalculator::zone_for(145, &zones), 2);
        assert_eq!(ZoneCalculator::zone_for(160, &zones), 3);
        assert_eq!(ZoneCalculator::zone_for(170, &zones), 4);
        assert_eq!(ZoneCalculator::zone_for(185, &zones), 5);
        assert_eq!(ZoneCalculator::zone_for(200, &zones), 5);
    }

    #[test]
    fn test_workout_targets() {
        let zones = automatic(190, 60);

        let easy = ZoneCalculator::target_for(WorkoutType::Easy, Some(&zones));
        assert_eq!(easy.bpm, Some((138, 151)));

        let tempo = ZoneCalculator::target_for(WorkoutType::Tempo, Some(&zones));
        assert_eq!(tempo.label(), "Zone 3-4 (151-177 bpm)");

        let interval = ZoneCalculator::target_for(WorkoutType::Interval, None);
        assert_eq!(interval.label(), "Zone 4-5");
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_zones_contiguous(
            hr_rest in 35u16..90u16,
            spread in 2u16..140u16,
        ) {
            let hr_max = hr_rest + spread;
            let zones = automatic(hr_max, hr_rest);

            for k in 1..5u8 {
                prop_assert_eq!(zones.zone(k).max, zones.zone(k + 1).min);
            }
            for (_, zone) in zones.iter() {
                prop_assert!(zone.min <= zone.max);
            }
            prop_assert!(zones.zone(1).min < zones.zone(5).max);
            prop_assert_eq!(zones.zone(5).max, hr_max);
        }
    }
}
