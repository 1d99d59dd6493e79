//! Synthetic historical pollution dataset.
//!
//! Shape is fixed (years × months × days × hours per city, fixed multiplier
//! tables); values are perturbed with uniform noise. A seed makes a run
//! reproducible; without one the generator draws from OS entropy.

use core::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use smartair_core::City;

/// Years covered by the dataset (and by yearly predictions).
pub const YEARS: RangeInclusive<i32> = 2021..=2028;

/// Days generated per month.
pub const DAYS_PER_MONTH: u32 = 28;

/// Seasonal multiplier per month (index 0 = January).
pub const SEASONAL_FACTORS: [f64; 12] = [1.4, 1.3, 1.2, 1.1, 1.0, 0.9, 0.8, 0.8, 0.9, 1.1, 1.3, 1.4];

/// Number of model input features.
pub const FEATURE_COUNT: usize = 9;

/// Model input features, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "year",
    "month",
    "day",
    "hour",
    "temperature",
    "humidity",
    "wind_speed",
    "industrial_index",
    "traffic_index",
];

/// One model input row, ordered as [`FEATURE_NAMES`].
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Lowest hourly pollution value ever generated.
const POLLUTION_FLOOR: f64 = 20.0;

/// Traffic pattern of an hour of the day.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HourProfile {
    /// 8, 9, 17 and 18 o'clock.
    Rush,
    /// Midnight to 5 o'clock.
    Night,
    Regular,
}

impl HourProfile {
    pub fn of(hour: u32) -> Self {
        match hour {
            8 | 9 | 17 | 18 => HourProfile::Rush,
            0..=5 => HourProfile::Night,
            _ => HourProfile::Regular,
        }
    }

    /// Multiplier applied to the daily pollution level.
    pub fn pollution_factor(&self) -> f64 {
        match self {
            HourProfile::Rush => 1.3,
            HourProfile::Night => 0.7,
            HourProfile::Regular => 1.0,
        }
    }
}

/// A generated (not observed) hourly measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSample {
    pub city: City,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub pollution: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub industrial_index: f64,
    pub traffic_index: f64,
}

impl HistoricalSample {
    pub fn features(&self) -> FeatureVector {
        [
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day),
            f64::from(self.hour),
            self.temperature,
            self.humidity,
            self.wind_speed,
            self.industrial_index,
            self.traffic_index,
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticDataGenerator {
    seed: Option<u64>,
}

impl SyntheticDataGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Generate the full dataset for every supported city.
    pub fn generate(&self) -> Vec<HistoricalSample> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut samples = Vec::with_capacity(City::ALL.len() * Self::samples_per_city());
        for city in City::ALL {
            generate_city(city, &mut rng, &mut samples);
        }
        samples
    }

    /// Rows produced per city.
    pub fn samples_per_city() -> usize {
        let years = (YEARS.end() - YEARS.start() + 1) as usize;
        years * SEASONAL_FACTORS.len() * DAYS_PER_MONTH as usize * 24
    }
}

fn generate_city<R: Rng>(city: City, rng: &mut R, out: &mut Vec<HistoricalSample>) {
    let (lo, hi) = city.pollution_bounds();

    for year in YEARS {
        let year_factor = 1.0 - f64::from(year - YEARS.start()) * 0.02;

        for (month_idx, seasonal) in SEASONAL_FACTORS.iter().enumerate() {
            let month = month_idx as u32 + 1;
            let monthly = (city.base_pollution() * year_factor * seasonal
                + rng.gen_range(-10.0..=10.0))
            .clamp(lo, hi);

            for day in 1..=DAYS_PER_MONTH {
                let daily_factor = 1.0 + f64::from(day % 7) * 0.1;
                let daily = monthly * daily_factor + rng.gen_range(-15.0..=15.0);

                for hour in 0..24 {
                    let hourly = daily * HourProfile::of(hour).pollution_factor()
                        + rng.gen_range(-10.0..=10.0);

                    out.push(HistoricalSample {
                        city,
                        year,
                        month,
                        day,
                        hour,
                        pollution: hourly.max(POLLUTION_FLOOR),
                        temperature: rng.gen_range(15.0..=35.0),
                        humidity: rng.gen_range(40.0..=90.0),
                        wind_speed: rng.gen_range(5.0..=25.0),
                        industrial_index: rng.gen_range(0.5..=1.5),
                        traffic_index: rng.gen_range(0.5..=1.5),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_covers_every_axis_for_both_cities() {
        let samples = SyntheticDataGenerator::new().with_seed(7).generate();
        assert_eq!(samples.len(), 2 * 8 * 12 * 28 * 24);

        for city in City::ALL {
            let rows: Vec<_> = samples.iter().filter(|s| s.city == city).collect();
            assert_eq!(rows.len(), SyntheticDataGenerator::samples_per_city());
            assert_eq!(rows.first().map(|s| (s.year, s.month, s.day, s.hour)), Some((2021, 1, 1, 0)));
            assert_eq!(rows.last().map(|s| (s.year, s.month, s.day, s.hour)), Some((2028, 12, 28, 23)));
        }
    }

    #[test]
    fn values_stay_within_generation_bounds() {
        let samples = SyntheticDataGenerator::new().with_seed(11).generate();

        for s in &samples {
            assert!(s.pollution >= POLLUTION_FLOOR);
            assert!((15.0..=35.0).contains(&s.temperature));
            assert!((40.0..=90.0).contains(&s.humidity));
            assert!((5.0..=25.0).contains(&s.wind_speed));
            assert!((0.5..=1.5).contains(&s.industrial_index));
            assert!((0.5..=1.5).contains(&s.traffic_index));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = SyntheticDataGenerator::new().with_seed(42).generate();
        let b = SyntheticDataGenerator::new().with_seed(42).generate();
        assert_eq!(a[..100], b[..100]);
        assert_eq!(a.last(), b.last());
    }

    #[test]
    fn delhi_is_more_polluted_than_mumbai_on_average() {
        let samples = SyntheticDataGenerator::new().with_seed(3).generate();
        let mean = |city: City| {
            let rows: Vec<f64> = samples.iter().filter(|s| s.city == city).map(|s| s.pollution).collect();
            rows.iter().sum::<f64>() / rows.len() as f64
        };
        assert!(mean(City::Delhi) > mean(City::Mumbai));
    }

    #[test]
    fn hour_profiles_follow_fixed_sets() {
        for hour in [8, 9, 17, 18] {
            assert_eq!(HourProfile::of(hour), HourProfile::Rush);
        }
        for hour in 0..=5 {
            assert_eq!(HourProfile::of(hour), HourProfile::Night);
        }
        for hour in [6, 7, 10, 12, 16, 19, 23] {
            assert_eq!(HourProfile::of(hour), HourProfile::Regular);
        }
    }

    #[test]
    fn features_follow_declared_order() {
        let sample = HistoricalSample {
            city: City::Mumbai,
            year: 2024,
            month: 3,
            day: 9,
            hour: 17,
            pollution: 99.0,
            temperature: 30.0,
            humidity: 55.0,
            wind_speed: 12.0,
            industrial_index: 1.1,
            traffic_index: 0.9,
        };
        assert_eq!(sample.features(), [2024.0, 3.0, 9.0, 17.0, 30.0, 55.0, 12.0, 1.1, 0.9]);
    }
}
