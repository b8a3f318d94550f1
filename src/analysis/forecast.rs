//! Fixed-parameter exponential projection.
//!
//! The model is not fitted to the history: it anchors on the last observed
//! day and compounds fixed daily growth rates from there, with a flat
//! ±10% band around projected cases.

use crate::models::{DailyPoint, ForecastPoint};
use chrono::Days;
use serde::{Deserialize, Serialize};

/// Horizon used by the dashboard.
pub const DEFAULT_HORIZON_DAYS: u32 = 90;

/// Growth constants of the projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    /// Daily compounded growth of cases.
    pub case_growth: f64,
    /// Daily compounded growth of deaths.
    pub death_growth: f64,
    /// Linear daily increase of vaccinations.
    pub daily_vaccinations: u64,
    /// Half-width of the case band, as a fraction of predicted cases.
    pub band: f64,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self {
            case_growth: 0.005,
            death_growth: 0.0025,
            daily_vaccinations: 50_000,
            band: 0.1,
        }
    }
}

impl ForecastModel {
    /// Project `horizon_days` days past the last point of `history`.
    ///
    /// Returns an empty vector for an empty history.
    pub fn project(&self, history: &[DailyPoint], horizon_days: u32) -> Vec<ForecastPoint> {
        let Some(last) = history.last() else {
            return Vec::new();
        };

        let cases = last.cases as f64;
        let deaths = last.deaths as f64;
        let vaccinated = last.vaccinated as f64;

        (1..=horizon_days)
            .map_while(|i| {
                let date = last.date.checked_add_days(Days::new(u64::from(i)))?;
                let step = f64::from(i);

                let predicted_cases = floor_count(cases * (1.0 + self.case_growth).powf(step));
                let predicted_deaths = floor_count(deaths * (1.0 + self.death_growth).powf(step));
                let predicted_vaccinated =
                    floor_count(vaccinated + step * self.daily_vaccinations as f64);

                Some(ForecastPoint {
                    date,
                    predicted_cases,
                    predicted_deaths,
                    predicted_vaccinated,
                    lower_bound: floor_count(predicted_cases as f64 * (1.0 - self.band)),
                    upper_bound: floor_count(predicted_cases as f64 * (1.0 + self.band)),
                })
            })
            .collect()
    }
}

/// Project with the default model.
pub fn forecast(history: &[DailyPoint], horizon_days: u32) -> Vec<ForecastPoint> {
    ForecastModel::default().project(history, horizon_days)
}

/// Floors a non-negative projection to a count.
///
/// The growth constants are decimal fractions with no exact binary form, so
/// a product that is integral in decimal (1000 × 1.005) comes out a few ulps
/// below the integer. Values within that rounding error of an integer snap
/// to it; genuine fractions still truncate.
pub fn floor_count(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let nearest = value.round();
    if (value - nearest).abs() <= value * SNAP_ULPS * f64::EPSILON {
        nearest as u64
    } else {
        value.floor() as u64
    }
}

/// Rounding error, in ulps, treated as an exact integer by [`floor_count`].
const SNAP_ULPS: f64 = 8.0;
