//! Marker placement on the globe.
//!
//! Countries are drawn as spheres sitting just above the globe surface.
//! Marker size and colour scale with the country's share of the largest
//! case count in the snapshot.

use super::coordinates::Coordinates;
use crate::models::CountrySummary;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A point in scene space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Scene parameters for marker placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Radius markers are placed at (the globe itself is 2.0).
    pub marker_radius: f64,
    /// Size of a marker for a country with no cases.
    pub min_marker_size: f64,
    /// Size added for the country with the most cases.
    pub marker_size_range: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            marker_radius: 2.05,
            min_marker_size: 0.05,
            marker_size_range: 0.15,
        }
    }
}

/// Everything a renderer needs to draw one country marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeMarker {
    pub country: String,
    pub position: Vec3,
    /// Cases relative to the largest country, in [0, 1].
    pub intensity: f64,
    pub size: f64,
    /// `#rrggbb`
    pub color: String,
    pub total_cases: u64,
}

/// Projects a latitude/longitude onto a sphere of the given radius.
///
/// Uses the scene convention where +y is north and longitude -180 lies on +x.
pub fn project_to_sphere(coords: Coordinates, radius: f64) -> Vec3 {
    let phi = (90.0 - coords.latitude) * (PI / 180.0);
    let theta = (coords.longitude + 180.0) * (PI / 180.0);

    Vec3 {
        x: -(radius * phi.sin() * theta.cos()),
        y: radius * phi.cos(),
        z: radius * phi.sin() * theta.sin(),
    }
}

/// Share of `max_cases` held by `cases`, 0 when the maximum is 0.
pub fn intensity(cases: u64, max_cases: u64) -> f64 {
    if max_cases == 0 {
        return 0.0;
    }
    (cases as f64 / max_cases as f64).clamp(0.0, 1.0)
}

/// Red hue that darkens as intensity rises.
pub fn marker_color(intensity: f64) -> String {
    hsl_to_hex(0.0, 1.0, 0.5 - intensity * 0.3)
}

/// Builds one marker per country, in the order given.
pub fn globe_markers(countries: &[CountrySummary], config: &GlobeConfig) -> Vec<GlobeMarker> {
    let max_cases = countries.iter().map(|c| c.total_cases).max().unwrap_or(0);

    countries
        .iter()
        .map(|country| {
            let intensity = intensity(country.total_cases, max_cases);
            let coords = Coordinates::new(country.latitude, country.longitude);
            GlobeMarker {
                country: country.country.clone(),
                position: project_to_sphere(coords, config.marker_radius),
                intensity,
                size: config.min_marker_size + intensity * config.marker_size_range,
                color: marker_color(intensity),
                total_cases: country.total_cases,
            }
        })
        .collect()
}

/// Converts HSL (hue in degrees, saturation and lightness in [0, 1]) to `#rrggbb`.
fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    let h = hue.rem_euclid(360.0) / 360.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    format!(
        "#{:02x}{:02x}{:02x}",
        to_byte(r),
        to_byte(g),
        to_byte(b)
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
