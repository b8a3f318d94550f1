//! Static country centroid table.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true for the (0,0) fallback used for unknown countries.
    pub fn is_origin(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Known country centroids, keyed by exact name.
pub const KNOWN_COUNTRIES: &[(&str, Coordinates)] = &[
    ("United States", Coordinates::new(37.0902, -95.7129)),
    ("India", Coordinates::new(20.5937, 78.9629)),
    ("Brazil", Coordinates::new(-14.2350, -51.9253)),
    ("United Kingdom", Coordinates::new(55.3781, -3.4360)),
    ("Russia", Coordinates::new(61.5240, 105.3188)),
    ("France", Coordinates::new(46.2276, 2.2137)),
    ("Germany", Coordinates::new(51.1657, 10.4515)),
    ("Italy", Coordinates::new(41.8719, 12.5674)),
    ("Spain", Coordinates::new(40.4637, -3.7492)),
    ("Canada", Coordinates::new(56.1304, -106.3468)),
];

/// Looks up a country's centroid. Unknown names resolve to (0,0).
pub fn coordinates(country: &str) -> Coordinates {
    KNOWN_COUNTRIES
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, coords)| *coords)
        .unwrap_or_default()
}
