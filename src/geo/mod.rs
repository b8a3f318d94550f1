//! Geospatial helpers: the country coordinate table and globe projection.

pub mod coordinates;
pub mod globe;

pub use coordinates::{coordinates, Coordinates};
pub use globe::{globe_markers, project_to_sphere, GlobeConfig, GlobeMarker, Vec3};
