use serde::{Deserialize, Serialize};

use crate::boundary::Boundary;
use crate::config::EdenConfig;
use crate::lattice::Coord;
use crate::radius::Radii;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpochStats {
    /// 1-based index of the epoch just applied.
    pub epoch: u32,
    pub occupied: usize,
    pub newly_occupied: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EnsembleSummary {
    pub epochs: u32,
    pub trials: u32,
    pub inscribed_mean: f64,
    pub circumscribed_mean: f64,
    /// `inscribed_mean / circumscribed_mean`.
    pub eccentricity: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrowthCurve {
    pub probability: f64,
    pub points: Vec<EnsembleSummary>,
}

fn default_schema_version() -> u32 {
    1
}

/// Everything a plotter needs to draw one grown cluster and its bounding circles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatticeSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub epochs: u32,
    pub probability: f64,
    pub half_extent: u32,
    pub radii: Radii,
    pub frontier: Vec<Coord>,
    pub interior: Vec<Coord>,
}

impl LatticeSnapshot {
    pub fn new(config: &EdenConfig, half_extent: u32, boundary: Boundary, radii: Radii) -> Self {
        Self {
            schema_version: default_schema_version(),
            seed: config.seed,
            epochs: config.epochs,
            probability: config.probability,
            half_extent,
            radii,
            frontier: boundary.frontier.into_iter().collect(),
            interior: boundary.interior.into_iter().collect(),
        }
    }
}
