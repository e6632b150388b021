//! Eden growth on the integer lattice.
//!
//! A cluster grows from the origin: each epoch, every unoccupied cell joins
//! with one Bernoulli(`p`) chance per occupied axis neighbor. The grown
//! cluster is split into interior and frontier cells and bounded by an
//! inscribed and a circumscribed circle about the origin.

pub mod boundary;
pub mod config;
pub mod constants;
pub mod ensemble;
pub mod growth;
pub mod lattice;
pub mod metrics;
pub mod neighbors;
pub mod radius;
pub mod rng;
pub mod simulation;

pub use boundary::{classify, Boundary};
pub use config::{EdenConfig, GrowthParams, ParameterError, ScanPolicy};
pub use lattice::{Cell, Coord, Lattice, LatticeError};
pub use metrics::{EnsembleSummary, EpochStats, GrowthCurve, LatticeSnapshot};
pub use radius::{estimate_radii, Radii, RadiusError};
pub use simulation::{run, run_with, Simulation};
