use rand::Rng;

use crate::config::{GrowthParams, ParameterError};
use crate::growth::step_epoch;
use crate::lattice::Lattice;
use crate::metrics::EpochStats;

/// A single growth run: a seeded lattice plus the random stream that grows it.
pub struct Simulation<R> {
    lattice: Lattice,
    params: GrowthParams,
    rng: R,
    epoch: u32,
}

impl<R: Rng> Simulation<R> {
    /// Validate `params`, allocate the scan region and seed the origin.
    pub fn new(params: GrowthParams, rng: R) -> Result<Self, ParameterError> {
        let half_extent = params.half_extent()?;
        Ok(Self {
            lattice: Lattice::seeded(half_extent),
            params,
            rng,
            epoch: 0,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    /// Epochs applied so far.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn is_finished(&self) -> bool {
        self.epoch >= self.params.epochs
    }

    /// Apply the next epoch, or return `None` once all epochs have run.
    pub fn step(&mut self) -> Option<EpochStats> {
        if self.is_finished() {
            return None;
        }
        let newly_occupied = step_epoch(&mut self.lattice, self.params.probability, &mut self.rng);
        self.epoch += 1;
        let stats = EpochStats {
            epoch: self.epoch,
            occupied: self.lattice.occupied_count(),
            newly_occupied,
        };
        tracing::debug!(
            epoch = stats.epoch,
            occupied = stats.occupied,
            newly_occupied = stats.newly_occupied,
            "epoch complete"
        );
        Some(stats)
    }

    /// Run the remaining epochs and return the final lattice.
    pub fn run(mut self) -> Lattice {
        while self.step().is_some() {}
        tracing::info!(
            epochs = self.epoch,
            probability = self.params.probability,
            occupied = self.lattice.occupied_count(),
            half_extent = self.lattice.half_extent(),
            "growth run complete"
        );
        self.lattice
    }
}

/// Grow a lattice for `epochs` epochs with the default scan policy.
pub fn run<R: Rng + ?Sized>(
    epochs: u32,
    probability: f64,
    rng: &mut R,
) -> Result<Lattice, ParameterError> {
    run_with(GrowthParams::new(epochs, probability), rng)
}

pub fn run_with<R: Rng + ?Sized>(
    params: GrowthParams,
    rng: &mut R,
) -> Result<Lattice, ParameterError> {
    Ok(Simulation::new(params, rng)?.run())
}
