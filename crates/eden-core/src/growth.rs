use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::lattice::{Cell, Lattice};
use crate::neighbors::{neighbors, Neighbor, Neighborhood};
use crate::rng::derive_stream;

/// Chance that an unoccupied cell with `occupied_neighbors` occupied neighbors joins in one epoch.
pub fn occupation_probability(occupied_neighbors: usize, probability: f64) -> f64 {
    1.0 - (1.0 - probability).powi(occupied_neighbors as i32)
}

/// One Bernoulli(`probability`) draw per occupied neighbor; the first success wins.
/// Unknown and unoccupied neighbors draw nothing.
pub fn occupation_trial<R: Rng + ?Sized>(
    hood: Neighborhood,
    probability: f64,
    rng: &mut R,
) -> bool {
    hood.to_array()
        .into_iter()
        .filter(|&n| n == Neighbor::Occupied)
        .any(|_| rng.random::<f64>() < probability)
}

/// Apply one growth epoch and return the number of newly occupied cells.
///
/// Neighbor lookups read the lattice as it stood when the epoch began; results
/// go to a separate buffer that replaces the cells once the scan is complete,
/// so a cell occupied this epoch cannot seed its neighbors until the next one.
/// Each row draws from its own stream derived from a single epoch seed taken
/// from `rng`, which makes the result independent of row processing order.
pub fn step_epoch<R: Rng + ?Sized>(lattice: &mut Lattice, probability: f64, rng: &mut R) -> usize {
    let epoch_seed: u64 = rng.random();
    let width = lattice.width();
    let before = lattice.occupied_count();
    let mut next = lattice.cells().to_vec();
    {
        let snapshot: &Lattice = lattice;
        let update_row = |(row, out): (usize, &mut [Cell])| {
            let mut row_rng = derive_stream(epoch_seed, row as u64);
            for (col, cell) in out.iter_mut().enumerate() {
                if cell.is_occupied() {
                    continue;
                }
                let coord = snapshot.coord_at(row * width + col);
                if occupation_trial(neighbors(snapshot, coord), probability, &mut row_rng) {
                    *cell = Cell::Occupied;
                }
            }
        };

        #[cfg(feature = "parallel")]
        next.par_chunks_mut(width).enumerate().for_each(update_row);
        #[cfg(not(feature = "parallel"))]
        next.chunks_mut(width).enumerate().for_each(update_row);
    }
    lattice.replace_cells(next);
    lattice.occupied_count() - before
}
