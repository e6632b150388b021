use std::collections::BTreeSet;

use crate::lattice::{Coord, Lattice};
use crate::neighbors::neighbors;

/// Partition of the occupied set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Boundary {
    /// Occupied with all four axis neighbors in scope and occupied.
    pub interior: BTreeSet<Coord>,
    /// Occupied with at least one neighbor unoccupied or out of scope.
    pub frontier: BTreeSet<Coord>,
}

impl Boundary {
    pub fn len(&self) -> usize {
        self.interior.len() + self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interior.is_empty() && self.frontier.is_empty()
    }
}

pub fn classify(lattice: &Lattice) -> Boundary {
    let mut boundary = Boundary::default();
    for coord in lattice.occupied_coords() {
        if neighbors(lattice, coord).all_occupied() {
            boundary.interior.insert(coord);
        } else {
            boundary.frontier.insert(coord);
        }
    }
    boundary
}
