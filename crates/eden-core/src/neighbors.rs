use crate::lattice::{Cell, Coord, Lattice};

/// State of a neighboring coordinate as seen from inside the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    Occupied,
    Unoccupied,
    /// Outside the scan region. Never counts as occupied or unoccupied.
    Unknown,
}

impl From<Option<Cell>> for Neighbor {
    fn from(cell: Option<Cell>) -> Self {
        match cell {
            Some(Cell::Occupied) => Neighbor::Occupied,
            Some(Cell::Unoccupied) => Neighbor::Unoccupied,
            None => Neighbor::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    pub right: Neighbor,
    pub top: Neighbor,
    pub left: Neighbor,
    pub bottom: Neighbor,
}

impl Neighborhood {
    /// (right, top, left, bottom)
    pub fn to_array(self) -> [Neighbor; 4] {
        [self.right, self.top, self.left, self.bottom]
    }

    pub fn occupied_count(self) -> usize {
        self.to_array()
            .iter()
            .filter(|&&n| n == Neighbor::Occupied)
            .count()
    }

    /// True only when all four neighbors are in scope and occupied.
    pub fn all_occupied(self) -> bool {
        self.to_array().iter().all(|&n| n == Neighbor::Occupied)
    }
}

/// Occupancy of the four axis neighbors of `coord`.
pub fn neighbors(lattice: &Lattice, coord: Coord) -> Neighborhood {
    let [right, top, left, bottom] = coord.axis_neighbors().map(|c| Neighbor::from(lattice.get(c)));
    Neighborhood {
        right,
        top,
        left,
        bottom,
    }
}
