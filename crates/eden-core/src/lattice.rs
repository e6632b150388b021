use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{error::Error, fmt};

/// Integer lattice coordinate. Orders row-major (`y`, then `x`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance from the origin.
    pub fn norm_sq(&self) -> i64 {
        let x = self.x as i64;
        let y = self.y as i64;
        x * x + y * y
    }

    pub fn norm(&self) -> f64 {
        (self.norm_sq() as f64).sqrt()
    }

    /// Axis neighbors in (right, top, left, bottom) order.
    pub fn axis_neighbors(&self) -> [Coord; 4] {
        [
            Coord::new(self.x + 1, self.y),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x - 1, self.y),
            Coord::new(self.x, self.y - 1),
        ]
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Unoccupied = 0,
    Occupied = 1,
}

impl Cell {
    pub fn is_occupied(self) -> bool {
        self == Cell::Occupied
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    OutOfScope { coord: Coord },
    Reversion { coord: Coord },
    TooLarge { max: u32, actual: u32 },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeError::OutOfScope { coord } => {
                write!(f, "({}, {}) lies outside the scan region", coord.x, coord.y)
            }
            LatticeError::Reversion { coord } => write!(
                f,
                "({}, {}) is occupied and cannot revert to unoccupied",
                coord.x, coord.y
            ),
            LatticeError::TooLarge { max, actual } => {
                write!(f, "half extent ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl Error for LatticeError {}

/// Occupancy over the square scan region `[-h, h]²`.
///
/// Every in-scope coordinate has a state; anything outside is unknown and
/// lookups return `None` instead of extending the region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    half_extent: u32,
    width: usize,
    cells: Vec<Cell>,
    occupied: usize,
}

impl Lattice {
    /// All-unoccupied lattice covering `[-half_extent, half_extent]²`.
    ///
    /// Panics above `MAX_SCAN_HALF_EXTENT`; see [`Lattice::try_new`].
    pub fn new(half_extent: u32) -> Self {
        match Self::try_new(half_extent) {
            Ok(lattice) => lattice,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(half_extent: u32) -> Result<Self, LatticeError> {
        let max = crate::constants::MAX_SCAN_HALF_EXTENT;
        if half_extent > max {
            return Err(LatticeError::TooLarge {
                max,
                actual: half_extent,
            });
        }
        let width = 2 * half_extent as usize + 1;
        Ok(Self {
            half_extent,
            width,
            cells: vec![Cell::Unoccupied; width * width],
            occupied: 0,
        })
    }

    /// Lattice with only the origin occupied.
    pub fn seeded(half_extent: u32) -> Self {
        let mut lattice = Self::new(half_extent);
        lattice.seed_origin();
        lattice
    }

    pub fn seed_origin(&mut self) {
        let idx = self.origin_index();
        self.occupy_index(idx);
    }

    pub fn half_extent(&self) -> u32 {
        self.half_extent
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord).is_some()
    }

    /// State at `coord`, or `None` when it lies outside the scan region.
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        self.index(coord).map(|idx| self.cells[idx])
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(Cell::is_occupied)
    }

    /// Write a state. Occupancy is monotone, so clearing an occupied cell fails.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> Result<(), LatticeError> {
        let idx = self
            .index(coord)
            .ok_or(LatticeError::OutOfScope { coord })?;
        match (self.cells[idx], cell) {
            (Cell::Occupied, Cell::Unoccupied) => Err(LatticeError::Reversion { coord }),
            (Cell::Unoccupied, Cell::Occupied) => {
                self.occupy_index(idx);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Every occupied coordinate.
    pub fn all_occupied(&self) -> BTreeSet<Coord> {
        self.occupied_coords().collect()
    }

    pub fn occupied_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.is_occupied())
            .map(|(coord, _)| coord)
    }

    /// All in-scope cells in row-major order from `(-h, -h)`.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, &cell)| (self.coord_at(idx), cell))
    }

    /// Largest squared norm over occupied coordinates.
    pub fn max_occupied_norm_sq(&self) -> Option<i64> {
        self.occupied_coords().map(|c| c.norm_sq()).max()
    }

    /// Largest Euclidean norm over occupied coordinates.
    pub fn max_occupied_norm(&self) -> Option<f64> {
        self.max_occupied_norm_sq().map(|sq| (sq as f64).sqrt())
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Swap in the next epoch's buffer. The buffer must be a superset of the current occupancy.
    pub(crate) fn replace_cells(&mut self, next: Vec<Cell>) {
        debug_assert_eq!(next.len(), self.cells.len(), "buffer size mismatch");
        debug_assert!(
            self.cells
                .iter()
                .zip(&next)
                .all(|(old, new)| !old.is_occupied() || new.is_occupied()),
            "epoch buffer reverted an occupied cell"
        );
        self.occupied = next.iter().filter(|c| c.is_occupied()).count();
        self.cells = next;
    }

    pub(crate) fn coord_at(&self, idx: usize) -> Coord {
        let h = self.half_extent as i32;
        let row = (idx / self.width) as i32;
        let col = (idx % self.width) as i32;
        Coord::new(col - h, row - h)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let h = self.half_extent as i64;
        let col = coord.x as i64 + h;
        let row = coord.y as i64 + h;
        let width = self.width as i64;
        if (0..width).contains(&col) && (0..width).contains(&row) {
            Some((row * width + col) as usize)
        } else {
            None
        }
    }

    fn origin_index(&self) -> usize {
        let h = self.half_extent as usize;
        h * self.width + h
    }

    fn occupy_index(&mut self, idx: usize) {
        if !self.cells[idx].is_occupied() {
            self.cells[idx] = Cell::Occupied;
            self.occupied += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lattice_is_empty_and_sized() {
        let lattice = Lattice::new(3);
        assert_eq!(lattice.width(), 7);
        assert_eq!(lattice.iter().count(), 49);
        assert!(lattice.is_empty());
        assert_eq!(lattice.get(Coord::new(3, -3)), Some(Cell::Unoccupied));
    }

    #[test]
    fn seeded_lattice_occupies_only_origin() {
        let lattice = Lattice::seeded(2);
        assert_eq!(lattice.occupied_count(), 1);
        assert_eq!(lattice.all_occupied(), BTreeSet::from([Coord::ORIGIN]));
        // Idempotent.
        let mut again = lattice.clone();
        again.seed_origin();
        assert_eq!(again, lattice);
    }

    #[test]
    fn out_of_scope_lookup_is_unknown() {
        let lattice = Lattice::seeded(2);
        assert_eq!(lattice.get(Coord::new(3, 0)), None);
        assert_eq!(lattice.get(Coord::new(0, -3)), None);
        assert!(!lattice.contains(Coord::new(i32::MAX, i32::MIN)));
        assert!(lattice.contains(Coord::new(-2, 2)));
    }

    #[test]
    fn set_rejects_out_of_scope() {
        let mut lattice = Lattice::new(1);
        let coord = Coord::new(2, 0);
        assert_eq!(
            lattice.set(coord, Cell::Occupied),
            Err(LatticeError::OutOfScope { coord })
        );
        assert_eq!(lattice.iter().count(), 9);
    }

    #[test]
    fn set_rejects_reversion_of_occupied_cell() {
        let mut lattice = Lattice::seeded(1);
        assert_eq!(
            lattice.set(Coord::ORIGIN, Cell::Unoccupied),
            Err(LatticeError::Reversion {
                coord: Coord::ORIGIN
            })
        );
        assert!(lattice.is_occupied(Coord::ORIGIN));
    }

    #[test]
    fn set_tracks_occupied_count() {
        let mut lattice = Lattice::new(2);
        lattice.set(Coord::new(1, 1), Cell::Occupied).unwrap();
        lattice.set(Coord::new(1, 1), Cell::Occupied).unwrap();
        lattice.set(Coord::new(-2, 0), Cell::Occupied).unwrap();
        lattice.set(Coord::new(0, 0), Cell::Unoccupied).unwrap();
        assert_eq!(lattice.occupied_count(), 2);
    }

    #[test]
    fn iter_visits_row_major_from_lower_left() {
        let lattice = Lattice::new(1);
        let coords: Vec<Coord> = lattice.iter().map(|(c, _)| c).take(4).collect();
        assert_eq!(
            coords,
            vec![
                Coord::new(-1, -1),
                Coord::new(0, -1),
                Coord::new(1, -1),
                Coord::new(-1, 0)
            ]
        );
    }

    #[test]
    fn try_new_rejects_oversized_half_extent() {
        let max = crate::constants::MAX_SCAN_HALF_EXTENT;
        assert_eq!(
            Lattice::try_new(max + 1),
            Err(LatticeError::TooLarge {
                max,
                actual: max + 1
            })
        );
        assert_eq!(Lattice::try_new(2).map(|l| l.width()), Ok(5));
    }

    #[test]
    #[should_panic(expected = "exceeds supported maximum")]
    fn new_panics_on_oversized_half_extent() {
        Lattice::new(crate::constants::MAX_SCAN_HALF_EXTENT + 1);
    }

    #[test]
    fn max_occupied_norm_uses_farthest_point() {
        let mut lattice = Lattice::seeded(4);
        assert_eq!(lattice.max_occupied_norm(), Some(0.0));
        lattice.set(Coord::new(3, 4), Cell::Occupied).unwrap();
        lattice.set(Coord::new(-1, 0), Cell::Occupied).unwrap();
        assert!((lattice.max_occupied_norm().unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(lattice.max_occupied_norm_sq(), Some(25));
        assert_eq!(Lattice::new(4).max_occupied_norm(), None);
    }

    #[test]
    fn coord_ordering_is_row_major() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(-1, 1), Coord::new(0, 0)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(-1, 1)]
        );
    }
}
