use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use std::{error::Error, fmt};

use crate::config::{validate_epochs, validate_precision, ParameterError};
use crate::constants::DISK_TOLERANCE;
use crate::lattice::{Cell, Coord, Lattice};

/// Bounding circles about the origin.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Radii {
    /// Largest disk whose in-scope points are all occupied.
    pub inscribed: f64,
    /// Smallest disk found that holds every occupied point.
    pub circumscribed: f64,
}

impl Radii {
    /// `inscribed / circumscribed`; a single-point cluster counts as round.
    pub fn eccentricity(&self) -> f64 {
        if self.circumscribed > 0.0 {
            self.inscribed / self.circumscribed
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadiusError {
    Parameter(ParameterError),
    /// Invalid state: nothing is occupied.
    EmptyLattice,
    /// Invalid state: the origin was never seeded.
    UnseededOrigin,
}

impl fmt::Display for RadiusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadiusError::Parameter(e) => write!(f, "{}", e),
            RadiusError::EmptyLattice => {
                write!(f, "invalid state: radius requested for an empty lattice")
            }
            RadiusError::UnseededOrigin => {
                write!(f, "invalid state: radius requested but the origin is unoccupied")
            }
        }
    }
}

impl From<ParameterError> for RadiusError {
    fn from(err: ParameterError) -> Self {
        RadiusError::Parameter(err)
    }
}

impl Error for RadiusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RadiusError::Parameter(e) => Some(e),
            _ => None,
        }
    }
}

/// Starting radius and step base of both searches: `⌊√2·n + 1⌋`.
pub fn search_span(epochs: u32) -> f64 {
    (SQRT_2 * epochs as f64 + 1.0).floor()
}

/// Smallest `f64` radius `r` with `r * r >= norm_sq`.
///
/// `sqrt` alone can land one ulp short, which would leave the point at
/// `norm_sq` outside a strict `x² + y² ≤ r²` test.
pub fn lattice_radius(norm_sq: i64) -> f64 {
    let target = norm_sq as f64;
    let mut r = target.sqrt();
    while r * r < target {
        r = f64::from_bits(r.to_bits() + 1);
    }
    r
}

fn in_disk(coord: Coord, radius: f64) -> bool {
    coord.norm_sq() as f64 <= radius * radius + DISK_TOLERANCE
}

/// In-scope lattice points with `x² + y² ≤ r²`.
///
/// Only the window `|x|, |y| ≤ ⌈r⌉ + 1` is visited, clamped to the scan region.
pub fn disk_points(lattice: &Lattice, radius: f64) -> impl Iterator<Item = (Coord, Cell)> + '_ {
    let reach = (radius.max(0.0).ceil() as i64 + 1).min(lattice.half_extent() as i64) as i32;
    (-reach..=reach)
        .flat_map(move |y| (-reach..=reach).map(move |x| Coord::new(x, y)))
        .filter(move |&c| in_disk(c, radius))
        .filter_map(move |c| lattice.get(c).map(|cell| (c, cell)))
}

fn disk_is_occupied(lattice: &Lattice, radius: f64) -> bool {
    disk_points(lattice, radius).all(|(_, cell)| cell.is_occupied())
}

fn disk_covers(lattice: &Lattice, radius: f64, total: usize) -> bool {
    disk_points(lattice, radius)
        .filter(|(_, cell)| cell.is_occupied())
        .count()
        == total
}

/// Fixed-budget halving search. Iteration `i` moves by `span / 2^i`, outward
/// when `passes` agrees with `expand_on_pass` and inward otherwise.
///
/// Returns the final iterate if it passes, else the most recent earlier
/// iterate that did. Only meaningful when `passes` is monotone in the radius
/// over the searched window.
fn halving_search(
    span: f64,
    precision: u32,
    expand_on_pass: bool,
    mut passes: impl FnMut(f64) -> bool,
) -> Option<f64> {
    let mut radius = span;
    let mut step = span;
    let mut last_pass = None;
    for _ in 1..precision {
        step /= 2.0;
        if step == 0.0 {
            break;
        }
        let ok = passes(radius);
        if ok {
            last_pass = Some(radius);
        }
        radius = if ok == expand_on_pass {
            radius + step
        } else {
            radius - step
        };
    }
    if passes(radius) {
        Some(radius)
    } else {
        last_pass
    }
}

fn ensure_seeded(lattice: &Lattice) -> Result<(), RadiusError> {
    if lattice.is_empty() {
        return Err(RadiusError::EmptyLattice);
    }
    if !lattice.is_occupied(Coord::ORIGIN) {
        return Err(RadiusError::UnseededOrigin);
    }
    Ok(())
}

fn validate(lattice: &Lattice, epochs: u32, precision: u32) -> Result<(), RadiusError> {
    validate_epochs(epochs)?;
    validate_precision(precision)?;
    ensure_seeded(lattice)
}

/// Inscribed radius.
///
/// The accepted search radius is tightened to the farthest in-scope lattice
/// point inside its disk. The tested point set stays the same, and the result
/// never exceeds the circumscribed radius.
pub fn inscribed_radius(
    lattice: &Lattice,
    epochs: u32,
    precision: u32,
) -> Result<f64, RadiusError> {
    validate(lattice, epochs, precision)?;
    // The zero disk holds just the seeded origin, so it always qualifies.
    let accepted = halving_search(search_span(epochs), precision, true, |r| {
        disk_is_occupied(lattice, r)
    })
    .unwrap_or(0.0);
    let tightened = disk_points(lattice, accepted)
        .map(|(c, _)| c.norm_sq())
        .max()
        .map_or(0.0, lattice_radius);
    Ok(tightened)
}

/// Circumscribed radius.
///
/// Never drops below the farthest occupied point, so every occupied `(x, y)`
/// satisfies `x² + y² ≤ r²` exactly. Falls back to that bound if no iterate
/// contained the whole cluster.
pub fn circumscribed_radius(
    lattice: &Lattice,
    epochs: u32,
    precision: u32,
) -> Result<f64, RadiusError> {
    validate(lattice, epochs, precision)?;
    let total = lattice.occupied_count();
    let farthest = lattice
        .max_occupied_norm_sq()
        .map(lattice_radius)
        .ok_or(RadiusError::EmptyLattice)?;
    let accepted = halving_search(search_span(epochs), precision, false, |r| {
        disk_covers(lattice, r, total)
    });
    Ok(accepted.map_or(farthest, |r| r.max(farthest)))
}

pub fn estimate_radii(
    lattice: &Lattice,
    epochs: u32,
    precision: u32,
) -> Result<Radii, RadiusError> {
    let radii = Radii {
        inscribed: inscribed_radius(lattice, epochs, precision)?,
        circumscribed: circumscribed_radius(lattice, epochs, precision)?,
    };
    tracing::debug!(
        inscribed = radii.inscribed,
        circumscribed = radii.circumscribed,
        precision,
        "radii estimated"
    );
    Ok(radii)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::step_epoch;
    use crate::rng::create_rng;
    use proptest::prelude::*;

    fn filled_disk(half_extent: u32, radius_sq: i64) -> Lattice {
        let mut lattice = Lattice::new(half_extent);
        let h = half_extent as i32;
        for x in -h..=h {
            for y in -h..=h {
                let c = Coord::new(x, y);
                if c.norm_sq() <= radius_sq {
                    lattice.set(c, Cell::Occupied).unwrap();
                }
            }
        }
        lattice
    }

    fn grown(seed: u64, epochs: u32, probability: f64) -> Lattice {
        let mut lattice = Lattice::seeded(epochs + 2);
        let mut rng = create_rng(seed);
        for _ in 0..epochs {
            step_epoch(&mut lattice, probability, &mut rng);
        }
        lattice
    }

    #[test]
    fn search_span_matches_diagonal_bound() {
        assert_eq!(search_span(1), 2.0);
        assert_eq!(search_span(14), 20.0);
    }

    #[test]
    fn disk_points_visit_only_the_disk() {
        let lattice = Lattice::new(50);
        assert_eq!(disk_points(&lattice, 2.0).count(), 13);
        assert_eq!(disk_points(&lattice, 0.0).count(), 1);
    }

    #[test]
    fn disk_points_skip_out_of_scope() {
        let lattice = Lattice::new(1);
        assert_eq!(disk_points(&lattice, 5.0).count(), 9);
    }

    #[test]
    fn empty_lattice_is_invalid_state() {
        let lattice = Lattice::new(3);
        assert_eq!(
            estimate_radii(&lattice, 1, 12),
            Err(RadiusError::EmptyLattice)
        );
    }

    #[test]
    fn unseeded_origin_is_invalid_state() {
        let mut lattice = Lattice::new(3);
        lattice.set(Coord::new(1, 0), Cell::Occupied).unwrap();
        assert_eq!(
            inscribed_radius(&lattice, 1, 12),
            Err(RadiusError::UnseededOrigin)
        );
    }

    #[test]
    fn zero_epochs_or_precision_are_rejected() {
        let lattice = Lattice::seeded(3);
        assert_eq!(
            estimate_radii(&lattice, 0, 12),
            Err(RadiusError::Parameter(ParameterError::InvalidEpochs))
        );
        assert_eq!(
            estimate_radii(&lattice, 1, 0),
            Err(RadiusError::Parameter(ParameterError::InvalidPrecision))
        );
    }

    #[test]
    fn lone_seed_has_zero_inscribed_radius() {
        let radii = estimate_radii(&Lattice::seeded(3), 1, 12).unwrap();
        assert_eq!(radii.inscribed, 0.0);
        assert!(radii.circumscribed >= 0.0 && radii.circumscribed < 0.01);
    }

    #[test]
    fn plus_shape_is_bounded_by_unit_circles() {
        let mut lattice = Lattice::seeded(3);
        step_epoch(&mut lattice, 1.0, &mut create_rng(0));
        let radii = estimate_radii(&lattice, 1, 12).unwrap();
        assert!((radii.inscribed - 1.0).abs() < 1e-12);
        assert!((radii.circumscribed - 1.0).abs() < 1e-12);
        assert!((radii.eccentricity() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn filled_disk_recovers_its_radius() {
        let lattice = filled_disk(6, 9);
        let radii = estimate_radii(&lattice, 4, 12).unwrap();
        assert!((radii.inscribed - 3.0).abs() < 1e-12);
        assert!(radii.circumscribed >= 3.0 - 1e-9 && radii.circumscribed < 3.01);
    }

    #[test]
    fn single_iteration_budget_still_returns_valid_radii() {
        let lattice = filled_disk(6, 9);
        let radii = estimate_radii(&lattice, 4, 1).unwrap();
        // Span 6 fails the inscribed test and passes the containment test.
        assert_eq!(radii.inscribed, 0.0);
        assert_eq!(radii.circumscribed, 6.0);
    }

    #[test]
    fn eccentricity_of_zero_disk_is_one() {
        let radii = Radii {
            inscribed: 0.0,
            circumscribed: 0.0,
        };
        assert_eq!(radii.eccentricity(), 1.0);
    }

    #[test]
    fn error_source_exposes_parameter_error() {
        let err = RadiusError::from(ParameterError::InvalidPrecision);
        assert!(err.source().is_some());
        assert!(RadiusError::EmptyLattice.source().is_none());
        assert!(RadiusError::EmptyLattice.to_string().contains("invalid state"));
    }

    fn assert_strict_bounds(lattice: &Lattice, radii: Radii) {
        assert!(
            radii.inscribed <= radii.circumscribed,
            "inscribed {} exceeds circumscribed {}",
            radii.inscribed,
            radii.circumscribed
        );
        let r_out_sq = radii.circumscribed * radii.circumscribed;
        assert!(lattice
            .occupied_coords()
            .all(|c| c.norm_sq() as f64 <= r_out_sq));
        let r_in_sq = radii.inscribed * radii.inscribed;
        assert!(lattice
            .iter()
            .filter(|(c, _)| c.norm_sq() as f64 <= r_in_sq)
            .all(|(_, cell)| cell.is_occupied()));
    }

    #[test]
    fn lattice_radius_squares_back_to_at_least_its_norm() {
        for norm_sq in 0..=20_000i64 {
            let r = lattice_radius(norm_sq);
            assert!(r * r >= norm_sq as f64, "norm_sq {norm_sq}");
            assert!((r - (norm_sq as f64).sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn high_precision_keeps_unit_cluster_ordered() {
        // Origin plus its right neighbor: both radii sit exactly on norm 1.
        let mut lattice = Lattice::seeded(3);
        lattice.set(Coord::new(1, 0), Cell::Occupied).unwrap();
        for precision in [12, 40, 64, u32::MAX] {
            let radii = estimate_radii(&lattice, 1, precision).unwrap();
            assert!(radii.circumscribed >= 1.0, "precision {precision}: {radii:?}");
            assert_strict_bounds(&lattice, radii);
        }
    }

    #[test]
    fn high_precision_grown_clusters_stay_ordered() {
        for seed in 0..12 {
            for (epochs, probability) in [(1, 0.5), (3, 0.4), (8, 0.6)] {
                let lattice = grown(seed, epochs, probability);
                for precision in [40, u32::MAX] {
                    let radii = estimate_radii(&lattice, epochs, precision).unwrap();
                    assert_strict_bounds(&lattice, radii);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn proptest_radii_bound_the_cluster(
            seed in any::<u64>(),
            epochs in 1u32..10,
            probability in 0.0f64..=1.0,
            precision in 1u32..64,
        ) {
            let lattice = grown(seed, epochs, probability);
            let radii = estimate_radii(&lattice, epochs, precision).unwrap();
            prop_assert!(radii.inscribed <= radii.circumscribed);
            let r_out_sq = radii.circumscribed * radii.circumscribed;
            prop_assert!(lattice
                .occupied_coords()
                .all(|c| c.norm_sq() as f64 <= r_out_sq));
            let r_in_sq = radii.inscribed * radii.inscribed;
            prop_assert!(disk_points(&lattice, radii.inscribed)
                .filter(|(c, _)| c.norm_sq() as f64 <= r_in_sq)
                .all(|(_, cell)| cell.is_occupied()));
        }
    }
}
