/// Largest supported scan half extent. A lattice holds `(2h + 1)²` cells.
pub const MAX_SCAN_HALF_EXTENT: u32 = 4096;

/// Prime multiplier used to derive per-row and per-trial RNG streams from a base seed.
/// Chosen so streams for consecutive indices have minimal overlap.
pub const RNG_DERIVATION_PRIME: u64 = 7919;

/// Slack added to `r²` in disk membership so `sqrt(k)²` still admits the point at norm² `k`.
/// Lattice norms² are integers, so nothing else slips in.
pub const DISK_TOLERANCE: f64 = 1e-9;

/// Cells of headroom beyond the epoch count in the default scan policy.
pub const DEFAULT_SCAN_MARGIN: u32 = 2;
