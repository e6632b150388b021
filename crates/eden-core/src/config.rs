use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SCAN_MARGIN, MAX_SCAN_HALF_EXTENT};

/// How far the lattice extends around the origin for a given epoch count.
///
/// Growth from the origin reaches at most Manhattan distance `n` after `n`
/// epochs, so any half extent of at least `n + 1` keeps the frontier off the
/// scan edge.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Half extent `n + cells`.
    Margin { cells: u32 },
    /// Half extent `factor * n`.
    Proportional { factor: u32 },
}

impl Default for ScanPolicy {
    fn default() -> Self {
        ScanPolicy::Margin {
            cells: DEFAULT_SCAN_MARGIN,
        }
    }
}

impl ScanPolicy {
    /// Half extent of the scan square for `epochs` growth epochs.
    pub fn half_extent(&self, epochs: u32) -> u64 {
        match *self {
            ScanPolicy::Margin { cells } => epochs as u64 + cells as u64,
            ScanPolicy::Proportional { factor } => epochs as u64 * factor as u64,
        }
    }
}

/// Parameters of a single growth run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GrowthParams {
    /// Number of growth epochs. Also sizes the scan region.
    pub epochs: u32,
    /// Per-neighbor occupation probability.
    pub probability: f64,
    pub scan: ScanPolicy,
}

impl GrowthParams {
    pub fn new(epochs: u32, probability: f64) -> Self {
        Self {
            epochs,
            probability,
            scan: ScanPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        validate_epochs(self.epochs)?;
        if !(self.probability.is_finite() && (0.0..=1.0).contains(&self.probability)) {
            return Err(ParameterError::InvalidProbability);
        }
        let required = self.epochs as u64 + 1;
        let actual = self.scan.half_extent(self.epochs);
        if actual < required {
            return Err(ParameterError::ScanTooSmall { required, actual });
        }
        if actual > MAX_SCAN_HALF_EXTENT as u64 {
            return Err(ParameterError::ScanTooLarge {
                max: MAX_SCAN_HALF_EXTENT as u64,
                actual,
            });
        }
        Ok(())
    }

    /// Validated half extent as a lattice dimension.
    pub(crate) fn half_extent(&self) -> Result<u32, ParameterError> {
        self.validate()?;
        // Bounded by MAX_SCAN_HALF_EXTENT after validation.
        Ok(self.scan.half_extent(self.epochs) as u32)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdenConfig {
    /// Deterministic seed for reproducible runs. Ensemble trials derive their streams from it.
    pub seed: u64,
    /// Number of growth epochs per run.
    pub epochs: u32,
    /// Per-neighbor occupation probability.
    pub probability: f64,
    /// Iteration budget of each radius search.
    pub precision: u32,
    /// Independent runs averaged by the ensemble estimate.
    pub trials: u32,
    /// Scan region sizing policy.
    pub scan: ScanPolicy,
}

impl Default for EdenConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            epochs: 14,
            probability: 0.1,
            precision: 12,
            trials: 10,
            scan: ScanPolicy::default(),
        }
    }
}

macro_rules! define_parameter_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ParameterError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for ParameterError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_parameter_error! {
    InvalidEpochs => "epochs must be greater than 0";
    InvalidProbability => "probability must be finite and within [0,1]";
    InvalidPrecision => "precision must be greater than 0";
    InvalidTrials => "trials must be greater than 0";
    ScanTooSmall { required: u64, actual: u64 } => "scan half extent ({actual}) must be at least epochs + 1 ({required})";
    ScanTooLarge { max: u64, actual: u64 } => "scan half extent ({actual}) exceeds supported maximum ({max})";
}

impl std::error::Error for ParameterError {}

pub(crate) fn validate_epochs(epochs: u32) -> Result<(), ParameterError> {
    if epochs == 0 {
        return Err(ParameterError::InvalidEpochs);
    }
    Ok(())
}

pub(crate) fn validate_precision(precision: u32) -> Result<(), ParameterError> {
    if precision == 0 {
        return Err(ParameterError::InvalidPrecision);
    }
    Ok(())
}

impl EdenConfig {
    pub fn growth(&self) -> GrowthParams {
        GrowthParams {
            epochs: self.epochs,
            probability: self.probability,
            scan: self.scan,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        self.growth().validate()?;
        validate_precision(self.precision)?;
        if self.trials == 0 {
            return Err(ParameterError::InvalidTrials);
        }
        Ok(())
    }
}
