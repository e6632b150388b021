#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::EdenConfig;
use crate::metrics::{EnsembleSummary, GrowthCurve};
use crate::radius::{estimate_radii, Radii, RadiusError};
use crate::rng::derive_stream;
use crate::simulation::run_with;

fn run_trial(config: &EdenConfig, trial: u32) -> Result<Radii, RadiusError> {
    let mut rng = derive_stream(config.seed, trial as u64);
    let lattice = run_with(config.growth(), &mut rng)?;
    estimate_radii(&lattice, config.epochs, config.precision)
}

/// Mean inscribed and circumscribed radii over `config.trials` independent runs.
///
/// Trial `i` grows from its own stream derived from `config.seed`, so the
/// summary is reproducible and does not depend on scheduling.
pub fn estimate_mean_radii(config: &EdenConfig) -> Result<EnsembleSummary, RadiusError> {
    config.validate()?;

    #[cfg(feature = "parallel")]
    let samples: Vec<Radii> = (0..config.trials)
        .into_par_iter()
        .map(|trial| run_trial(config, trial))
        .collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let samples: Vec<Radii> = (0..config.trials)
        .map(|trial| run_trial(config, trial))
        .collect::<Result<_, _>>()?;

    let trials = samples.len() as f64;
    let inscribed_mean = samples.iter().map(|r| r.inscribed).sum::<f64>() / trials;
    let circumscribed_mean = samples.iter().map(|r| r.circumscribed).sum::<f64>() / trials;
    let summary = EnsembleSummary {
        epochs: config.epochs,
        trials: config.trials,
        inscribed_mean,
        circumscribed_mean,
        eccentricity: Radii {
            inscribed: inscribed_mean,
            circumscribed: circumscribed_mean,
        }
        .eccentricity(),
    };
    tracing::info!(
        epochs = summary.epochs,
        trials = summary.trials,
        inscribed_mean = summary.inscribed_mean,
        circumscribed_mean = summary.circumscribed_mean,
        "ensemble estimate complete"
    );
    Ok(summary)
}

/// Ensemble estimates for every epoch count from 1 through `config.epochs`.
pub fn growth_curve(config: &EdenConfig) -> Result<GrowthCurve, RadiusError> {
    config.validate()?;
    let points = (1..=config.epochs)
        .map(|epochs| {
            estimate_mean_radii(&EdenConfig {
                epochs,
                ..config.clone()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GrowthCurve {
        probability: config.probability,
        points,
    })
}
