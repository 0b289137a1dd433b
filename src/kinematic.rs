//! Kinematic distortion from the bulk motion of the scattering electrons.

use crate::{
    background::CmbBackground,
    error::{require_length, require_non_negative, SzError},
    fsz,
    math::midpoint_grid,
    transfer::validate_frequencies,
    units::beta_to_gamma_squared,
};
use rayon::prelude::*;

/// Configuration parameters for the kinematic term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KinematicConfig {
    /// Number of scattering angle cosines to integrate over.
    pub n_mu: usize,
}

impl KinematicConfig {
    pub const DEFAULT_N_MU: usize = 1000;

    /// Checks that the number of angles is non-zero.
    pub fn validate(&self) -> Result<(), SzError> {
        if self.n_mu == 0 {
            Err(SzError::invalid(
                "number of scattering angles",
                0.0,
                "larger than zero",
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for KinematicConfig {
    fn default() -> Self {
        KinematicConfig {
            n_mu: Self::DEFAULT_N_MU,
        }
    }
}

/// Checks that the line-of-sight speed (in units of the speed of light) is
/// finite and slower than light.
pub fn validate_line_of_sight_beta(beta: fsz) -> Result<(), SzError> {
    if beta.is_finite() && fsz::abs(beta) < 1.0 {
        Ok(())
    } else {
        Err(SzError::invalid(
            "line-of-sight speed",
            beta,
            "in the range (-1, 1)",
        ))
    }
}

/// Computes the kinematic change in specific intensity [W/(m^2 Hz sr)] at each
/// of the given frequencies [Hz].
///
/// `line_of_sight_beta` is the bulk speed of the electrons along the line of
/// sight in units of the speed of light, positive when receding.
pub fn kinematic_intensity(
    frequencies: &[fsz],
    line_of_sight_beta: fsz,
    optical_depth: fsz,
    background: &CmbBackground,
    config: &KinematicConfig,
) -> Result<Vec<fsz>, SzError> {
    let mut output = vec![0.0; frequencies.len()];
    kinematic_intensity_into(
        frequencies,
        line_of_sight_beta,
        optical_depth,
        background,
        config,
        &mut output,
    )?;
    Ok(output)
}

/// Like `kinematic_intensity`, but writes the result into the given buffer.
pub fn kinematic_intensity_into(
    frequencies: &[fsz],
    line_of_sight_beta: fsz,
    optical_depth: fsz,
    background: &CmbBackground,
    config: &KinematicConfig,
    output: &mut [fsz],
) -> Result<(), SzError> {
    config.validate()?;
    validate_frequencies(frequencies)?;
    validate_line_of_sight_beta(line_of_sight_beta)?;
    require_non_negative("optical depth", optical_depth)?;
    require_length("intensity output", frequencies.len(), output.len())?;

    if line_of_sight_beta == 0.0 || optical_depth == 0.0 {
        output.iter_mut().for_each(|value| *value = 0.0);
        return Ok(());
    }

    let beta = line_of_sight_beta;
    let boost = beta_to_gamma_squared(beta) * (1.0 + beta);
    let (mu, dmu) = midpoint_grid(-1.0, 1.0, config.n_mu);

    output
        .par_iter_mut()
        .zip(frequencies.par_iter())
        .for_each(|(intensity, &frequency)| {
            let incident_intensity = background.specific_intensity(frequency);
            if incident_intensity == 0.0 {
                *intensity = 0.0;
                return;
            }
            let x = background.dimensionless_frequency(frequency);
            let occupation_ratio_sum: fsz = mu
                .iter()
                .map(|&mu| {
                    let boosted_x = x * boost * (1.0 - beta * mu);
                    // (exp(x) - 1)/(exp(boosted_x) - 1), without overflow for large x
                    let occupation_ratio = fsz::exp(x - boosted_x) * fsz::exp_m1(-x)
                        / fsz::exp_m1(-boosted_x);
                    0.375 * (1.0 + mu * mu) * (occupation_ratio - 1.0)
                })
                .sum();
            *intensity = optical_depth * occupation_ratio_sum * dmu * incident_intensity;
        });
    Ok(())
}
