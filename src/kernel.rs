//! Scattering kernel averaged over an electron population.
//!
//! For a logarithmic frequency shift `s`, the multi-electron kernel is
//! `P1(s) = int p(beta)*P(s; beta) dbeta` from the smallest speed able to
//! produce the shift up to the speed of light, where `p` is the speed
//! distribution of the electrons and `P` the single-electron kernel.

use crate::{
    constants::BETA_CEILING,
    distribution::ElectronDistribution,
    error::{require_length, SzError},
    fsz,
    io::Verbosity,
    scattering::{self, min_beta_for_shift, thomson_kernel},
};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

/// Resolution of the multi-electron kernel integration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    /// Number of electron speeds to integrate over for each shift.
    pub n_beta: usize,
    /// Number of scattering angle cosines for each single-electron kernel.
    pub n_mu: usize,
}

impl KernelConfig {
    pub const DEFAULT_N_BETA: usize = 100;
    pub const DEFAULT_N_MU: usize = scattering::DEFAULT_N_MU;

    const MIN_RESOLUTION: usize = 100;
    const MAX_RESOLUTION: usize = 4000;

    /// Creates a configuration whose resolution is expected to give the
    /// requested relative accuracy.
    ///
    /// Both resolutions are set to `ceil(10/sqrt(relative_accuracy))`, limited
    /// to the range `[100, 4000]`.
    pub fn for_relative_accuracy(relative_accuracy: fsz) -> Self {
        let n = fsz::ceil(10.0 / fsz::sqrt(relative_accuracy));
        let n = if n.is_finite() {
            (n as usize).clamp(Self::MIN_RESOLUTION, Self::MAX_RESOLUTION)
        } else {
            Self::MAX_RESOLUTION
        };
        Self { n_beta: n, n_mu: n }
    }

    /// Checks that both resolutions are non-zero.
    pub fn validate(&self) -> Result<(), SzError> {
        if self.n_beta == 0 {
            return Err(SzError::invalid(
                "number of electron speeds",
                0.0,
                "larger than zero",
            ));
        }
        if self.n_mu == 0 {
            return Err(SzError::invalid(
                "number of scattering angles",
                0.0,
                "larger than zero",
            ));
        }
        Ok(())
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            n_beta: Self::DEFAULT_N_BETA,
            n_mu: Self::DEFAULT_N_MU,
        }
    }
}

/// Evaluates the multi-electron kernel for a single shift.
///
/// The speed integral uses a midpoint rule with `config.n_beta` cells between
/// the kinematic lower limit for the shift and `1 - DBL_EPSILON`.
pub fn multi_electron_kernel_value<D>(s: fsz, distribution: &D, config: &KernelConfig) -> fsz
where
    D: ElectronDistribution + ?Sized,
{
    let lower_beta = min_beta_for_shift(s);
    if lower_beta >= BETA_CEILING {
        return 0.0;
    }
    let dbeta = (BETA_CEILING - lower_beta) / (config.n_beta as fsz);

    (0..config.n_beta)
        .map(|j| {
            let beta = lower_beta + ((j as fsz) + 0.5) * dbeta;
            let density = distribution.density(beta);
            if density == 0.0 {
                0.0
            } else {
                density * thomson_kernel(s, beta, config.n_mu)
            }
        })
        .sum::<fsz>()
        * dbeta
}

/// Evaluates the multi-electron kernel for each of the given shifts.
pub fn multi_electron_kernel<D>(
    s: &[fsz],
    distribution: &D,
    config: &KernelConfig,
    verbosity: &Verbosity,
) -> Result<Vec<fsz>, SzError>
where
    D: ElectronDistribution + ?Sized,
{
    let mut output = vec![0.0; s.len()];
    multi_electron_kernel_into(s, distribution, config, verbosity, &mut output)?;
    Ok(output)
}

/// Like `multi_electron_kernel`, but writes the result into the given buffer.
///
/// The shifts are processed in parallel, each writing only to its own
/// element of the output buffer.
pub fn multi_electron_kernel_into<D>(
    s: &[fsz],
    distribution: &D,
    config: &KernelConfig,
    verbosity: &Verbosity,
    output: &mut [fsz],
) -> Result<(), SzError>
where
    D: ElectronDistribution + ?Sized,
{
    config.validate()?;
    require_length("kernel output", s.len(), output.len())?;
    if let Some(&shift) = s.iter().find(|shift| !shift.is_finite()) {
        return Err(SzError::invalid("frequency shift", shift, "finite"));
    }

    output
        .par_iter_mut()
        .zip(s.par_iter())
        .progress_with(verbosity.create_progress_bar(s.len()))
        .for_each(|(value, &shift)| {
            *value = multi_electron_kernel_value(shift, distribution, config);
        });
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{distribution::Population, math::midpoint_grid};
    use approx::assert_abs_diff_eq;

    #[test]
    fn thermal_kernel_is_normalized() {
        let population = Population::thermal(15.33).unwrap();
        let (s, ds) = midpoint_grid(-1.5, 2.5, 200);
        let kernel =
            multi_electron_kernel(&s, &population, &KernelConfig::default(), &Verbosity::Quiet)
                .unwrap();
        assert!(kernel.iter().all(|&value| value >= 0.0));
        assert_abs_diff_eq!(kernel.iter().sum::<fsz>() * ds, 1.0, epsilon = 2e-3);
    }

    #[test]
    fn thermal_kernel_is_skewed_towards_upscattering() {
        let population = Population::thermal(15.33).unwrap();
        let config = KernelConfig::default();
        let upscattered = multi_electron_kernel_value(0.2, &population, &config);
        let downscattered = multi_electron_kernel_value(-0.2, &population, &config);
        assert!(upscattered > downscattered);
    }

    #[test]
    fn power_law_kernel_is_normalized() {
        let population = Population::power_law(2.5).unwrap();
        let (s, ds) = midpoint_grid(-1.5, 10.0, 150);
        let config = KernelConfig {
            n_beta: 200,
            n_mu: 100,
        };
        let kernel = multi_electron_kernel(&s, &population, &config, &Verbosity::Quiet).unwrap();
        assert_abs_diff_eq!(kernel.iter().sum::<fsz>() * ds, 1.0, epsilon = 5e-3);
    }

    #[test]
    fn resolution_follows_requested_accuracy() {
        assert_eq!(KernelConfig::for_relative_accuracy(4e-2).n_beta, 100);
        assert_eq!(KernelConfig::for_relative_accuracy(1e-3).n_beta, 317);
        assert_eq!(KernelConfig::for_relative_accuracy(5e-4).n_mu, 448);
        assert_eq!(KernelConfig::for_relative_accuracy(1e-9).n_mu, 4000);
    }

    #[test]
    fn invalid_configuration_leaves_output_untouched() {
        let population = Population::thermal(5.0).unwrap();
        let config = KernelConfig { n_beta: 0, n_mu: 10 };
        let mut output = [7.0; 3];
        assert!(multi_electron_kernel_into(
            &[0.0, 0.1, 0.2],
            &population,
            &config,
            &Verbosity::Quiet,
            &mut output
        )
        .is_err());
        assert!(multi_electron_kernel_into(
            &[0.0, 0.1],
            &population,
            &KernelConfig::default(),
            &Verbosity::Quiet,
            &mut output
        )
        .is_err());
        assert_eq!(output, [7.0; 3]);
    }
}
