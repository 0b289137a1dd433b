//! Relativistic power-law electron distribution.

use super::ElectronDistribution;
use crate::{
    constants::MAX_POWER_LAW_SHIFT,
    error::SzError,
    fsz,
    units::{beta_to_gamma, gamma_to_beta},
};

/// Configuration parameters for the power-law distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerLawConfig {
    /// Smallest Lorentz factor of the electrons.
    pub lower_gamma: fsz,
    /// Largest Lorentz factor of the electrons.
    pub upper_gamma: fsz,
}

/// Distribution of electrons whose Lorentz factors follow an inverse power law
/// `A*gamma^(-alpha)` between two cut-offs.
///
/// The density over speeds includes the Jacobian `d(gamma)/d(beta) = gamma^3*beta`,
/// so that it integrates to one over `beta` as well as over `gamma`.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerLaw {
    alpha: fsz,
    lower_gamma: fsz,
    upper_gamma: fsz,
    normalization: fsz,
}

impl PowerLawConfig {
    pub const DEFAULT_LOWER_GAMMA: fsz = 1.0;

    /// Checks that the cut-offs bound a non-empty range of Lorentz factors.
    pub fn validate(&self) -> Result<(), SzError> {
        if !(self.lower_gamma.is_finite() && self.lower_gamma >= 1.0) {
            return Err(SzError::invalid(
                "lower Lorentz factor",
                self.lower_gamma,
                "finite and larger than or equal to one",
            ));
        }
        if !(self.upper_gamma.is_finite() && self.upper_gamma >= self.lower_gamma) {
            return Err(SzError::invalid(
                "upper Lorentz factor",
                self.upper_gamma,
                "finite and larger than or equal to the lower Lorentz factor",
            ));
        }
        if self.upper_gamma == self.lower_gamma {
            return Err(SzError::DegenerateNormalization {
                lower_gamma: self.lower_gamma,
                upper_gamma: self.upper_gamma,
            });
        }
        Ok(())
    }
}

impl Default for PowerLawConfig {
    fn default() -> Self {
        PowerLawConfig {
            lower_gamma: Self::DEFAULT_LOWER_GAMMA,
            upper_gamma: fsz::cosh(0.5 * MAX_POWER_LAW_SHIFT),
        }
    }
}

impl PowerLaw {
    /// Creates a new power-law distribution with the given spectral index.
    pub fn new(alpha: fsz, config: &PowerLawConfig) -> Result<Self, SzError> {
        if !alpha.is_finite() {
            return Err(SzError::invalid("power-law index", alpha, "finite"));
        }
        config.validate()?;

        let lower_gamma = config.lower_gamma;
        let upper_gamma = config.upper_gamma;
        let normalization = if alpha == 1.0 {
            1.0 / fsz::ln(upper_gamma / lower_gamma)
        } else {
            (1.0 - alpha) / (upper_gamma.powf(1.0 - alpha) - lower_gamma.powf(1.0 - alpha))
        };
        if !(normalization.is_finite() && normalization > 0.0) {
            return Err(SzError::DegenerateNormalization {
                lower_gamma,
                upper_gamma,
            });
        }

        Ok(Self {
            alpha,
            lower_gamma,
            upper_gamma,
            normalization,
        })
    }

    /// Returns the power-law index.
    pub fn alpha(&self) -> fsz {
        self.alpha
    }

    /// Returns the normalization constant `A`.
    pub fn normalization(&self) -> fsz {
        self.normalization
    }

    /// Evaluates the density over Lorentz factors.
    pub fn density_per_gamma(&self, gamma: fsz) -> fsz {
        if gamma < self.lower_gamma || gamma > self.upper_gamma {
            0.0
        } else {
            self.normalization * gamma.powf(-self.alpha)
        }
    }
}

impl ElectronDistribution for PowerLaw {
    fn density(&self, beta: fsz) -> fsz {
        if !(0.0..1.0).contains(&beta) {
            return 0.0;
        }
        let gamma = beta_to_gamma(beta);
        self.density_per_gamma(gamma) * gamma.powi(3) * beta
    }

    fn support(&self) -> (fsz, fsz) {
        (
            gamma_to_beta(self.lower_gamma),
            gamma_to_beta(self.upper_gamma),
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::math::integrate_composite_five_point_gauss_legendre;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn config(lower_gamma: fsz, upper_gamma: fsz) -> PowerLawConfig {
        PowerLawConfig {
            lower_gamma,
            upper_gamma,
        }
    }

    #[test]
    fn density_over_gamma_is_normalized() {
        for alpha in [0.5, 1.0, 2.5, 4.0] {
            let distribution = PowerLaw::new(alpha, &config(1.5, 30.0)).unwrap();
            let integral = integrate_composite_five_point_gauss_legendre(
                |gamma| distribution.density_per_gamma(gamma),
                1.5,
                30.0,
                200,
            );
            assert_relative_eq!(integral, 1.0, max_relative = 1e-10);
        }
    }

    #[test]
    fn density_over_beta_is_normalized() {
        let distribution = PowerLaw::new(2.5, &config(1.1, 3.0)).unwrap();
        let (lower_beta, upper_beta) = distribution.support();
        let integral = integrate_composite_five_point_gauss_legendre(
            |beta| distribution.density(beta),
            lower_beta,
            upper_beta,
            400,
        );
        assert_abs_diff_eq!(integral, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn unit_index_uses_logarithmic_normalization() {
        let distribution = PowerLaw::new(1.0, &config(1.0, fsz::exp(2.0))).unwrap();
        assert_relative_eq!(distribution.normalization(), 0.5, max_relative = 1e-14);
    }

    #[test]
    fn density_vanishes_outside_cut_offs() {
        let distribution = PowerLaw::new(2.0, &config(2.0, 10.0)).unwrap();
        assert_eq!(distribution.density_per_gamma(1.5), 0.0);
        assert_eq!(distribution.density_per_gamma(11.0), 0.0);
        assert_eq!(distribution.density(gamma_to_beta(1.5)), 0.0);
        assert!(distribution.density(gamma_to_beta(5.0)) > 0.0);
    }

    #[test]
    fn degenerate_range_is_rejected() {
        for alpha in [1.0, 2.5] {
            assert!(matches!(
                PowerLaw::new(alpha, &config(2.0, 2.0)),
                Err(SzError::DegenerateNormalization { .. })
            ));
        }
        assert!(PowerLaw::new(2.5, &config(0.5, 2.0)).is_err());
        assert!(PowerLaw::new(2.5, &config(3.0, 2.0)).is_err());
        assert!(PowerLaw::new(fsz::NAN, &PowerLawConfig::default()).is_err());
    }

    #[test]
    fn default_range_ends_where_largest_shift_is_reached() {
        let config = PowerLawConfig::default();
        assert_eq!(config.lower_gamma, 1.0);
        assert_relative_eq!(config.upper_gamma, 74.209_948_524_787_85, max_relative = 1e-12);
        let distribution = PowerLaw::new(1.0, &config).unwrap();
        let (_, upper_beta) = distribution.support();
        assert_relative_eq!(
            crate::scattering::max_shift(upper_beta),
            MAX_POWER_LAW_SHIFT,
            max_relative = 1e-9
        );
    }
}
