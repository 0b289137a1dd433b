//! Relativistic thermal (Maxwell-Juttner) electron distribution.

use super::ElectronDistribution;
use crate::{
    constants::BETA_CEILING,
    error::{require_positive, SzError},
    fsz,
    math::bessel_k_scaled,
    units::{beta_to_gamma, kev_to_theta},
};

/// Speed distribution of electrons in thermal equilibrium at a relativistic
/// temperature.
///
/// The density is
/// `p(beta) = gamma^5*beta^2*exp(-gamma/theta)/(theta*K_2(1/theta))`,
/// where `theta = k*Te/(me*c^2)` is the dimensionless temperature.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxwellJuttner {
    temperature: fsz,
    theta: fsz,
    normalization: fsz,
}

impl MaxwellJuttner {
    /// Creates a new thermal distribution for the given electron temperature [keV].
    pub fn new(temperature: fsz) -> Result<Self, SzError> {
        require_positive("electron temperature", temperature)?;
        let theta = kev_to_theta(temperature);

        // Written in terms of K_2(x)*exp(x) so that cold distributions do not underflow
        let normalization = 1.0 / (theta * bessel_k_scaled(2, 1.0 / theta));
        if !(normalization.is_finite() && normalization > 0.0) {
            return Err(SzError::invalid(
                "electron temperature",
                temperature,
                "within the range where the distribution can be normalized",
            ));
        }

        Ok(Self {
            temperature,
            theta,
            normalization,
        })
    }

    /// Returns the electron temperature [keV].
    pub fn temperature(&self) -> fsz {
        self.temperature
    }

    /// Returns the dimensionless electron temperature.
    pub fn theta(&self) -> fsz {
        self.theta
    }
}

impl ElectronDistribution for MaxwellJuttner {
    fn density(&self, beta: fsz) -> fsz {
        if !(beta > 0.0 && beta < 1.0) {
            return 0.0;
        }
        let gamma = beta_to_gamma(beta);
        let boltzmann_factor = fsz::exp(-(gamma - 1.0) / self.theta);
        if boltzmann_factor == 0.0 {
            return 0.0;
        }
        self.normalization * gamma.powi(5) * beta * beta * boltzmann_factor
    }

    fn support(&self) -> (fsz, fsz) {
        (0.0, BETA_CEILING)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::math::midpoint_grid;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn integral(distribution: &MaxwellJuttner, n_cells: usize) -> fsz {
        let (beta, dbeta) = midpoint_grid(0.0, BETA_CEILING, n_cells);
        beta.iter()
            .map(|&speed| distribution.density(speed))
            .sum::<fsz>()
            * dbeta
    }

    #[test]
    fn distribution_is_normalized_without_rescaling() {
        for temperature in [1.0, 5.0, 15.33, 50.0, 200.0] {
            let distribution = MaxwellJuttner::new(temperature).unwrap();
            assert_abs_diff_eq!(integral(&distribution, 20000), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn non_relativistic_limit_matches_maxwellian() {
        let distribution = MaxwellJuttner::new(0.5).unwrap();
        let theta = distribution.theta();
        let beta: fsz = 0.03;
        let maxwellian = fsz::sqrt(2.0 / std::f64::consts::PI) * beta * beta
            / theta.powf(1.5)
            * fsz::exp(-0.5 * beta * beta / theta);
        assert_relative_eq!(distribution.density(beta), maxwellian, max_relative = 2e-2);
    }

    #[test]
    fn density_vanishes_outside_unit_interval() {
        let distribution = MaxwellJuttner::new(5.0).unwrap();
        assert_eq!(distribution.density(0.0), 0.0);
        assert_eq!(distribution.density(1.0), 0.0);
        assert_eq!(distribution.density(-0.2), 0.0);
        assert_eq!(distribution.density(BETA_CEILING), 0.0);
        assert!(distribution.density(0.2) > 0.0);
    }

    #[test]
    fn non_positive_temperature_is_rejected() {
        assert!(MaxwellJuttner::new(0.0).is_err());
        assert!(MaxwellJuttner::new(-1.0).is_err());
        assert!(MaxwellJuttner::new(fsz::NAN).is_err());
    }
}
