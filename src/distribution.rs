//! Electron speed distributions.

pub mod maxwell_juttner;
pub mod power_law;

use self::{
    maxwell_juttner::MaxwellJuttner,
    power_law::{PowerLaw, PowerLawConfig},
};
use crate::{error::SzError, fsz, math::cell_widths, units::beta_to_gamma};
use std::fmt;

/// Defines a normalized probability density over electron speeds
/// (in units of the speed of light).
pub trait ElectronDistribution: Sync {
    /// Evaluates the probability density at the given speed.
    ///
    /// The density integrates to one over the supported speeds and vanishes
    /// outside them.
    fn density(&self, beta: fsz) -> fsz;

    /// Returns the lower and upper speed bounding the support of the density.
    fn support(&self) -> (fsz, fsz);
}

/// An electron population with either a thermal or a power-law speed distribution.
#[derive(Clone, Debug, PartialEq)]
pub enum Population {
    Thermal(MaxwellJuttner),
    PowerLaw(PowerLaw),
}

impl Population {
    /// Creates a thermal population with the given electron temperature [keV].
    pub fn thermal(temperature: fsz) -> Result<Self, SzError> {
        Ok(Self::Thermal(MaxwellJuttner::new(temperature)?))
    }

    /// Creates a power-law population with the given spectral index, covering
    /// the default range of Lorentz factors.
    pub fn power_law(alpha: fsz) -> Result<Self, SzError> {
        Ok(Self::PowerLaw(PowerLaw::new(alpha, &PowerLawConfig::default())?))
    }

    /// Evaluates the distribution on the given ascending grid of speeds,
    /// normalized so that the sum of the values times the cell widths is one.
    ///
    /// A power-law population is restricted to the range of speeds spanned by
    /// the grid.
    pub fn evaluate_on_grid(&self, beta: &[fsz]) -> Result<Vec<fsz>, SzError> {
        validate_beta_grid(beta)?;
        match self {
            Self::Thermal(distribution) => normalized_on_grid(distribution, beta),
            Self::PowerLaw(distribution) => {
                let config = PowerLawConfig {
                    lower_gamma: beta_to_gamma(beta[0]),
                    upper_gamma: beta_to_gamma(beta[beta.len() - 1]),
                };
                let restricted = PowerLaw::new(distribution.alpha(), &config)?;
                normalized_on_grid(&restricted, beta)
            }
        }
    }
}

impl ElectronDistribution for Population {
    fn density(&self, beta: fsz) -> fsz {
        match self {
            Self::Thermal(distribution) => distribution.density(beta),
            Self::PowerLaw(distribution) => distribution.density(beta),
        }
    }

    fn support(&self) -> (fsz, fsz) {
        match self {
            Self::Thermal(distribution) => distribution.support(),
            Self::PowerLaw(distribution) => distribution.support(),
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Thermal(distribution) => write!(
                f,
                "thermal electrons at {} keV",
                distribution.temperature()
            ),
            Self::PowerLaw(distribution) => write!(
                f,
                "power-law electrons with index {}",
                distribution.alpha()
            ),
        }
    }
}

/// Checks that the given speeds form an ascending grid of at least two
/// values in `[0, 1)`.
pub fn validate_beta_grid(beta: &[fsz]) -> Result<(), SzError> {
    if beta.is_empty() {
        return Err(SzError::EmptyGrid { what: "beta" });
    }
    if beta.len() < 2 {
        return Err(SzError::invalid(
            "number of beta values",
            beta.len() as fsz,
            "at least two",
        ));
    }
    if let Some(&value) = beta.iter().find(|value| !(0.0..1.0).contains(*value)) {
        return Err(SzError::invalid("electron speed", value, "in the range [0, 1)"));
    }
    if beta.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(SzError::invalid(
            "beta grid",
            fsz::NAN,
            "strictly ascending",
        ));
    }
    Ok(())
}

/// Evaluates the density of the given distribution on the grid and rescales it
/// so that the sum of the values times the cell widths is one.
pub fn normalized_on_grid<D>(distribution: &D, beta: &[fsz]) -> Result<Vec<fsz>, SzError>
where
    D: ElectronDistribution + ?Sized,
{
    let mut values: Vec<_> = beta
        .iter()
        .map(|&speed| distribution.density(speed))
        .collect();
    let integral: fsz = values
        .iter()
        .zip(cell_widths(beta))
        .map(|(value, width)| value * width)
        .sum();
    if !(integral.is_finite() && integral > 0.0) {
        return Err(SzError::invalid(
            "distribution integral over grid",
            integral,
            "finite and larger than zero",
        ));
    }
    values.iter_mut().for_each(|value| *value /= integral);
    Ok(values)
}
