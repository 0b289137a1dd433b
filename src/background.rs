//! Blackbody background radiation.

use crate::{
    constants::{CLIGHT, HPLANCK, KBOLTZMANN, T_CMB},
    error::{require_positive, SzError},
    fsz,
};

/// The cosmic microwave background, modeled as a blackbody.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CmbBackground {
    temperature: fsz,
}

impl CmbBackground {
    /// Creates a blackbody background with the given temperature [K].
    pub fn new(temperature: fsz) -> Result<Self, SzError> {
        require_positive("background temperature", temperature)?;
        Ok(Self { temperature })
    }

    /// Returns the temperature of the background [K].
    pub fn temperature(&self) -> fsz {
        self.temperature
    }

    /// Computes the dimensionless frequency `h*nu/(k*T)` for the given frequency [Hz].
    pub fn dimensionless_frequency(&self, frequency: fsz) -> fsz {
        (HPLANCK / (KBOLTZMANN * self.temperature)) * frequency
    }

    /// Computes the specific intensity [W/(m^2 Hz sr)] at the given frequency [Hz].
    ///
    /// Vanishes for non-positive frequencies.
    pub fn specific_intensity(&self, frequency: fsz) -> fsz {
        if frequency <= 0.0 {
            return 0.0;
        }
        let x = self.dimensionless_frequency(frequency);
        2.0 * HPLANCK * frequency.powi(3) / (CLIGHT * CLIGHT * fsz::exp_m1(x))
    }

    /// Computes the specific intensity at each of the given frequencies.
    pub fn specific_intensities(&self, frequencies: &[fsz]) -> Vec<fsz> {
        frequencies
            .iter()
            .map(|&frequency| self.specific_intensity(frequency))
            .collect()
    }
}

impl Default for CmbBackground {
    fn default() -> Self {
        Self {
            temperature: T_CMB,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cmb_intensity_peaks_near_160_ghz() {
        let cmb = CmbBackground::default();
        let intensities = cmb.specific_intensities(&[100e9, 160e9, 220e9]);
        assert!(intensities[1] > intensities[0]);
        assert!(intensities[1] > intensities[2]);
        // Peak value of about 385 MJy/sr
        assert_relative_eq!(intensities[1] * 1e26 * 1e-6, 385.0, max_relative = 2e-2);
    }

    #[test]
    fn intensity_approaches_rayleigh_jeans_limit() {
        let cmb = CmbBackground::default();
        let frequency = 1e8;
        let rayleigh_jeans = 2.0 * frequency * frequency * KBOLTZMANN * T_CMB / (CLIGHT * CLIGHT);
        assert_relative_eq!(
            cmb.specific_intensity(frequency),
            rayleigh_jeans,
            max_relative = 1e-3
        );
        assert_eq!(cmb.specific_intensity(0.0), 0.0);
        assert_eq!(cmb.specific_intensity(1e16), 0.0);
    }

    #[test]
    fn invalid_temperature_is_rejected() {
        assert!(CmbBackground::new(0.0).is_err());
        assert!(CmbBackground::new(-2.0).is_err());
        assert_eq!(CmbBackground::new(T_CMB).unwrap(), CmbBackground::default());
    }
}
