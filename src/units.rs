//! Conversions between the physical units used in SZ synthesis.

use crate::constants::{
    fcn, ARCSEC_TO_RAD, CLIGHT, HPLANCK, KBOLTZMANN, KEV_TO_J, MC2_ELECTRON, PC_TO_M, SI_TO_JY,
    T_CMB,
};

/// Floating-point precision to use for units.
#[allow(non_camel_case_types)]
pub type fun = f64;

/// Converts an energy in keV to the equivalent temperature [K].
pub fn kev_to_kelvin(energy_kev: fun) -> fun {
    energy_kev * ((KEV_TO_J / KBOLTZMANN) as fun)
}

/// Converts an electron temperature [K] to the dimensionless temperature
/// `theta = k*Te/(me*c^2)`.
pub fn kelvin_to_theta(temperature: fun) -> fun {
    temperature * ((KBOLTZMANN / MC2_ELECTRON) as fun)
}

/// Converts an electron temperature in keV to the dimensionless temperature.
pub fn kev_to_theta(energy_kev: fun) -> fun {
    energy_kev * ((KEV_TO_J / MC2_ELECTRON) as fun)
}

/// Converts a velocity [m/s] to a speed in units of the speed of light.
pub fn velocity_to_beta(velocity: fun) -> fun {
    velocity / (CLIGHT as fun)
}

/// Computes the Lorentz factor `1/sqrt(1 - beta^2)`.
pub fn beta_to_gamma(beta: fun) -> fun {
    1.0 / fun::sqrt(1.0 - beta * beta)
}

/// Computes the squared Lorentz factor `1/(1 - beta^2)`.
pub fn beta_to_gamma_squared(beta: fun) -> fun {
    1.0 / (1.0 - beta * beta)
}

/// Computes the speed in units of the speed of light from a Lorentz factor.
pub fn gamma_to_beta(gamma: fun) -> fun {
    fun::sqrt(1.0 - 1.0 / (gamma * gamma))
}

/// Computes the Lorentz factor of a velocity [m/s].
pub fn velocity_to_gamma(velocity: fun) -> fun {
    beta_to_gamma(velocity_to_beta(velocity))
}

/// Converts a frequency [Hz] to the dimensionless frequency `x = h*nu/(k*T_CMB)`.
pub fn frequency_to_x(frequency: fun) -> fun {
    frequency * ((HPLANCK / (KBOLTZMANN * T_CMB)) as fun)
}

/// Converts a dimensionless frequency back to a frequency [Hz].
pub fn x_to_frequency(x: fun) -> fun {
    x * ((KBOLTZMANN * T_CMB / HPLANCK) as fun)
}

/// Converts a specific intensity in SI units [W/(m^2 Hz sr)] to Jansky per steradian.
pub fn si_to_jansky_per_steradian(intensity: fun) -> fun {
    intensity * (SI_TO_JY as fun)
}

/// Converts a specific intensity in SI units at the given frequency [Hz] to
/// the brightness temperature [K] of the blackbody with that intensity.
pub fn si_to_brightness_temperature(intensity: fun, frequency: fun) -> fun {
    let h = HPLANCK as fcn;
    let c = CLIGHT as fcn;
    (h * frequency / (KBOLTZMANN as fcn))
        / fun::ln_1p(2.0 * h * frequency.powi(3) / (intensity * c * c))
}

/// Converts a length in parsecs to meters.
pub fn parsec_to_meter(length: fun) -> fun {
    length * (PC_TO_M as fun)
}

/// Converts an angle in arcseconds to radians.
pub fn arcsec_to_radian(angle: fun) -> fun {
    angle * (ARCSEC_TO_RAD as fun)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::background::CmbBackground;
    use approx::assert_abs_diff_eq;

    #[test]
    fn energy_converts_to_temperature() {
        assert_abs_diff_eq!(kev_to_kelvin(1e-3), 1.1604518e4, epsilon = 1e-3);
        assert_abs_diff_eq!(
            kev_to_theta(511.0),
            kelvin_to_theta(kev_to_kelvin(511.0)),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(kev_to_theta(510.998_95), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn lorentz_factor_round_trips() {
        assert_eq!(beta_to_gamma(0.0), 1.0);
        assert_abs_diff_eq!(beta_to_gamma(0.6), 1.25, epsilon = 1e-14);
        assert_abs_diff_eq!(gamma_to_beta(1.25), 0.6, epsilon = 1e-14);
        assert_abs_diff_eq!(velocity_to_gamma(0.0), 1.0);
        assert_abs_diff_eq!(velocity_to_beta(CLIGHT / 2.0), 0.5);
    }

    #[test]
    fn lengths_and_angles_convert() {
        assert_abs_diff_eq!(parsec_to_meter(1.0) * 1e-16, 3.0857, epsilon = 1e-3);
        assert_abs_diff_eq!(arcsec_to_radian(3600.0 * 180.0), std::f64::consts::PI);
        assert_abs_diff_eq!(si_to_jansky_per_steradian(1.0) * 1e-26, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(x_to_frequency(frequency_to_x(150e9)), 150e9, epsilon = 1e-3);
    }

    #[test]
    fn cmb_has_cmb_brightness_temperature() {
        let cmb = CmbBackground::default();
        for frequency in [1e9, 30e9, 150e9, 600e9] {
            let temperature =
                si_to_brightness_temperature(cmb.specific_intensity(frequency), frequency);
            assert_abs_diff_eq!(temperature, T_CMB, epsilon = 1e-9);
        }
    }
}
