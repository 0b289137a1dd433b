//! Thomson scattering of photons off a single electron.
//!
//! A photon scattered by an electron with speed `beta` (in units of the speed
//! of light) has its frequency changed by a factor `exp(s)`. The kernel
//! `P(s; beta)` is the probability density of the logarithmic frequency shift
//! `s` after one scattering, averaged over isotropic incoming photon directions.

use crate::{
    error::{require_length, SzError},
    fsz,
    math::cell_widths,
    units::beta_to_gamma,
};

/// Default number of scattering angle cosines used to evaluate the kernel.
pub const DEFAULT_N_MU: usize = 100;

/// Computes the largest logarithmic frequency shift `ln((1 + beta)/(1 - beta))`
/// that a single scattering off an electron with the given speed can produce.
pub fn max_shift(beta: fsz) -> fsz {
    fsz::ln((1.0 + beta) / (1.0 - beta))
}

/// Computes the smallest electron speed `(exp(|s|) - 1)/(exp(|s|) + 1)` able to
/// produce the given logarithmic frequency shift in a single scattering.
pub fn min_beta_for_shift(s: fsz) -> fsz {
    fsz::tanh(0.5 * fsz::abs(s))
}

/// Evaluates the single-electron kernel for the given shift and electron speed.
///
/// The kernel is integrated over the cosine `mu` of the angle between the
/// incoming photon and the electron velocity with a midpoint rule using
/// `n_mu` samples. It vanishes for shifts outside `|s| <= max_shift(beta)`.
///
/// For `beta = 0` the kernel is a Dirac delta at `s = 0`, which is returned as
/// zero for `s != 0` and infinity for `s = 0`.
///
/// The parameters must have passed `validate_kernel_parameters`.
pub(crate) fn thomson_kernel(s: fsz, beta: fsz, n_mu: usize) -> fsz {
    debug_assert!((0.0..1.0).contains(&beta));
    debug_assert!(n_mu > 0);

    if beta == 0.0 {
        return if s == 0.0 { fsz::INFINITY } else { 0.0 };
    }
    if fsz::abs(s) >= max_shift(beta) {
        return 0.0;
    }

    let gamma = beta_to_gamma(beta);
    let prefactor = 3.0 / (16.0 * gamma.powi(4) * beta);

    let exp_s = fsz::exp(s);
    let (mu_lower, mu_upper) = if s < 0.0 {
        (-1.0, (1.0 - (1.0 - beta) / exp_s) / beta)
    } else {
        ((1.0 - (1.0 + beta) / exp_s) / beta, 1.0)
    };
    let dmu = (mu_upper - mu_lower) / (n_mu as fsz);

    let integral: fsz = (0..n_mu)
        .map(|j| {
            let mu = mu_lower + ((j as fsz) + 0.5) * dmu;
            let mu_prime = (exp_s * (1.0 - beta * mu) - 1.0) / beta;
            let mu_sqr = mu * mu;
            let mu_prime_sqr = mu_prime * mu_prime;
            (1.0 + beta * mu_prime)
                * (1.0 + mu_sqr * mu_prime_sqr + 0.5 * (1.0 - mu_sqr) * (1.0 - mu_prime_sqr))
                / (1.0 - beta * mu).powi(3)
        })
        .sum::<fsz>()
        * dmu;

    if integral < 0.0 {
        0.0
    } else {
        prefactor * integral
    }
}

/// Checks that the given electron speed and number of angle samples are valid.
pub fn validate_kernel_parameters(beta: fsz, n_mu: usize) -> Result<(), SzError> {
    if !(0.0..1.0).contains(&beta) {
        return Err(SzError::invalid(
            "electron speed",
            beta,
            "in the range [0, 1)",
        ));
    }
    if n_mu == 0 {
        return Err(SzError::invalid(
            "number of scattering angles",
            0.0,
            "larger than zero",
        ));
    }
    Ok(())
}

/// Evaluates the single-electron kernel on the given ascending grid of shifts.
///
/// For `beta = 0` the Dirac delta is represented on the grid by the value
/// `1/ds` at the shift closest to zero, where `ds` is the width of the grid
/// cell, provided that zero lies within the grid.
pub fn single_electron_kernel(s: &[fsz], beta: fsz, n_mu: usize) -> Result<Vec<fsz>, SzError> {
    let mut output = vec![0.0; s.len()];
    single_electron_kernel_into(s, beta, n_mu, &mut output)?;
    Ok(output)
}

/// Like `single_electron_kernel`, but writes the result into the given buffer.
pub fn single_electron_kernel_into(
    s: &[fsz],
    beta: fsz,
    n_mu: usize,
    output: &mut [fsz],
) -> Result<(), SzError> {
    validate_kernel_parameters(beta, n_mu)?;
    require_length("kernel output", s.len(), output.len())?;

    if beta == 0.0 {
        output.iter_mut().for_each(|value| *value = 0.0);
        if let Some(idx) = index_of_delta(s) {
            output[idx] = 1.0 / cell_widths(s)[idx];
        }
    } else {
        output
            .iter_mut()
            .zip(s)
            .for_each(|(value, &shift)| *value = thomson_kernel(shift, beta, n_mu));
    }
    Ok(())
}

/// Finds the grid cell containing `s = 0`, if any.
fn index_of_delta(s: &[fsz]) -> Option<usize> {
    let widths = cell_widths(s);
    (0..s.len())
        .filter(|&idx| widths[idx] > 0.0 && fsz::abs(s[idx]) <= 0.5 * widths[idx])
        .min_by(|&a, &b| fsz::abs(s[a]).total_cmp(&fsz::abs(s[b])))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::math::midpoint_grid;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn kernel_integral(beta: fsz, n_mu: usize) -> fsz {
        let (s, ds) = midpoint_grid(-1.2, 2.4, 3000);
        single_electron_kernel(&s, beta, n_mu)
            .unwrap()
            .iter()
            .sum::<fsz>()
            * ds
    }

    #[test]
    fn kinematic_limits_are_consistent() {
        for beta in [0.01, 0.3, 0.9] {
            assert_relative_eq!(min_beta_for_shift(max_shift(beta)), beta, max_relative = 1e-12);
            assert_relative_eq!(
                min_beta_for_shift(-max_shift(beta)),
                beta,
                max_relative = 1e-12
            );
        }
        assert_eq!(min_beta_for_shift(0.0), 0.0);
    }

    #[test]
    fn kernel_vanishes_outside_kinematic_limits() {
        let beta = 0.2;
        let limit = max_shift(beta);
        assert_eq!(thomson_kernel(1.01 * limit, beta, 100), 0.0);
        assert_eq!(thomson_kernel(-1.01 * limit, beta, 100), 0.0);
        assert!(thomson_kernel(0.5 * limit, beta, 100) > 0.0);
        assert!(thomson_kernel(-0.5 * limit, beta, 100) > 0.0);
    }

    #[test]
    fn kernel_is_normalized() {
        for beta in [0.05, 0.1, 0.2, 0.3, 0.5] {
            assert_abs_diff_eq!(kernel_integral(beta, 1000), 1.0, epsilon = 2e-3);
        }
    }

    #[test]
    fn kernel_favors_upscattering() {
        let beta = 0.3;
        let s = 0.5 * max_shift(beta);
        assert!(thomson_kernel(s, beta, 200) > thomson_kernel(-s, beta, 200));
    }

    #[test]
    fn zero_speed_kernel_is_delta_at_zero_shift() {
        let (s, ds) = midpoint_grid(-1.0, 1.0, 101);
        let kernel = single_electron_kernel(&s, 0.0, 10).unwrap();
        assert_relative_eq!(kernel[50], 1.0 / ds, max_relative = 1e-12);
        assert_relative_eq!(kernel.iter().sum::<fsz>() * ds, 1.0, max_relative = 1e-12);
        assert_eq!(kernel.iter().filter(|&&value| value != 0.0).count(), 1);

        assert_eq!(thomson_kernel(0.1, 0.0, 10), 0.0);
        assert!(thomson_kernel(0.0, 0.0, 10).is_infinite());
    }

    #[test]
    fn invalid_kernel_parameters_are_rejected() {
        assert!(single_electron_kernel(&[0.0], 1.0, 10).is_err());
        assert!(single_electron_kernel(&[0.0], -0.1, 10).is_err());
        assert!(single_electron_kernel(&[0.0], 0.1, 0).is_err());
        assert!(single_electron_kernel(&[0.0], fsz::NAN, 10).is_err());
        let mut output = [3.0; 2];
        assert!(single_electron_kernel_into(&[0.0, 0.1], 1.5, 10, &mut output).is_err());
        assert!(single_electron_kernel_into(&[0.0, 0.1], 0.1, 0, &mut output).is_err());
        assert_eq!(output, [3.0; 2]);
        let mut output = [0.0; 2];
        assert!(matches!(
            single_electron_kernel_into(&[0.0, 0.1, 0.2], 0.1, 10, &mut output),
            Err(SzError::LengthMismatch { .. })
        ));
        assert_eq!(output, [0.0; 2]);
    }
}
