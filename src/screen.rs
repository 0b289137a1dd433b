//! Optical depth screens of isothermal-beta cluster models.

use crate::{
    constants::{ARCSEC_TO_RAD, MPC_TO_M, PER_CM3_TO_PER_M3, PI, SIGMA_THOMSON},
    error::{require_length, require_non_negative, require_positive, SzError},
    fsz,
    math::gamma_ratio,
};
use ndarray::{Array1, Array2, ArrayD};
use std::{fmt, str::FromStr};

/// Parameters of an isothermal-beta cluster model.
///
/// The electron density falls off as `ne0*(1 + (r/rc)^2)^(-3*ibeta/2)`,
/// which projects to the optical depth
/// `tau(theta) = tau0*(1 + (theta/thetac)^2)^(1/2 - 3*ibeta/2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct IsoBetaParameters {
    /// Structural index of the density profile, must exceed 1/3.
    pub ibeta: fsz,
    /// Central electron density [1/cm^3].
    pub ne0: fsz,
    /// Angular core radius [arcsec].
    pub thetac: fsz,
    /// Angular diameter distance to the cluster [Mpc].
    pub da: fsz,
}

/// How azimuth and elevation coordinates are combined into sky positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenMode {
    /// Every combination of azimuth and elevation, giving a 2D screen indexed
    /// by `[azimuth, elevation]`.
    Grid,
    /// Pairs of azimuth and elevation with the same index, giving a 1D screen.
    Trace,
}

/// Optical depths over a set of sky positions.
#[derive(Clone, Debug, PartialEq)]
pub struct OpticalDepthScreen {
    mode: ScreenMode,
    optical_depths: ArrayD<fsz>,
}

impl IsoBetaParameters {
    /// Checks that all parameters are physically meaningful.
    pub fn validate(&self) -> Result<(), SzError> {
        if !(self.ibeta.is_finite() && self.ibeta > 1.0 / 3.0) {
            return Err(SzError::invalid(
                "structural index",
                self.ibeta,
                "finite and larger than 1/3",
            ));
        }
        require_non_negative("central electron density", self.ne0)?;
        require_positive("core radius", self.thetac)?;
        require_positive("angular diameter distance", self.da)
    }

    /// Computes the physical core radius [m].
    pub fn core_radius(&self) -> fsz {
        self.thetac * ARCSEC_TO_RAD * self.da * MPC_TO_M
    }

    /// Computes the optical depth through the cluster center,
    /// `tau0 = ne0*sigma_T*rc*sqrt(pi)*Gamma(3*ibeta/2 - 1/2)/Gamma(3*ibeta/2)`.
    pub fn central_optical_depth(&self) -> fsz {
        self.ne0
            * PER_CM3_TO_PER_M3
            * SIGMA_THOMSON
            * self.core_radius()
            * fsz::sqrt(PI)
            * gamma_ratio(1.5 * self.ibeta - 0.5, 1.5 * self.ibeta)
    }

    /// Computes the optical depth at the given angular offset [arcsec] from
    /// the cluster center.
    pub fn optical_depth(&self, offset: fsz) -> fsz {
        self.optical_depth_with_center(self.central_optical_depth(), offset)
    }

    fn optical_depth_with_center(&self, central_optical_depth: fsz, offset: fsz) -> fsz {
        let scaled_offset = offset / self.thetac;
        central_optical_depth
            * fsz::powf(
                1.0 + scaled_offset * scaled_offset,
                0.5 - 1.5 * self.ibeta,
            )
    }
}

impl OpticalDepthScreen {
    /// Computes the optical depth of the isothermal-beta model at the sky
    /// positions given by the azimuth and elevation offsets [arcsec] from the
    /// cluster center.
    pub fn isothermal_beta(
        parameters: &IsoBetaParameters,
        azimuths: &[fsz],
        elevations: &[fsz],
        mode: ScreenMode,
    ) -> Result<Self, SzError> {
        parameters.validate()?;
        validate_offsets("azimuth", azimuths)?;
        validate_offsets("elevation", elevations)?;
        if mode == ScreenMode::Trace {
            require_length("elevation offsets", azimuths.len(), elevations.len())?;
        }

        let tau0 = parameters.central_optical_depth();
        let tau = |az: fsz, el: fsz| {
            parameters.optical_depth_with_center(tau0, fsz::sqrt(az * az + el * el))
        };

        let optical_depths = match mode {
            ScreenMode::Grid => Array2::from_shape_fn((azimuths.len(), elevations.len()), |(i, j)| {
                tau(azimuths[i], elevations[j])
            })
            .into_dyn(),
            ScreenMode::Trace => Array1::from_shape_fn(azimuths.len(), |i| {
                tau(azimuths[i], elevations[i])
            })
            .into_dyn(),
        };
        Ok(Self {
            mode,
            optical_depths,
        })
    }

    /// Returns how the sky positions were combined.
    pub fn mode(&self) -> ScreenMode {
        self.mode
    }

    /// Returns the shape of the screen.
    pub fn shape(&self) -> &[usize] {
        self.optical_depths.shape()
    }

    /// Returns the number of sky positions.
    pub fn len(&self) -> usize {
        self.optical_depths.len()
    }

    /// Whether the screen has no sky positions.
    pub fn is_empty(&self) -> bool {
        self.optical_depths.is_empty()
    }

    /// Returns the optical depths.
    pub fn optical_depths(&self) -> &ArrayD<fsz> {
        &self.optical_depths
    }

    /// Returns the optical depths in row-major order.
    pub fn to_flat_vec(&self) -> Vec<fsz> {
        self.optical_depths.iter().copied().collect()
    }
}

fn validate_offsets(what: &'static str, offsets: &[fsz]) -> Result<(), SzError> {
    if offsets.is_empty() {
        return Err(SzError::EmptyGrid { what });
    }
    match offsets.iter().find(|offset| !offset.is_finite()) {
        Some(&offset) => Err(SzError::invalid(what, offset, "finite")),
        None => Ok(()),
    }
}

impl FromStr for ScreenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Self::Grid),
            "trace" => Ok(Self::Trace),
            _ => Err(format!("Invalid screen mode {}", s)),
        }
    }
}

impl fmt::Display for ScreenMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Grid => write!(f, "grid"),
            Self::Trace => write!(f, "trace"),
        }
    }
}
