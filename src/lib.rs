//! The `mocksz` crate synthesizes Sunyaev-Zel'dovich distortions of the
//! cosmic microwave background.
//!
//! Photons of the CMB are Compton scattered by the free electrons of a hot
//! cluster plasma. The crate computes the single-electron Thomson kernel,
//! averages it over relativistic thermal or power-law electron populations,
//! and convolves the result with the CMB blackbody to give the thermal (tSZ)
//! and non-thermal (ntSZ) spectra. The kinematic (kSZ) term from the bulk
//! motion of the cluster is added in closed form, and spectra can be spread
//! over isothermal-beta optical depth screens to build maps and cubes.

pub mod background;
pub mod constants;
pub mod distribution;
pub mod error;
pub mod execution;
pub mod interface;
pub mod io;
pub mod kernel;
pub mod kinematic;
pub mod math;
pub mod scattering;
pub mod screen;
pub mod synthesis;
pub mod transfer;
pub mod units;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::SzError;

/// Floating-point precision to use for spectral quantities.
#[allow(non_camel_case_types)]
pub type fsz = f64;
