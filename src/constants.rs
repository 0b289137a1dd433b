//! Physical and mathematical constants.
//!
//! All physical constants are in SI units.

/// Floating-point precision to use for constants.
#[allow(non_camel_case_types)]
pub type fcn = f64;

// Mathematical constants

pub const PI: fcn = std::f64::consts::PI;

// Physical constants

/// Planck constant [J s].
pub const HPLANCK: fcn = 6.626_070_15e-34;
/// Boltzmann constant [J/K].
pub const KBOLTZMANN: fcn = 1.380_649e-23;
/// Speed of light in vacuum [m/s].
pub const CLIGHT: fcn = 2.997_924_58e8;
/// Electron mass [kg].
pub const M_ELECTRON: fcn = 9.109_383_7e-31;
/// Electron rest energy [J].
pub const MC2_ELECTRON: fcn = M_ELECTRON * CLIGHT * CLIGHT;
/// Thomson scattering cross section [m^2].
pub const SIGMA_THOMSON: fcn = 6.652_45e-29;
/// Temperature of the cosmic microwave background [K].
pub const T_CMB: fcn = 2.726;

// Limits on electron speeds

/// Machine epsilon for double precision.
pub const DBL_EPSILON: fcn = f64::EPSILON;
/// Upper limit of the speed integral in the multi-electron kernel.
pub const BETA_CEILING: fcn = 1.0 - DBL_EPSILON;
/// Largest logarithmic frequency shift covered for power-law populations.
/// The default power law stops at the Lorentz factor `cosh(s/2)` able to
/// produce this shift.
pub const MAX_POWER_LAW_SHIFT: fcn = 10.0;

// Unit conversion factors

/// Conversion factor from electron volts to Joules.
pub const EV_TO_J: fcn = 1.602_176_634e-19;
/// Conversion factor from kilo electron volts to Joules.
pub const KEV_TO_J: fcn = EV_TO_J * 1e3;
/// Conversion factor from parsecs to meters.
pub const PC_TO_M: fcn = 3.0857e16;
/// Conversion factor from megaparsecs to meters.
pub const MPC_TO_M: fcn = PC_TO_M * 1e6;
/// Conversion factor from kilometers to meters.
pub const KM_TO_M: fcn = 1e3;
/// Conversion factor from gigahertz to hertz.
pub const GHZ_TO_HZ: fcn = 1e9;
/// Conversion factor from arcseconds to radians.
pub const ARCSEC_TO_RAD: fcn = PI / (180.0 * 3600.0);
/// Conversion factor from per cubic centimeter to per cubic meter.
pub const PER_CM3_TO_PER_M3: fcn = 1e6;
/// Conversion factor from SI specific intensity [W/(m^2 Hz sr)] to Jansky per steradian.
pub const SI_TO_JY: fcn = 1e26;
