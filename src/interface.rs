//! Entry points writing into caller-owned buffers.
//!
//! Every function checks all its inputs, including the length of the output
//! buffer, before writing anything, so on error the buffer is left as it was.
//! Two-dimensional outputs are laid out in row-major order.

use crate::{
    background::CmbBackground,
    constants::KM_TO_M,
    distribution::Population,
    error::{require_length, SzError},
    fsz,
    io::Verbosity,
    kernel::{multi_electron_kernel_into, KernelConfig},
    kinematic::{kinematic_intensity_into, KinematicConfig},
    scattering::single_electron_kernel_into,
    screen::{IsoBetaParameters, OpticalDepthScreen, ScreenMode},
    synthesis::{SignalConfig, SinglePointing},
    transfer::{validate_frequencies, PrecisionWarning, Resolution, TransferConfig},
    units::velocity_to_beta,
};

/// Writes the single-electron kernel for speed `beta` at each shift in `s`.
pub fn thomson_scatter(s: &[fsz], beta: fsz, output: &mut [fsz], n_mu: usize) -> Result<(), SzError> {
    single_electron_kernel_into(s, beta, n_mu, output)
}

/// Writes the Maxwell-Juttner distribution for temperature `temperature`
/// [keV], normalized over the given speed grid.
pub fn maxwell_juttner(beta: &[fsz], temperature: fsz, output: &mut [fsz]) -> Result<(), SzError> {
    write_distribution(beta, &Population::thermal(temperature)?, output)
}

/// Writes the power-law distribution with index `alpha`, normalized over the
/// given speed grid.
pub fn power_law(beta: &[fsz], alpha: fsz, output: &mut [fsz]) -> Result<(), SzError> {
    write_distribution(beta, &Population::power_law(alpha)?, output)
}

/// Writes the multi-electron kernel of thermal electrons at temperature
/// `temperature` [keV].
pub fn multi_scattering_thermal(
    s: &[fsz],
    temperature: fsz,
    output: &mut [fsz],
    n_beta: usize,
    n_mu: usize,
) -> Result<(), SzError> {
    let population = Population::thermal(temperature)?;
    multi_electron_kernel_into(
        s,
        &population,
        &KernelConfig { n_beta, n_mu },
        &Verbosity::Quiet,
        output,
    )
}

/// Writes the multi-electron kernel of power-law electrons with index `alpha`.
pub fn multi_scattering_power_law(
    s: &[fsz],
    alpha: fsz,
    output: &mut [fsz],
    n_beta: usize,
    n_mu: usize,
) -> Result<(), SzError> {
    let population = Population::power_law(alpha)?;
    multi_electron_kernel_into(
        s,
        &population,
        &KernelConfig { n_beta, n_mu },
        &Verbosity::Quiet,
        output,
    )
}

/// Writes the signal of thermal electrons at temperature `temperature` [keV]
/// with optical depth `optical_depth`, with or without the background.
///
/// If a line-of-sight peculiar velocity `velocity` [km/s] is given, the
/// kinematic term of the same electrons is included.
pub fn signal_thermal(
    frequencies: &[fsz],
    temperature: fsz,
    velocity: Option<fsz>,
    optical_depth: fsz,
    output: &mut [fsz],
    resolution: &Resolution,
    include_background: bool,
) -> Result<Option<PrecisionWarning>, SzError> {
    write_signal(
        frequencies,
        Population::thermal(temperature)?,
        velocity,
        optical_depth,
        output,
        resolution,
        include_background,
    )
}

/// Writes the signal of power-law electrons with index `alpha` and optical
/// depth `optical_depth`, with or without the background and the kinematic
/// term for the peculiar velocity `velocity` [km/s].
pub fn signal_power_law(
    frequencies: &[fsz],
    alpha: fsz,
    velocity: Option<fsz>,
    optical_depth: fsz,
    output: &mut [fsz],
    resolution: &Resolution,
    include_background: bool,
) -> Result<Option<PrecisionWarning>, SzError> {
    write_signal(
        frequencies,
        Population::power_law(alpha)?,
        velocity,
        optical_depth,
        output,
        resolution,
        include_background,
    )
}

/// Writes the kinematic signal for a line-of-sight peculiar velocity
/// `velocity` [km/s], positive when receding.
pub fn signal_kinematic(
    frequencies: &[fsz],
    velocity: fsz,
    optical_depth: fsz,
    output: &mut [fsz],
    n_mu: usize,
) -> Result<(), SzError> {
    kinematic_intensity_into(
        frequencies,
        velocity_to_beta(velocity * KM_TO_M),
        optical_depth,
        &CmbBackground::default(),
        &KinematicConfig { n_mu },
        output,
    )
}

/// Writes the optical depth of an isothermal-beta cluster at the sky
/// positions given by the azimuth and elevation offsets [arcsec].
///
/// In grid mode the output holds `azimuths.len()*elevations.len()` values with
/// elevation varying fastest. In trace mode the offsets are paired and the
/// output holds one value per pair.
pub fn iso_beta(
    azimuths: &[fsz],
    elevations: &[fsz],
    parameters: &IsoBetaParameters,
    output: &mut [fsz],
    mode: ScreenMode,
) -> Result<(), SzError> {
    let expected_len = match mode {
        ScreenMode::Grid => azimuths.len() * elevations.len(),
        ScreenMode::Trace => azimuths.len(),
    };
    let screen = OpticalDepthScreen::isothermal_beta(parameters, azimuths, elevations, mode)?;
    require_length("screen output", expected_len, output.len())?;
    output
        .iter_mut()
        .zip(screen.optical_depths().iter())
        .for_each(|(value, &optical_depth)| *value = optical_depth);
    Ok(())
}

/// Writes the CMB specific intensity [W/(m^2 Hz sr)] at each frequency [Hz].
pub fn cmb(frequencies: &[fsz], output: &mut [fsz]) -> Result<(), SzError> {
    validate_frequencies(frequencies)?;
    require_length("background output", frequencies.len(), output.len())?;
    let background = CmbBackground::default();
    output
        .iter_mut()
        .zip(frequencies)
        .for_each(|(value, &frequency)| *value = background.specific_intensity(frequency));
    Ok(())
}

fn write_distribution(
    beta: &[fsz],
    population: &Population,
    output: &mut [fsz],
) -> Result<(), SzError> {
    require_length("distribution output", beta.len(), output.len())?;
    let values = population.evaluate_on_grid(beta)?;
    output.copy_from_slice(&values);
    Ok(())
}

fn write_signal(
    frequencies: &[fsz],
    population: Population,
    velocity: Option<fsz>,
    optical_depth: fsz,
    output: &mut [fsz],
    resolution: &Resolution,
    include_background: bool,
) -> Result<Option<PrecisionWarning>, SzError> {
    let pointing = SinglePointing::new(
        TransferConfig {
            resolution: resolution.clone(),
            ..TransferConfig::default()
        },
        KinematicConfig::default(),
        CmbBackground::default(),
        Verbosity::Quiet,
    )?;
    let signal = SignalConfig {
        population: Some(population),
        line_of_sight_beta: velocity.map(|velocity| velocity_to_beta(velocity * KM_TO_M)),
        optical_depth,
        include_background,
    };
    let report = pointing.signal_into(frequencies, &signal, output)?;
    Ok(report.and_then(|report| report.warning))
}
