//! Radiative transfer of background radiation through an optically thin
//! population of scattering electrons.
//!
//! To first order in the optical depth `tau`, the change in specific intensity is
//! `dI(nu) = tau*(int P1(s)*I(nu*exp(-s)) ds - I(nu))`, where `P1` is the
//! multi-electron kernel and `I` the intensity of the incident background.

use crate::{
    background::CmbBackground,
    constants::MAX_POWER_LAW_SHIFT,
    distribution::Population,
    error::{require_length, require_non_negative, require_positive, SzError},
    fsz,
    io::Verbosity,
    kernel::{multi_electron_kernel, multi_electron_kernel_value, KernelConfig},
    math::{
        midpoint_grid,
        romberg::{self, RecordedRomberg},
    },
};
use rayon::prelude::*;
use std::fmt;

/// Ranges of logarithmic frequency shifts to integrate the kernel over.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftGridConfig {
    /// Range of shifts used for thermal populations.
    pub thermal_range: (fsz, fsz),
    /// Range of shifts used for power-law populations, which extends further
    /// towards upscattering to cover the high-energy tail.
    pub power_law_range: (fsz, fsz),
}

/// How finely the transfer integral is resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// Integrate with a midpoint rule over `n_s` shifts, using the given
    /// resolution for the multi-electron kernel.
    Fixed { n_s: usize, kernel: KernelConfig },
    /// Integrate with Romberg's method until the requested relative accuracy
    /// is reached or `max_rows` rows of the Richardson table have been used.
    Accuracy {
        relative_accuracy: fsz,
        max_rows: usize,
    },
}

/// Configuration parameters for the transfer engine.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferConfig {
    pub shift_grid: ShiftGridConfig,
    pub resolution: Resolution,
    /// Largest deviation of the kernel integral from one accepted without a
    /// warning at fixed resolution.
    pub normalization_tolerance: fsz,
}

/// Notice that a result did not reach the requested accuracy.
///
/// At fixed resolution the accuracy is measured by how far the integral of
/// the multi-electron kernel deviates from one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrecisionWarning {
    /// The relative accuracy that was requested.
    pub requested: fsz,
    /// The estimated relative accuracy that was achieved.
    pub achieved: fsz,
    /// Number of Romberg rows used, if the integral was accuracy-controlled.
    pub n_rows: Option<usize>,
}

/// Information about a completed transfer computation.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferReport {
    /// Integral of the multi-electron kernel over the shift range, ideally one.
    pub kernel_integral: fsz,
    /// Number of shifts at which the multi-electron kernel was evaluated.
    pub n_kernel_evaluations: usize,
    /// Present if the requested accuracy was not reached.
    pub warning: Option<PrecisionWarning>,
}

/// Computes the intensity scattered by electron populations.
#[derive(Clone, Debug)]
pub struct TransferEngine {
    config: TransferConfig,
    background: CmbBackground,
    verbosity: Verbosity,
}

/// Multi-electron kernel sampled over the shift range.
enum SampledKernel {
    Grid { shifts: Vec<fsz>, values: Vec<fsz>, ds: fsz },
    Romberg(RecordedRomberg),
}

impl ShiftGridConfig {
    pub const DEFAULT_THERMAL_RANGE: (fsz, fsz) = (-1.5, 2.5);
    pub const DEFAULT_POWER_LAW_RANGE: (fsz, fsz) = (-1.5, MAX_POWER_LAW_SHIFT);

    /// Returns the range of shifts to use for the given population.
    pub fn range_for(&self, population: &Population) -> (fsz, fsz) {
        match population {
            Population::Thermal(_) => self.thermal_range,
            Population::PowerLaw(_) => self.power_law_range,
        }
    }

    /// Checks that both ranges are finite and non-empty.
    pub fn validate(&self) -> Result<(), SzError> {
        for (start, end) in [self.thermal_range, self.power_law_range] {
            if let Some(bound) = [start, end].into_iter().find(|bound| !bound.is_finite()) {
                return Err(SzError::invalid("shift range bound", bound, "finite"));
            }
            if end <= start {
                return Err(SzError::invalid(
                    "upper shift range bound",
                    end,
                    "larger than the lower bound",
                ));
            }
        }
        Ok(())
    }
}

impl Default for ShiftGridConfig {
    fn default() -> Self {
        ShiftGridConfig {
            thermal_range: Self::DEFAULT_THERMAL_RANGE,
            power_law_range: Self::DEFAULT_POWER_LAW_RANGE,
        }
    }
}

impl Resolution {
    pub const DEFAULT_N_S: usize = 200;
    pub const DEFAULT_MAX_ROWS: usize = 12;

    /// Largest supported number of Romberg rows.
    pub const MAX_ROWS_LIMIT: usize = 24;

    /// Creates an accuracy-controlled resolution with the default row limit.
    pub fn with_relative_accuracy(relative_accuracy: fsz) -> Self {
        Self::Accuracy {
            relative_accuracy,
            max_rows: Self::DEFAULT_MAX_ROWS,
        }
    }

    /// Checks that the resolution parameters are valid.
    pub fn validate(&self) -> Result<(), SzError> {
        match self {
            Self::Fixed { n_s, kernel } => {
                if *n_s == 0 {
                    return Err(SzError::invalid(
                        "number of shifts",
                        0.0,
                        "larger than zero",
                    ));
                }
                kernel.validate()
            }
            Self::Accuracy {
                relative_accuracy,
                max_rows,
            } => {
                if !(relative_accuracy.is_finite()
                    && *relative_accuracy > 0.0
                    && *relative_accuracy < 1.0)
                {
                    return Err(SzError::invalid(
                        "relative accuracy",
                        *relative_accuracy,
                        "in the range (0, 1)",
                    ));
                }
                if *max_rows < romberg::MIN_ROWS || *max_rows > Self::MAX_ROWS_LIMIT {
                    return Err(SzError::invalid(
                        "maximum number of Romberg rows",
                        *max_rows as fsz,
                        "between 5 and 24",
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::Fixed {
            n_s: Self::DEFAULT_N_S,
            kernel: KernelConfig::default(),
        }
    }
}

impl TransferConfig {
    pub const DEFAULT_NORMALIZATION_TOLERANCE: fsz = 1e-2;

    /// Checks that all configuration parameters are valid.
    pub fn validate(&self) -> Result<(), SzError> {
        self.shift_grid.validate()?;
        self.resolution.validate()?;
        require_positive("normalization tolerance", self.normalization_tolerance)
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            shift_grid: ShiftGridConfig::default(),
            resolution: Resolution::default(),
            normalization_tolerance: Self::DEFAULT_NORMALIZATION_TOLERANCE,
        }
    }
}

impl fmt::Display for PrecisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.n_rows {
            Some(n_rows) => write!(
                f,
                "Requested relative accuracy {:e} not reached after {} Romberg rows (estimated accuracy {:e})",
                self.requested, n_rows, self.achieved
            ),
            None => write!(
                f,
                "Scattering kernel integrates to one only within {:e}, exceeding the tolerance {:e} \
                 (increase the resolution or the shift range)",
                self.achieved, self.requested
            ),
        }
    }
}

impl SampledKernel {
    fn integral(&self) -> fsz {
        match self {
            Self::Grid { values, ds, .. } => values.iter().sum::<fsz>() * ds,
            Self::Romberg(romberg) => romberg.estimate(),
        }
    }

    fn n_evaluations(&self) -> usize {
        match self {
            Self::Grid { values, .. } => values.len(),
            Self::Romberg(romberg) => romberg.n_samples(),
        }
    }

    /// Integrates the kernel times the given weight function over the shifts.
    fn integrate_weighted<W>(&self, weight: W) -> fsz
    where
        W: Fn(fsz) -> fsz,
    {
        match self {
            Self::Grid { shifts, values, ds } => {
                shifts
                    .iter()
                    .zip(values)
                    .map(|(&s, &value)| value * weight(s))
                    .sum::<fsz>()
                    * ds
            }
            Self::Romberg(romberg) => romberg.replay(weight),
        }
    }
}

impl TransferEngine {
    /// Creates a new transfer engine with the given configuration.
    pub fn new(
        config: TransferConfig,
        background: CmbBackground,
        verbosity: Verbosity,
    ) -> Result<Self, SzError> {
        config.validate()?;
        Ok(Self {
            config,
            background,
            verbosity,
        })
    }

    /// Returns the configuration of the engine.
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Returns the incident background.
    pub fn background(&self) -> &CmbBackground {
        &self.background
    }

    /// Computes the change in specific intensity [W/(m^2 Hz sr)] at each frequency
    /// [Hz] due to scattering by the given population with the given optical depth.
    pub fn scattered_intensity(
        &self,
        frequencies: &[fsz],
        population: &Population,
        optical_depth: fsz,
    ) -> Result<(Vec<fsz>, TransferReport), SzError> {
        let mut output = vec![0.0; frequencies.len()];
        let report =
            self.scattered_intensity_into(frequencies, population, optical_depth, &mut output)?;
        Ok((output, report))
    }

    /// Like `scattered_intensity`, but writes the result into the given buffer.
    pub fn scattered_intensity_into(
        &self,
        frequencies: &[fsz],
        population: &Population,
        optical_depth: fsz,
        output: &mut [fsz],
    ) -> Result<TransferReport, SzError> {
        validate_frequencies(frequencies)?;
        require_non_negative("optical depth", optical_depth)?;
        require_length("intensity output", frequencies.len(), output.len())?;

        let kernel = self.sample_kernel(population)?;
        let kernel_integral = kernel.integral();
        let warning = self.check_precision(&kernel, kernel_integral);
        if let Some(warning) = warning.as_ref() {
            if self.verbosity.print_messages() {
                eprintln!("Warning: {}", warning);
            }
        }

        if self.verbosity.print_messages() {
            println!(
                "Integrating scattered background at {} frequencies",
                frequencies.len()
            );
        }
        let background = self.background;
        output
            .par_iter_mut()
            .zip(frequencies.par_iter())
            .for_each(|(intensity, &frequency)| {
                let scattered = kernel
                    .integrate_weighted(|s| background.specific_intensity(frequency * fsz::exp(-s)));
                *intensity = optical_depth * (scattered - background.specific_intensity(frequency));
            });

        Ok(TransferReport {
            kernel_integral,
            n_kernel_evaluations: kernel.n_evaluations(),
            warning,
        })
    }

    /// Computes the multi-electron kernel at the shifts required by the
    /// configured resolution.
    fn sample_kernel(&self, population: &Population) -> Result<SampledKernel, SzError> {
        let (start, end) = self.config.shift_grid.range_for(population);
        match &self.config.resolution {
            Resolution::Fixed { n_s, kernel } => {
                if self.verbosity.print_messages() {
                    println!(
                        "Computing scattering kernel of {} at {} shifts",
                        population, n_s
                    );
                }
                let (shifts, ds) = midpoint_grid(start, end, *n_s);
                let values = multi_electron_kernel(&shifts, population, kernel, &self.verbosity)?;
                Ok(SampledKernel::Grid { shifts, values, ds })
            }
            Resolution::Accuracy {
                relative_accuracy,
                max_rows,
            } => {
                let kernel = KernelConfig::for_relative_accuracy(*relative_accuracy);
                if self.verbosity.print_messages() {
                    println!(
                        "Computing scattering kernel of {} to relative accuracy {:e}",
                        population, relative_accuracy
                    );
                }
                let romberg = RecordedRomberg::integrate(
                    |shifts| {
                        shifts
                            .par_iter()
                            .map(|&s| multi_electron_kernel_value(s, population, &kernel))
                            .collect()
                    },
                    start,
                    end,
                    *relative_accuracy,
                    *max_rows,
                );
                if self.verbosity.print_messages() {
                    println!(
                        "Used {} Romberg rows ({} shifts)",
                        romberg.n_rows(),
                        romberg.n_samples()
                    );
                }
                Ok(SampledKernel::Romberg(romberg))
            }
        }
    }

    fn check_precision(
        &self,
        kernel: &SampledKernel,
        kernel_integral: fsz,
    ) -> Option<PrecisionWarning> {
        let normalization_error = fsz::abs(kernel_integral - 1.0);
        let (relative_accuracy, romberg) = match (&self.config.resolution, kernel) {
            (
                Resolution::Accuracy {
                    relative_accuracy, ..
                },
                SampledKernel::Romberg(romberg),
            ) => (*relative_accuracy, romberg),
            _ => {
                let tolerance = self.config.normalization_tolerance;
                return if normalization_error.is_nan() || normalization_error > tolerance {
                    Some(PrecisionWarning {
                        requested: tolerance,
                        achieved: normalization_error,
                        n_rows: None,
                    })
                } else {
                    None
                };
            }
        };
        if !romberg.converged() {
            Some(PrecisionWarning {
                requested: relative_accuracy,
                achieved: fsz::max(romberg.achieved_relative_accuracy(), normalization_error),
                n_rows: Some(romberg.n_rows()),
            })
        } else if normalization_error > relative_accuracy {
            Some(PrecisionWarning {
                requested: relative_accuracy,
                achieved: normalization_error,
                n_rows: Some(romberg.n_rows()),
            })
        } else {
            None
        }
    }
}

/// Checks that all frequencies are finite and non-negative.
pub fn validate_frequencies(frequencies: &[fsz]) -> Result<(), SzError> {
    match frequencies
        .iter()
        .find(|frequency| !(frequency.is_finite() && **frequency >= 0.0))
    {
        Some(&frequency) => Err(SzError::invalid(
            "frequency",
            frequency,
            "finite and larger than or equal to zero",
        )),
        None => Ok(()),
    }
}
