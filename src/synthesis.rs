//! Synthesis of SZ spectra for single pointings and of spectral cubes for
//! isothermal-beta clusters.

use crate::{
    background::CmbBackground,
    distribution::Population,
    error::{require_length, require_non_negative, SzError},
    fsz,
    io::Verbosity,
    kinematic::{kinematic_intensity, validate_line_of_sight_beta, KinematicConfig},
    screen::{IsoBetaParameters, OpticalDepthScreen, ScreenMode},
    transfer::{validate_frequencies, TransferConfig, TransferEngine, TransferReport},
};
use ndarray::{Array1, ArrayD, Axis, IxDyn, Zip};
use std::time::{Duration, Instant};

/// Which contributions to include in a single-pointing signal.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalConfig {
    /// Scattering electron population, giving the thermal or non-thermal term.
    pub population: Option<Population>,
    /// Bulk line-of-sight speed of the electrons in units of the speed of
    /// light (positive when receding), giving the kinematic term.
    pub line_of_sight_beta: Option<fsz>,
    /// Optical depth along the line of sight.
    pub optical_depth: fsz,
    /// Whether to add the undistorted background to the signal.
    pub include_background: bool,
}

/// Which contributions to include in a spectral cube. The optical depth is
/// taken from the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeConfig {
    pub population: Option<Population>,
    pub line_of_sight_beta: Option<fsz>,
    pub include_background: bool,
}

/// Computes spectra along a single line of sight.
#[derive(Clone, Debug)]
pub struct SinglePointing {
    transfer: TransferEngine,
    kinematic: KinematicConfig,
}

/// An isothermal-beta cluster whose optical depth screen modulates the
/// spectra of a single-pointing synthesizer.
#[derive(Clone, Debug)]
pub struct IsoBetaModel {
    parameters: IsoBetaParameters,
    pointing: SinglePointing,
}

impl SignalConfig {
    pub const DEFAULT_OPTICAL_DEPTH: fsz = 0.01;
    pub const DEFAULT_INCLUDE_BACKGROUND: bool = true;

    /// Checks that the optical depth and line-of-sight speed are valid.
    pub fn validate(&self) -> Result<(), SzError> {
        require_non_negative("optical depth", self.optical_depth)?;
        if let Some(beta) = self.line_of_sight_beta {
            validate_line_of_sight_beta(beta)?;
        }
        Ok(())
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            population: None,
            line_of_sight_beta: None,
            optical_depth: Self::DEFAULT_OPTICAL_DEPTH,
            include_background: Self::DEFAULT_INCLUDE_BACKGROUND,
        }
    }
}

impl CubeConfig {
    /// Returns the configuration of the spectrum for unit optical depth,
    /// without background.
    fn template_signal(&self) -> SignalConfig {
        SignalConfig {
            population: self.population.clone(),
            line_of_sight_beta: self.line_of_sight_beta,
            optical_depth: 1.0,
            include_background: false,
        }
    }
}

impl SinglePointing {
    /// Creates a new single-pointing synthesizer.
    pub fn new(
        transfer_config: TransferConfig,
        kinematic_config: KinematicConfig,
        background: CmbBackground,
        verbosity: Verbosity,
    ) -> Result<Self, SzError> {
        kinematic_config.validate()?;
        Ok(Self {
            transfer: TransferEngine::new(transfer_config, background, verbosity)?,
            kinematic: kinematic_config,
        })
    }

    /// Returns the engine computing the scattering term.
    pub fn transfer(&self) -> &TransferEngine {
        &self.transfer
    }

    /// Returns the incident background.
    pub fn background(&self) -> &CmbBackground {
        self.transfer.background()
    }

    /// Computes the specific intensity [W/(m^2 Hz sr)] at each frequency [Hz].
    ///
    /// The returned report is present when a population was included.
    pub fn signal(
        &self,
        frequencies: &[fsz],
        signal: &SignalConfig,
    ) -> Result<(Vec<fsz>, Option<TransferReport>), SzError> {
        let mut output = vec![0.0; frequencies.len()];
        let report = self.signal_into(frequencies, signal, &mut output)?;
        Ok((output, report))
    }

    /// Like `signal`, but writes the result into the given buffer.
    pub fn signal_into(
        &self,
        frequencies: &[fsz],
        signal: &SignalConfig,
        output: &mut [fsz],
    ) -> Result<Option<TransferReport>, SzError> {
        signal.validate()?;
        validate_frequencies(frequencies)?;
        require_length("signal output", frequencies.len(), output.len())?;

        let kinematic = match signal.line_of_sight_beta {
            Some(beta) => Some(kinematic_intensity(
                frequencies,
                beta,
                signal.optical_depth,
                self.background(),
                &self.kinematic,
            )?),
            None => None,
        };

        let report = match signal.population.as_ref() {
            Some(population) => Some(self.transfer.scattered_intensity_into(
                frequencies,
                population,
                signal.optical_depth,
                output,
            )?),
            None => {
                output.iter_mut().for_each(|value| *value = 0.0);
                None
            }
        };

        if let Some(kinematic) = kinematic {
            output
                .iter_mut()
                .zip(kinematic)
                .for_each(|(value, term)| *value += term);
        }
        if signal.include_background {
            let background = self.background();
            output
                .iter_mut()
                .zip(frequencies)
                .for_each(|(value, &frequency)| {
                    *value += background.specific_intensity(frequency)
                });
        }
        Ok(report)
    }
}

impl IsoBetaModel {
    /// Creates a new cluster model.
    pub fn new(parameters: IsoBetaParameters, pointing: SinglePointing) -> Result<Self, SzError> {
        parameters.validate()?;
        Ok(Self {
            parameters,
            pointing,
        })
    }

    pub fn parameters(&self) -> &IsoBetaParameters {
        &self.parameters
    }

    pub fn pointing(&self) -> &SinglePointing {
        &self.pointing
    }

    /// Computes the optical depth screen at the given azimuth and elevation
    /// offsets [arcsec].
    pub fn screen(
        &self,
        azimuths: &[fsz],
        elevations: &[fsz],
        mode: ScreenMode,
    ) -> Result<OpticalDepthScreen, SzError> {
        OpticalDepthScreen::isothermal_beta(&self.parameters, azimuths, elevations, mode)
    }

    /// Computes the scattering distortion by the given population at every
    /// sky position and frequency.
    pub fn thermal_map(
        &self,
        frequencies: &[fsz],
        screen: &OpticalDepthScreen,
        population: &Population,
    ) -> Result<(ArrayD<fsz>, Option<TransferReport>), SzError> {
        self.cube(
            frequencies,
            screen,
            &CubeConfig {
                population: Some(population.clone()),
                line_of_sight_beta: None,
                include_background: false,
            },
        )
    }

    /// Computes the kinematic distortion for the given line-of-sight speed at
    /// every sky position and frequency.
    pub fn kinematic_map(
        &self,
        frequencies: &[fsz],
        screen: &OpticalDepthScreen,
        line_of_sight_beta: fsz,
    ) -> Result<ArrayD<fsz>, SzError> {
        let (cube, _) = self.cube(
            frequencies,
            screen,
            &CubeConfig {
                population: None,
                line_of_sight_beta: Some(line_of_sight_beta),
                include_background: false,
            },
        )?;
        Ok(cube)
    }

    /// Computes the specific intensity at every sky position of the screen and
    /// every frequency.
    ///
    /// The cube has the shape of the screen with an extra last axis for
    /// frequency. The spectrum for unit optical depth is scaled by the optical
    /// depth at each position, and the background is added afterwards.
    pub fn cube(
        &self,
        frequencies: &[fsz],
        screen: &OpticalDepthScreen,
        config: &CubeConfig,
    ) -> Result<(ArrayD<fsz>, Option<TransferReport>), SzError> {
        let (template, report) = self
            .pointing
            .signal(frequencies, &config.template_signal())?;
        let template = Array1::from(template);
        let background = Array1::from(if config.include_background {
            self.pointing.background().specific_intensities(frequencies)
        } else {
            vec![0.0; frequencies.len()]
        });

        let mut shape = screen.shape().to_vec();
        shape.push(frequencies.len());
        let mut cube = ArrayD::zeros(IxDyn(&shape));
        let frequency_axis = Axis(shape.len() - 1);

        Zip::from(cube.lanes_mut(frequency_axis))
            .and(screen.optical_depths())
            .par_for_each(|mut spectrum, &optical_depth| {
                Zip::from(&mut spectrum)
                    .and(&template)
                    .and(&background)
                    .for_each(|value, &term, &unscattered| {
                        *value = optical_depth * term + unscattered
                    });
            });
        Ok((cube, report))
    }
}

/// Calls the given closure and returns its result together with the elapsed
/// wall-clock time.
pub fn timed<R, F>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{math::linear_grid, transfer::Resolution};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn pointing() -> SinglePointing {
        SinglePointing::new(
            TransferConfig {
                resolution: Resolution::Fixed {
                    n_s: 120,
                    kernel: crate::kernel::KernelConfig {
                        n_beta: 80,
                        n_mu: 80,
                    },
                },
                ..TransferConfig::default()
            },
            KinematicConfig::default(),
            CmbBackground::default(),
            Verbosity::Quiet,
        )
        .unwrap()
    }

    fn model() -> IsoBetaModel {
        IsoBetaModel::new(
            IsoBetaParameters {
                ibeta: 0.7,
                ne0: 0.012,
                thetac: 15.0,
                da: 1500.0,
            },
            pointing(),
        )
        .unwrap()
    }

    #[test]
    fn zero_optical_depth_gives_background() {
        let frequencies = linear_grid(100e9, 500e9, 7);
        let signal = SignalConfig {
            population: Some(Population::thermal(15.33).unwrap()),
            line_of_sight_beta: Some(1e-3),
            optical_depth: 0.0,
            include_background: true,
        };
        let (intensity, report) = pointing().signal(&frequencies, &signal).unwrap();
        assert!(report.is_some());
        assert_eq!(
            intensity,
            CmbBackground::default().specific_intensities(&frequencies)
        );
    }

    #[test]
    fn zero_optical_depth_gives_background_at_extreme_frequencies() {
        let frequencies = [0.0, 150e9, 5e13];
        let signal = SignalConfig {
            population: None,
            line_of_sight_beta: Some(1e-3),
            optical_depth: 0.0,
            include_background: true,
        };
        let (intensity, _) = pointing().signal(&frequencies, &signal).unwrap();
        assert_eq!(
            intensity,
            CmbBackground::default().specific_intensities(&frequencies)
        );
        assert_eq!(intensity[0], 0.0);
        assert_eq!(intensity[2], 0.0);
    }

    #[test]
    fn background_toggle_adds_background() {
        let pointing = pointing();
        let frequencies = linear_grid(100e9, 500e9, 25);
        let mut signal = SignalConfig {
            population: Some(Population::thermal(15.33).unwrap()),
            ..SignalConfig::default()
        };
        let (with_background, _) = pointing.signal(&frequencies, &signal).unwrap();
        signal.include_background = false;
        let (without_background, _) = pointing.signal(&frequencies, &signal).unwrap();
        let background = pointing.background().specific_intensities(&frequencies);
        for i in 0..frequencies.len() {
            assert_relative_eq!(
                with_background[i] - without_background[i],
                background[i],
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn signal_sums_thermal_and_kinematic_terms() {
        let pointing = pointing();
        let frequencies = [150e9, 350e9];
        let population = Population::thermal(5.0).unwrap();
        let (thermal, _) = pointing
            .transfer()
            .scattered_intensity(&frequencies, &population, 0.01)
            .unwrap();
        let kinematic = kinematic_intensity(
            &frequencies,
            -1e-3,
            0.01,
            pointing.background(),
            &KinematicConfig::default(),
        )
        .unwrap();
        let (total, _) = pointing
            .signal(
                &frequencies,
                &SignalConfig {
                    population: Some(population),
                    line_of_sight_beta: Some(-1e-3),
                    optical_depth: 0.01,
                    include_background: false,
                },
            )
            .unwrap();
        for i in 0..2 {
            assert_relative_eq!(total[i], thermal[i] + kinematic[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn invalid_signal_leaves_output_untouched() {
        let pointing = pointing();
        let mut output = [5.0; 2];
        let signal = SignalConfig {
            line_of_sight_beta: Some(1.5),
            ..SignalConfig::default()
        };
        assert!(pointing
            .signal_into(&[1e11, 2e11], &signal, &mut output)
            .is_err());
        assert!(pointing
            .signal_into(&[1e11], &SignalConfig::default(), &mut output)
            .is_err());
        assert_eq!(output, [5.0; 2]);
    }

    #[test]
    fn cube_broadcasts_template_over_screen() {
        let model = model();
        let frequencies = [150e9, 220e9, 350e9];
        let screen = model
            .screen(&[-20.0, 0.0, 20.0, 40.0], &[-10.0, 0.0, 10.0], ScreenMode::Grid)
            .unwrap();
        let population = Population::thermal(10.0).unwrap();
        let (thermal, _) = model
            .thermal_map(&frequencies, &screen, &population)
            .unwrap();
        assert_eq!(thermal.shape(), &[4, 3, 3]);

        let (template, _) = model
            .pointing()
            .signal(
                &frequencies,
                &SignalConfig {
                    population: Some(population.clone()),
                    line_of_sight_beta: None,
                    optical_depth: 1.0,
                    include_background: false,
                },
            )
            .unwrap();
        let tau = screen.optical_depths()[[3, 2]];
        for (k, &term) in template.iter().enumerate() {
            assert_relative_eq!(thermal[[3, 2, k]], tau * term, max_relative = 1e-12);
        }

        let (with_background, _) = model
            .cube(
                &frequencies,
                &screen,
                &CubeConfig {
                    population: Some(population),
                    line_of_sight_beta: None,
                    include_background: true,
                },
            )
            .unwrap();
        let background = model.pointing().background().specific_intensities(&frequencies);
        for (k, &background) in background.iter().enumerate() {
            assert_relative_eq!(
                with_background[[1, 1, k]] - thermal[[1, 1, k]],
                background,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn kinematic_map_follows_trace_screen() {
        let model = model();
        let screen = model
            .screen(&[0.0, 15.0, 60.0], &[0.0, 0.0, 0.0], ScreenMode::Trace)
            .unwrap();
        let map = model.kinematic_map(&[150e9, 250e9], &screen, 2e-3).unwrap();
        assert_eq!(map.shape(), &[3, 2]);
        assert!(map[[0, 0]] < map[[1, 0]] && map[[1, 0]] < map[[2, 0]] && map[[2, 0]] < 0.0);
        assert_abs_diff_eq!(
            map[[1, 1]] / map[[0, 1]],
            screen.optical_depths()[[1]] / screen.optical_depths()[[0]],
            epsilon = 1e-12
        );
    }

    #[test]
    fn timer_returns_result() {
        let (value, elapsed) = timed(|| 6 * 7);
        assert_eq!(value, 42);
        assert!(elapsed.as_secs() < 60);
    }
}
