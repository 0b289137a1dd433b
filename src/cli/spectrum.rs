//! Command line interface for computing single-pointing spectra.

use super::utils::{
    add_population_arguments, create_flag_argument, create_output_file_argument,
    create_pair_argument, get_finite_float_value_from_parseable_argument,
    get_finite_float_value_from_required_parseable_argument, get_linear_grid_from_arguments,
    get_value_from_parseable_argument, get_value_from_required_parseable_argument,
    output_path_from_arguments, parse_verbosity, population_from_arguments, save_output,
};
use crate::{
    background::CmbBackground,
    constants::{GHZ_TO_HZ, KM_TO_M},
    execution::{Engine, SynthesisTask},
    exit_on_error, exit_with_error, fsz,
    io::Verbosity,
    kernel::KernelConfig,
    kinematic::KinematicConfig,
    synthesis::{SignalConfig, SinglePointing},
    transfer::{Resolution, TransferConfig},
    units::{si_to_jansky_per_steradian, velocity_to_beta},
};
use clap::{Arg, ArgMatches, Command};
use ndarray::ArrayView1;
use serde::Serialize;

#[derive(Serialize)]
struct SpectrumOutput<'a> {
    description: String,
    unit: &'static str,
    optical_depth: fsz,
    frequencies: &'a [fsz],
    intensity: &'a [fsz],
    kernel_integral: Option<fsz>,
    warning: Option<String>,
}

/// Creates a subcommand for computing a single-pointing spectrum.
pub fn create_spectrum_subcommand() -> Command {
    let command = Command::new("spectrum")
        .about("Compute the spectrum along a single line of sight")
        .long_about(
            "Compute the spectrum along a single line of sight.\n\
             The spectrum sums the scattering distortion by a thermal or power-law\n\
             electron population, the kinematic distortion from the bulk motion of\n\
             the electrons and the undistorted background, each of which can be left out.",
        )
        .arg(create_output_file_argument())
        .arg(
            Arg::new("optical-depth")
                .long("optical-depth")
                .require_equals(true)
                .value_name("VALUE")
                .default_value("0.01")
                .help("Optical depth along the line of sight"),
        )
        .arg(
            create_pair_argument(
                "frequency-range",
                ["MIN", "MAX"],
                "Range of frequencies [GHz]",
            )
            .default_values(["100", "500"]),
        )
        .arg(
            Arg::new("n-frequencies")
                .long("n-frequencies")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("1000")
                .help("Number of frequencies"),
        )
        .arg(create_flag_argument(
            "in-jansky",
            "Output intensities in Jy/sr rather than W/(m^2 Hz sr)",
        ));
    add_signal_arguments(add_population_arguments(command, false))
}

/// Adds the arguments controlling the kinematic term, the background and the
/// resolution of the scattering computation.
pub fn add_signal_arguments(command: Command) -> Command {
    command
        .arg(
            Arg::new("beta-z")
                .long("beta-z")
                .require_equals(true)
                .allow_negative_numbers(true)
                .value_name("VALUE")
                .conflicts_with("velocity")
                .help("Line-of-sight speed of the electrons in units of the speed of light (positive when receding)"),
        )
        .arg(
            Arg::new("velocity")
                .long("velocity")
                .require_equals(true)
                .allow_negative_numbers(true)
                .value_name("VALUE")
                .help("Line-of-sight peculiar velocity of the electrons [km/s] (positive when receding)"),
        )
        .arg(
            Arg::new("n-mu-kinematic")
                .long("n-mu-kinematic")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("1000")
                .help("Number of scattering angles for the kinematic term"),
        )
        .arg(create_flag_argument(
            "no-background",
            "Leave the undistorted background out of the signal",
        ))
        .arg(
            Arg::new("cmb-temperature")
                .long("cmb-temperature")
                .require_equals(true)
                .value_name("VALUE")
                .default_value("2.726")
                .help("Temperature of the background [K]"),
        )
        .arg(
            Arg::new("accuracy")
                .long("accuracy")
                .require_equals(true)
                .value_name("VALUE")
                .conflicts_with_all(["n-s", "n-beta", "n-mu"])
                .help("Integrate the scattering term to the given relative accuracy"),
        )
        .arg(
            Arg::new("max-rows")
                .long("max-rows")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("12")
                .help("Maximum number of Romberg rows when integrating to a given accuracy"),
        )
        .arg(
            Arg::new("n-s")
                .long("n-s")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("200")
                .help("Number of frequency shifts for fixed-resolution integration"),
        )
        .arg(
            Arg::new("n-beta")
                .long("n-beta")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("100")
                .help("Number of electron speeds for fixed-resolution integration"),
        )
        .arg(
            Arg::new("n-mu")
                .long("n-mu")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("100")
                .help("Number of scattering angles for fixed-resolution integration"),
        )
}

/// Returns the line-of-sight speed given by the `beta-z` or `velocity`
/// argument, if any.
pub fn line_of_sight_beta_from_arguments(arguments: &ArgMatches) -> Option<fsz> {
    get_finite_float_value_from_parseable_argument(arguments, "beta-z").or_else(|| {
        get_finite_float_value_from_parseable_argument(arguments, "velocity")
            .map(|velocity| velocity_to_beta(velocity * KM_TO_M))
    })
}

/// Returns the resolution of the scattering computation given by the arguments.
pub fn resolution_from_arguments(arguments: &ArgMatches) -> Resolution {
    match get_value_from_parseable_argument::<fsz>(arguments, "accuracy") {
        Some(relative_accuracy) => Resolution::Accuracy {
            relative_accuracy,
            max_rows: get_value_from_required_parseable_argument(arguments, "max-rows"),
        },
        None => Resolution::Fixed {
            n_s: get_value_from_required_parseable_argument(arguments, "n-s"),
            kernel: KernelConfig {
                n_beta: get_value_from_required_parseable_argument(arguments, "n-beta"),
                n_mu: get_value_from_required_parseable_argument(arguments, "n-mu"),
            },
        },
    }
}

/// Creates a single-pointing synthesizer configured by the arguments.
pub fn single_pointing_from_arguments(
    arguments: &ArgMatches,
    verbosity: Verbosity,
) -> SinglePointing {
    let background = exit_on_error!(
        CmbBackground::new(get_finite_float_value_from_required_parseable_argument(
            arguments,
            "cmb-temperature"
        )),
        "Error: Invalid background: {}"
    );
    exit_on_error!(
        SinglePointing::new(
            TransferConfig {
                resolution: resolution_from_arguments(arguments),
                ..TransferConfig::default()
            },
            KinematicConfig {
                n_mu: get_value_from_required_parseable_argument(arguments, "n-mu-kinematic"),
            },
            background,
            verbosity,
        ),
        "Error: Invalid configuration: {}"
    )
}

/// Runs the actions for the `spectrum` subcommand using the given arguments.
pub fn run_spectrum_subcommand(arguments: &ArgMatches, engine: &Engine) {
    let verbosity = parse_verbosity(arguments, true);
    let (output_file_path, format) = output_path_from_arguments(arguments);

    let frequencies: Vec<_> =
        get_linear_grid_from_arguments(arguments, "frequency-range", "n-frequencies")
            .into_iter()
            .map(|frequency| frequency * GHZ_TO_HZ)
            .collect();
    let signal = SignalConfig {
        population: population_from_arguments(arguments),
        line_of_sight_beta: line_of_sight_beta_from_arguments(arguments),
        optical_depth: get_finite_float_value_from_required_parseable_argument(
            arguments,
            "optical-depth",
        ),
        include_background: !arguments.get_flag("no-background"),
    };
    let in_jansky = arguments.get_flag("in-jansky");
    let description = describe_signal(&signal);

    let pointing = single_pointing_from_arguments(arguments, verbosity.clone());

    if verbosity.print_messages() {
        println!("Computing spectrum of {}", description);
    }
    let mut tasks = [SynthesisTask::new(frequencies, signal)];
    exit_on_error!(
        engine.run_tasks(&pointing, &mut tasks),
        "Error: Could not compute spectrum: {}"
    );
    let [task] = tasks;

    let warning = task
        .report()
        .and_then(|report| report.warning.as_ref())
        .map(ToString::to_string);
    if let Some(warning) = warning.as_ref() {
        if !verbosity.print_messages() {
            eprintln!("Warning: {}", warning);
        }
    }
    let kernel_integral = task.report().map(|report| report.kernel_integral);

    let mut intensity = task.output().to_vec();
    if in_jansky {
        intensity
            .iter_mut()
            .for_each(|value| *value = si_to_jansky_per_steradian(*value));
    }

    save_output(
        &output_file_path,
        format,
        &SpectrumOutput {
            description,
            unit: if in_jansky { "Jy/sr" } else { "W/(m^2 Hz sr)" },
            optical_depth: task.signal().optical_depth,
            frequencies: task.frequencies(),
            intensity: &intensity,
            kernel_integral,
            warning,
        },
        ArrayView1::from(&intensity).into_dyn(),
        &[("frequencies", task.frequencies())],
        &verbosity,
    );
}

/// Describes the contributions included in the given signal.
pub fn describe_signal(signal: &SignalConfig) -> String {
    let mut parts = Vec::new();
    if let Some(population) = signal.population.as_ref() {
        parts.push(format!("scattering by {}", population));
    }
    if let Some(beta) = signal.line_of_sight_beta {
        parts.push(format!("bulk motion with beta_z = {}", beta));
    }
    if signal.include_background {
        parts.push("background".to_string());
    }
    if parts.is_empty() {
        exit_with_error!("Error: Signal has no contributions");
    }
    parts.join(" + ")
}
