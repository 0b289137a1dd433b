//! Command line interface for computing optical depth screens and spectral
//! cubes of isothermal-beta clusters.

use super::{
    spectrum::{
        add_signal_arguments, describe_signal, line_of_sight_beta_from_arguments,
        single_pointing_from_arguments,
    },
    utils::{
        add_population_arguments, create_output_file_argument, create_pair_argument,
        get_finite_float_value_from_required_parseable_argument, get_linear_grid_from_arguments,
        get_value_from_required_parseable_argument, output_path_from_arguments,
        parse_verbosity, population_from_arguments, save_output,
    },
};
use crate::{
    constants::GHZ_TO_HZ,
    execution::Engine,
    exit_on_error, fsz,
    screen::{IsoBetaParameters, ScreenMode},
    synthesis::{CubeConfig, IsoBetaModel, SignalConfig},
};
use clap::{Arg, ArgMatches, Command};
use serde::Serialize;

#[derive(Serialize)]
struct ScreenOutput<'a> {
    mode: String,
    shape: &'a [usize],
    central_optical_depth: fsz,
    azimuths: &'a [fsz],
    elevations: &'a [fsz],
    optical_depth: Vec<fsz>,
}

#[derive(Serialize)]
struct CubeOutput<'a> {
    mode: String,
    description: String,
    shape: &'a [usize],
    azimuths: &'a [fsz],
    elevations: &'a [fsz],
    frequencies: &'a [fsz],
    intensity: Vec<fsz>,
    warning: Option<String>,
}

/// Creates a subcommand for computing an isothermal-beta screen or cube.
pub fn create_screen_subcommand() -> Command {
    let command = Command::new("screen")
        .about("Compute the optical depth screen of an isothermal-beta cluster")
        .long_about(
            "Compute the optical depth screen of an isothermal-beta cluster.\n\
             When a frequency range is given, the spectrum for unit optical depth is\n\
             scaled by the screen to produce a spectral cube instead.",
        )
        .arg(create_output_file_argument())
        .arg(
            Arg::new("ibeta")
                .long("ibeta")
                .require_equals(true)
                .value_name("VALUE")
                .default_value("0.7")
                .help("Structural index of the density profile"),
        )
        .arg(
            Arg::new("ne0")
                .long("ne0")
                .require_equals(true)
                .value_name("VALUE")
                .default_value("0.012")
                .help("Central electron density [1/cm^3]"),
        )
        .arg(
            Arg::new("thetac")
                .long("thetac")
                .require_equals(true)
                .value_name("VALUE")
                .default_value("15")
                .help("Angular core radius [arcsec]"),
        )
        .arg(
            Arg::new("da")
                .long("da")
                .require_equals(true)
                .value_name("VALUE")
                .default_value("1500")
                .help("Angular diameter distance [Mpc]"),
        )
        .arg(
            create_pair_argument(
                "az-range",
                ["MIN", "MAX"],
                "Range of azimuth offsets from the cluster center [arcsec]",
            )
            .default_values(["-60", "60"]),
        )
        .arg(
            Arg::new("n-az")
                .long("n-az")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("10")
                .help("Number of azimuth offsets"),
        )
        .arg(
            create_pair_argument(
                "el-range",
                ["MIN", "MAX"],
                "Range of elevation offsets from the cluster center [arcsec]",
            )
            .default_values(["-60", "60"]),
        )
        .arg(
            Arg::new("n-el")
                .long("n-el")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("8")
                .help("Number of elevation offsets"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .require_equals(true)
                .value_name("MODE")
                .value_parser(["grid", "trace"])
                .default_value("grid")
                .help("Whether to combine every azimuth with every elevation (grid)\n or pair them up (trace)"),
        )
        .arg(create_pair_argument(
            "frequency-range",
            ["MIN", "MAX"],
            "Range of frequencies [GHz] for computing a spectral cube",
        ))
        .arg(
            Arg::new("n-frequencies")
                .long("n-frequencies")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("100")
                .help("Number of frequencies for the spectral cube"),
        );
    add_signal_arguments(add_population_arguments(command, false))
}

/// Runs the actions for the `screen` subcommand using the given arguments.
pub fn run_screen_subcommand(arguments: &ArgMatches, engine: &Engine) {
    let verbosity = parse_verbosity(arguments, true);
    let (output_file_path, format) = output_path_from_arguments(arguments);

    let parameters = IsoBetaParameters {
        ibeta: get_finite_float_value_from_required_parseable_argument(arguments, "ibeta"),
        ne0: get_finite_float_value_from_required_parseable_argument(arguments, "ne0"),
        thetac: get_finite_float_value_from_required_parseable_argument(arguments, "thetac"),
        da: get_finite_float_value_from_required_parseable_argument(arguments, "da"),
    };
    let azimuths = get_linear_grid_from_arguments(arguments, "az-range", "n-az");
    let elevations = get_linear_grid_from_arguments(arguments, "el-range", "n-el");
    let mode: ScreenMode = get_value_from_required_parseable_argument(arguments, "mode");

    let model = exit_on_error!(
        IsoBetaModel::new(
            parameters,
            single_pointing_from_arguments(arguments, verbosity.clone())
        ),
        "Error: Invalid cluster model: {}"
    );
    let screen = exit_on_error!(
        model.screen(&azimuths, &elevations, mode),
        "Error: Could not compute screen: {}"
    );
    if verbosity.print_messages() {
        println!(
            "Computed {} screen of shape {:?} with central optical depth {}",
            mode,
            screen.shape(),
            model.parameters().central_optical_depth()
        );
    }

    if !arguments.contains_id("frequency-range") {
        save_output(
            &output_file_path,
            format,
            &ScreenOutput {
                mode: mode.to_string(),
                shape: screen.shape(),
                central_optical_depth: model.parameters().central_optical_depth(),
                azimuths: &azimuths,
                elevations: &elevations,
                optical_depth: screen.to_flat_vec(),
            },
            screen.optical_depths().view(),
            &[
                ("azimuths", azimuths.as_slice()),
                ("elevations", elevations.as_slice()),
            ],
            &verbosity,
        );
        return;
    }

    let frequencies: Vec<_> =
        get_linear_grid_from_arguments(arguments, "frequency-range", "n-frequencies")
            .into_iter()
            .map(|frequency| frequency * GHZ_TO_HZ)
            .collect();
    let config = CubeConfig {
        population: population_from_arguments(arguments),
        line_of_sight_beta: line_of_sight_beta_from_arguments(arguments),
        include_background: !arguments.get_flag("no-background"),
    };
    let description = describe_signal(&SignalConfig {
        population: config.population.clone(),
        line_of_sight_beta: config.line_of_sight_beta,
        optical_depth: model.parameters().central_optical_depth(),
        include_background: config.include_background,
    });
    if verbosity.print_messages() {
        println!(
            "Computing cube of {} at {} frequencies",
            description,
            frequencies.len()
        );
    }

    let (cube, report) = exit_on_error!(
        engine.install(|| model.cube(&frequencies, &screen, &config)),
        "Error: Could not compute cube: {}"
    );
    let warning = report
        .and_then(|report| report.warning)
        .map(|warning| warning.to_string());
    if let Some(warning) = warning.as_ref() {
        if !verbosity.print_messages() {
            eprintln!("Warning: {}", warning);
        }
    }

    save_output(
        &output_file_path,
        format,
        &CubeOutput {
            mode: mode.to_string(),
            description,
            shape: cube.shape(),
            azimuths: &azimuths,
            elevations: &elevations,
            frequencies: &frequencies,
            intensity: cube.iter().copied().collect(),
            warning,
        },
        cube.view(),
        &[
            ("azimuths", azimuths.as_slice()),
            ("elevations", elevations.as_slice()),
            ("frequencies", frequencies.as_slice()),
        ],
        &verbosity,
    );
}
