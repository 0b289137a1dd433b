//! Command line interface for evaluating electron speed distributions.

use super::utils::{
    add_population_arguments, create_output_file_argument, create_pair_argument,
    get_midpoint_grid_from_arguments, output_path_from_arguments, parse_verbosity,
    population_from_arguments, save_output,
};
use crate::{exit_on_error, exit_with_error, fsz};
use clap::{Arg, ArgMatches, Command};
use ndarray::ArrayView1;
use serde::Serialize;

#[derive(Serialize)]
struct DistributionOutput<'a> {
    population: String,
    beta: &'a [fsz],
    density: &'a [fsz],
}

/// Creates a subcommand for evaluating an electron speed distribution.
pub fn create_distribution_subcommand() -> Command {
    let command = Command::new("distribution")
        .about("Evaluate the speed distribution of an electron population")
        .long_about(
            "Evaluate the speed distribution of an electron population.\n\
             The distribution is normalized over the given range of speeds.",
        )
        .arg(create_output_file_argument())
        .arg(
            create_pair_argument(
                "beta-range",
                ["MIN", "MAX"],
                "Range of electron speeds in units of the speed of light",
            )
            .default_values(["0", "0.999"]),
        )
        .arg(
            Arg::new("n-beta")
                .long("n-beta")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("1000")
                .help("Number of electron speeds"),
        );
    add_population_arguments(command, true)
}

/// Runs the actions for the `distribution` subcommand using the given arguments.
pub fn run_distribution_subcommand(arguments: &ArgMatches) {
    let verbosity = parse_verbosity(arguments, false);
    let (output_file_path, format) = output_path_from_arguments(arguments);

    let (beta, _) = get_midpoint_grid_from_arguments(arguments, "beta-range", "n-beta");
    let population = population_from_arguments(arguments)
        .unwrap_or_else(|| exit_with_error!("Error: No electron population specified"));

    if verbosity.print_messages() {
        println!("Evaluating distribution of {}", population);
    }
    let density = exit_on_error!(
        population.evaluate_on_grid(&beta),
        "Error: Could not evaluate distribution: {}"
    );

    save_output(
        &output_file_path,
        format,
        &DistributionOutput {
            population: population.to_string(),
            beta: &beta,
            density: &density,
        },
        ArrayView1::from(&density).into_dyn(),
        &[("beta", beta.as_slice())],
        &verbosity,
    );
}
