//! Command line interface for computing the scattering kernel of an electron
//! population.

use super::utils::{
    add_population_arguments, create_output_file_argument, create_pair_argument,
    get_midpoint_grid_from_arguments, get_nonzero_count_from_argument,
    get_value_from_required_parseable_argument,
    output_path_from_arguments, parse_verbosity, population_from_arguments, save_output,
};
use crate::{
    execution::Engine,
    exit_on_error, exit_with_error, fsz,
    kernel::{multi_electron_kernel, KernelConfig},
    math::midpoint_grid,
    transfer::ShiftGridConfig,
};
use clap::{Arg, ArgMatches, Command};
use ndarray::ArrayView1;
use serde::Serialize;

#[derive(Serialize)]
struct MultiKernelOutput<'a> {
    population: String,
    n_beta: usize,
    n_mu: usize,
    s: &'a [fsz],
    kernel: &'a [fsz],
    kernel_integral: fsz,
}

/// Creates a subcommand for computing the multi-electron kernel.
pub fn create_multi_kernel_subcommand() -> Command {
    let command = Command::new("multi-kernel")
        .about("Compute the scattering kernel averaged over an electron population")
        .arg(create_output_file_argument())
        .arg(create_pair_argument(
            "s-range",
            ["MIN", "MAX"],
            "Range of logarithmic frequency shifts [default: -1.5,2.5 for thermal and -1.5,10 for power-law populations]",
        ))
        .arg(
            Arg::new("n-s")
                .long("n-s")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("200")
                .help("Number of frequency shifts"),
        )
        .arg(
            Arg::new("n-beta")
                .long("n-beta")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("100")
                .help("Number of electron speeds to integrate over"),
        )
        .arg(
            Arg::new("n-mu")
                .long("n-mu")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("100")
                .help("Number of scattering angles to integrate over"),
        );
    add_population_arguments(command, true)
}

/// Runs the actions for the `multi-kernel` subcommand using the given arguments.
pub fn run_multi_kernel_subcommand(arguments: &ArgMatches, engine: &Engine) {
    let verbosity = parse_verbosity(arguments, true);
    let (output_file_path, format) = output_path_from_arguments(arguments);

    let population = population_from_arguments(arguments)
        .unwrap_or_else(|| exit_with_error!("Error: No electron population specified"));

    let (s, ds) = if arguments.contains_id("s-range") {
        get_midpoint_grid_from_arguments(arguments, "s-range", "n-s")
    } else {
        let (start, end) = ShiftGridConfig::default().range_for(&population);
        midpoint_grid(start, end, get_nonzero_count_from_argument(arguments, "n-s"))
    };
    let config = KernelConfig {
        n_beta: get_value_from_required_parseable_argument(arguments, "n-beta"),
        n_mu: get_value_from_required_parseable_argument(arguments, "n-mu"),
    };

    if verbosity.print_messages() {
        println!(
            "Computing kernel of {} at {} shifts",
            population,
            s.len()
        );
    }
    let kernel = exit_on_error!(
        engine.install(|| multi_electron_kernel(&s, &population, &config, &verbosity)),
        "Error: Could not compute kernel: {}"
    );
    let kernel_integral = kernel.iter().sum::<fsz>() * ds;
    if verbosity.print_messages() {
        println!("Kernel integrates to {}", kernel_integral);
    }

    save_output(
        &output_file_path,
        format,
        &MultiKernelOutput {
            population: population.to_string(),
            n_beta: config.n_beta,
            n_mu: config.n_mu,
            s: &s,
            kernel: &kernel,
            kernel_integral,
        },
        ArrayView1::from(&kernel).into_dyn(),
        &[("s", s.as_slice())],
        &verbosity,
    );
}
