//! Command line interface for computing the scattering kernel of electrons
//! with a single speed.

use super::utils::{
    create_output_file_argument, create_pair_argument,
    get_finite_float_value_from_required_parseable_argument, get_midpoint_grid_from_arguments,
    get_value_from_required_parseable_argument, output_path_from_arguments, parse_verbosity,
    save_output,
};
use crate::{exit_on_error, fsz, scattering::single_electron_kernel};
use clap::{Arg, ArgMatches, Command};
use ndarray::ArrayView1;
use serde::Serialize;

#[derive(Serialize)]
struct KernelOutput<'a> {
    beta: fsz,
    n_mu: usize,
    s: &'a [fsz],
    kernel: &'a [fsz],
}

/// Creates a subcommand for computing the single-electron kernel.
pub fn create_kernel_subcommand() -> Command {
    Command::new("kernel")
        .about("Compute the scattering kernel of electrons with a single speed")
        .arg(create_output_file_argument())
        .arg(
            Arg::new("beta")
                .long("beta")
                .require_equals(true)
                .allow_negative_numbers(true)
                .value_name("VALUE")
                .required(true)
                .help("Electron speed in units of the speed of light"),
        )
        .arg(
            create_pair_argument(
                "s-range",
                ["MIN", "MAX"],
                "Range of logarithmic frequency shifts",
            )
            .default_values(["-1.2", "2.4"]),
        )
        .arg(
            Arg::new("n-s")
                .long("n-s")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("3000")
                .help("Number of frequency shifts"),
        )
        .arg(
            Arg::new("n-mu")
                .long("n-mu")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("100")
                .help("Number of scattering angles to integrate over"),
        )
}

/// Runs the actions for the `kernel` subcommand using the given arguments.
pub fn run_kernel_subcommand(arguments: &ArgMatches) {
    let verbosity = parse_verbosity(arguments, false);
    let (output_file_path, format) = output_path_from_arguments(arguments);

    let beta = get_finite_float_value_from_required_parseable_argument(arguments, "beta");
    let (s, _) = get_midpoint_grid_from_arguments(arguments, "s-range", "n-s");
    let n_mu = get_value_from_required_parseable_argument(arguments, "n-mu");

    if verbosity.print_messages() {
        println!(
            "Computing kernel for beta = {} at {} shifts",
            beta,
            s.len()
        );
    }
    let kernel = exit_on_error!(
        single_electron_kernel(&s, beta, n_mu),
        "Error: Could not compute kernel: {}"
    );

    save_output(
        &output_file_path,
        format,
        &KernelOutput {
            beta,
            n_mu,
            s: &s,
            kernel: &kernel,
        },
        ArrayView1::from(&kernel).into_dyn(),
        &[("s", s.as_slice())],
        &verbosity,
    );
}
