//! Function for running the command line program.

use super::{
    build, distribution::run_distribution_subcommand, kernel::run_kernel_subcommand,
    multi_kernel::run_multi_kernel_subcommand, screen::run_screen_subcommand,
    spectrum::run_spectrum_subcommand, utils,
};
use crate::{
    execution::{Engine, EngineConfig},
    exit_on_error,
};
use clap::ArgMatches;
use std::time::Instant;

/// Runs the `mocksz` command line program.
pub fn run() {
    run_with_args(build::build().get_matches());
}

/// Runs the `mocksz` command line program with the given parsed arguments.
pub fn run_with_args(arguments: ArgMatches) {
    let n_threads = utils::get_value_from_required_parseable_argument(&arguments, "threads");
    let engine = exit_on_error!(
        Engine::new(&EngineConfig { n_threads }),
        "Error: Could not create worker pool: {}"
    );

    let start_instant = Instant::now();

    if let Some(kernel_arguments) = arguments.subcommand_matches("kernel") {
        run_kernel_subcommand(kernel_arguments);
    }
    if let Some(distribution_arguments) = arguments.subcommand_matches("distribution") {
        run_distribution_subcommand(distribution_arguments);
    }
    if let Some(multi_kernel_arguments) = arguments.subcommand_matches("multi-kernel") {
        run_multi_kernel_subcommand(multi_kernel_arguments, &engine);
    }
    if let Some(spectrum_arguments) = arguments.subcommand_matches("spectrum") {
        run_spectrum_subcommand(spectrum_arguments, &engine);
    }
    if let Some(screen_arguments) = arguments.subcommand_matches("screen") {
        run_screen_subcommand(screen_arguments, &engine);
    }

    if arguments.get_flag("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}
