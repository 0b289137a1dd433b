//! Function for building the command line hierarchy.

use super::{
    distribution::create_distribution_subcommand, kernel::create_kernel_subcommand,
    multi_kernel::create_multi_kernel_subcommand, screen::create_screen_subcommand,
    spectrum::create_spectrum_subcommand,
};
use clap::{self, Arg, ArgAction, Command};

/// Build the `mocksz` command line hierarchy.
pub fn build() -> Command {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .action(ArgAction::SetTrue)
                .help("Display elapsed time when done"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .require_equals(true)
                .value_name("NUMBER")
                .default_value("0")
                .help("Number of worker threads to use (0 uses one per logical core)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print status messages"),
        )
        .arg(
            Arg::new("progress")
                .short('p')
                .long("progress")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show progress bars and print status messages"),
        )
        .subcommand(create_kernel_subcommand())
        .subcommand(create_distribution_subcommand())
        .subcommand(create_multi_kernel_subcommand())
        .subcommand(create_spectrum_subcommand())
        .subcommand(create_screen_subcommand())
}
