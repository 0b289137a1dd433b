//! Utilities for creating the command line interface.

use crate::{
    distribution::Population,
    exit_on_error, exit_on_false, exit_with_error, fsz,
    io::{
        utils::{self as io_utils, OutputFormat},
        Verbosity,
    },
    math::{linear_grid, midpoint_grid},
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indicatif::ProgressStyle;
use lazy_static::lazy_static;
use ndarray::{ArrayView1, ArrayViewD};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

lazy_static! {
    static ref DEFAULT_PROGRESS_STYLE: ProgressStyle =
        ProgressStyle::with_template("Progress: {bar:40}  {percent}% | ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
}

pub fn parse_value_string<T>(argument_name: &str, value_string: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    exit_on_error!(
        value_string.parse(),
        "Error: Could not parse value for {0}: {1}",
        argument_name
    )
}

fn verify_finite_float_value(argument_name: &str, value: fsz) {
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
}

fn verify_argument_value_count<T>(argument_name: &str, values: &[T], required_count: usize) {
    let count = values.len();
    exit_on_false!(
        count == required_count,
        "Error: {} must have {} values, got {}",
        argument_name,
        required_count,
        count
    );
}

pub fn get_value_from_parseable_argument<T>(arguments: &ArgMatches, argument_name: &str) -> Option<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    arguments
        .get_one::<String>(argument_name)
        .map(|value_string| parse_value_string(argument_name, value_string))
}

pub fn get_value_from_required_parseable_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    get_value_from_parseable_argument(arguments, argument_name)
        .unwrap_or_else(|| exit_with_error!("Error: No value for {}", argument_name))
}

pub fn get_finite_float_value_from_parseable_argument(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<fsz> {
    let value = get_value_from_parseable_argument(arguments, argument_name);
    if let Some(value) = value {
        verify_finite_float_value(argument_name, value);
    }
    value
}

pub fn get_finite_float_value_from_required_parseable_argument(
    arguments: &ArgMatches,
    argument_name: &str,
) -> fsz {
    let value = get_value_from_required_parseable_argument(arguments, argument_name);
    verify_finite_float_value(argument_name, value);
    value
}

/// Parses a comma-separated pair of finite values, such as a range.
pub fn get_finite_float_pair_from_required_parseable_argument(
    arguments: &ArgMatches,
    argument_name: &str,
) -> (fsz, fsz) {
    let values: Vec<fsz> = arguments
        .get_many::<String>(argument_name)
        .unwrap_or_else(|| exit_with_error!("Error: No values for {}", argument_name))
        .filter(|value_string| !value_string.is_empty())
        .map(|value_string| parse_value_string(argument_name, value_string))
        .collect();
    verify_argument_value_count(argument_name, &values, 2);
    values
        .iter()
        .for_each(|&value| verify_finite_float_value(argument_name, value));
    (values[0], values[1])
}

/// Parses a range and a number of values, returning the midpoints of the
/// evenly sized cells covering the range.
pub fn get_midpoint_grid_from_arguments(
    arguments: &ArgMatches,
    range_argument_name: &str,
    count_argument_name: &str,
) -> (Vec<fsz>, fsz) {
    let (start, end) =
        get_finite_float_pair_from_required_parseable_argument(arguments, range_argument_name);
    let count = get_nonzero_count_from_argument(arguments, count_argument_name);
    exit_on_false!(
        end > start,
        "Error: Upper bound of {} must be larger than lower bound",
        range_argument_name
    );
    midpoint_grid(start, end, count)
}

/// Parses a range and a number of values, returning evenly spaced values
/// including both ends of the range.
pub fn get_linear_grid_from_arguments(
    arguments: &ArgMatches,
    range_argument_name: &str,
    count_argument_name: &str,
) -> Vec<fsz> {
    let (start, end) =
        get_finite_float_pair_from_required_parseable_argument(arguments, range_argument_name);
    let count = get_nonzero_count_from_argument(arguments, count_argument_name);
    exit_on_false!(
        end >= start,
        "Error: Upper bound of {} must not be smaller than lower bound",
        range_argument_name
    );
    linear_grid(start, end, count)
}

pub fn get_nonzero_count_from_argument(arguments: &ArgMatches, argument_name: &str) -> usize {
    let count: usize = get_value_from_required_parseable_argument(arguments, argument_name);
    exit_on_false!(count > 0, "Error: {} must be larger than zero", argument_name);
    count
}

pub fn parse_verbosity(arguments: &ArgMatches, support_progress: bool) -> Verbosity {
    if support_progress && arguments.get_flag("progress") {
        Verbosity::Progress(DEFAULT_PROGRESS_STYLE.clone())
    } else if arguments.get_flag("verbose") {
        Verbosity::Messages
    } else {
        Verbosity::Quiet
    }
}

/// Adds the arguments selecting a thermal or power-law electron population.
pub fn add_population_arguments(command: Command, required: bool) -> Command {
    command
        .arg(
            Arg::new("temperature")
                .long("temperature")
                .value_name("VALUE")
                .help("Electron temperature of a thermal population [keV]"),
        )
        .arg(
            Arg::new("alpha")
                .long("alpha")
                .value_name("VALUE")
                .help("Spectral index of a power-law population"),
        )
        .group(
            clap::ArgGroup::new("population")
                .args(["temperature", "alpha"])
                .required(required),
        )
}

/// Creates the population selected by the `temperature` or `alpha` argument,
/// if any.
pub fn population_from_arguments(arguments: &ArgMatches) -> Option<Population> {
    if let Some(temperature) =
        get_finite_float_value_from_parseable_argument(arguments, "temperature")
    {
        Some(exit_on_error!(
            Population::thermal(temperature),
            "Error: Invalid thermal population: {}"
        ))
    } else {
        get_finite_float_value_from_parseable_argument(arguments, "alpha").map(|alpha| {
            exit_on_error!(
                Population::power_law(alpha),
                "Error: Invalid power-law population: {}"
            )
        })
    }
}

/// Creates the required output file argument.
pub fn create_output_file_argument() -> Arg {
    Arg::new("output-file")
        .value_name("OUTPUT_FILE")
        .help("Path of the output file (format given by extension: .json or .npy)")
        .required(true)
}

/// Creates a boolean flag argument.
pub fn create_flag_argument(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::SetTrue)
}

/// Creates an argument taking a comma-separated pair of values.
pub fn create_pair_argument(
    name: &'static str,
    value_names: [&'static str; 2],
    help: &'static str,
) -> Arg {
    Arg::new(name)
        .long(name)
        .require_equals(true)
        .value_delimiter(',')
        .allow_negative_numbers(true)
        .num_args(2)
        .value_names(value_names)
        .help(help)
}

/// Returns the output file path and its format.
pub fn output_path_from_arguments(arguments: &ArgMatches) -> (PathBuf, OutputFormat) {
    let output_file_path = PathBuf::from(
        arguments
            .get_one::<String>("output-file")
            .unwrap_or_else(|| exit_with_error!("Error: No output file specified")),
    );
    let format = OutputFormat::from_path(&output_file_path).unwrap_or_else(|| {
        exit_with_error!(
            "Error: Output file {} must have extension .json or .npy",
            output_file_path.display()
        )
    });
    (output_file_path, format)
}

/// Saves the given values, either as a JSON object built from `data` or as
/// NumPy arrays, where each coordinate array is saved next to the values in
/// a file whose name is suffixed by the coordinate name.
pub fn save_output<T: Serialize>(
    output_file_path: &Path,
    format: OutputFormat,
    data: &T,
    values: ArrayViewD<fsz>,
    coordinates: &[(&str, &[fsz])],
    verbosity: &Verbosity,
) {
    if verbosity.print_messages() {
        println!("Saving output in {}", output_file_path.display());
    }
    match format {
        OutputFormat::Json => exit_on_error!(
            io_utils::save_data_as_json(output_file_path, data),
            "Error: Could not save output file: {}"
        ),
        OutputFormat::Npy => {
            exit_on_error!(
                io_utils::save_array_as_npy(output_file_path, &values),
                "Error: Could not save output file: {}"
            );
            for (name, coordinate) in coordinates {
                let coordinate_file_path =
                    io_utils::add_suffix_to_file_stem(output_file_path, &format!("_{}", name));
                exit_on_error!(
                    io_utils::save_array_as_npy(
                        &coordinate_file_path,
                        &ArrayView1::from(*coordinate)
                    ),
                    "Error: Could not save coordinate file: {}"
                );
            }
        }
    }
}
