use lazy_static::lazy_static;
use mocksz::cli;
use serde_json::Value;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

#[macro_export]
macro_rules! def_test {
    (
        OUT[$($out_ident:ident = $out_str:expr),*]
        fn $name:ident $test_body:expr
    ) => {
        #[test]
        fn $name() {
            let test = common::Test::new();

            $( let $out_ident = test.output_path($out_str); )*

            let test_body = |$( $out_ident, )*| $test_body;

            test_body(
                $( path_str!($out_ident), )*
            );
        }
    };
}

#[macro_export]
macro_rules! path_str {
    ($path:expr) => {
        $path.to_string_lossy().as_ref()
    };
}

pub fn run<I, T>(args: I)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    cli::run::run_with_args(COMMAND.clone().get_matches_from(args));
}

pub fn assert_file_exists<P: AsRef<Path>>(file_path: P) {
    let file_path = file_path.as_ref();
    assert!(
        file_path.exists(),
        "File {} does not exist",
        file_path.to_string_lossy()
    );
}

pub fn read_json<P: AsRef<Path>>(file_path: P) -> Value {
    let file_path = file_path.as_ref();
    assert_file_exists(file_path);
    let text = fs::read_to_string(file_path).unwrap();
    serde_json::from_str(&text).unwrap()
}

pub fn json_values(value: &Value, key: &str) -> Vec<f64> {
    value[key]
        .as_array()
        .unwrap_or_else(|| panic!("No array {} in output", key))
        .iter()
        .map(|value| value.as_f64().unwrap())
        .collect()
}

/// Output directory that is removed when the test ends.
#[derive(Debug)]
pub struct Test {
    output_dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        Self {
            output_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn output_path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.output_dir.path().join(file_name.as_ref())
    }
}

lazy_static! {
    static ref COMMAND: clap::Command = cli::build::build().no_binary_name(true);
}
