//! Utilities for input/output.

use crate::error::SzError;
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "json")]
use serde::Serialize;
#[cfg(feature = "json")]
use std::io::{self, Write};

#[cfg(feature = "npy")]
use ndarray::{ArrayBase, Data, Dimension};

/// File formats that results can be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Npy,
}

impl OutputFormat {
    /// Determines the format from the extension of the given path.
    pub fn from_path<P: AsRef<Path>>(file_path: P) -> Option<Self> {
        match file_path.as_ref().extension().and_then(OsStr::to_str) {
            Some("json") => Some(Self::Json),
            Some("npy") => Some(Self::Npy),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Npy => "npy",
        }
    }
}

/// Creates the parent directory of the given file path if it does not exist.
pub fn create_directory_if_missing<P: AsRef<Path>>(file_path: P) -> Result<(), SzError> {
    if let Some(parent) = file_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Returns a path with the same parent and file stem as the given one, with
/// the given suffix appended to the stem.
pub fn add_suffix_to_file_stem<P: AsRef<Path>>(file_path: P, suffix: &str) -> PathBuf {
    let file_path = file_path.as_ref();
    let stem = file_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let file_name = match file_path.extension().and_then(OsStr::to_str) {
        Some(extension) => format!("{}{}.{}", stem, suffix, extension),
        None => format!("{}{}", stem, suffix),
    };
    file_path.with_file_name(file_name)
}

/// Serializes the given data into JSON and writes it to the given writer.
#[cfg(feature = "json")]
pub fn write_data_as_json<W: Write, T: Serialize>(writer: &mut W, data: &T) -> Result<(), SzError> {
    serde_json::to_writer(&mut *writer, data)?;
    writer.flush()?;
    Ok(())
}

/// Serializes the given data into JSON and saves it at the given path.
#[cfg(feature = "json")]
pub fn save_data_as_json<P: AsRef<Path>, T: Serialize>(
    file_path: P,
    data: &T,
) -> Result<(), SzError> {
    create_directory_if_missing(&file_path)?;
    let mut writer = io::BufWriter::new(fs::File::create(file_path)?);
    write_data_as_json(&mut writer, data)
}

/// Saves the given array in NumPy's `.npy` format at the given path.
#[cfg(feature = "npy")]
pub fn save_array_as_npy<P, S, D>(file_path: P, array: &ArrayBase<S, D>) -> Result<(), SzError>
where
    P: AsRef<Path>,
    S: Data<Elem = f64>,
    D: Dimension,
{
    create_directory_if_missing(&file_path)?;
    ndarray_npy::write_npy(file_path, array)?;
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(OutputFormat::from_path("a/b.json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path("b.npy"), Some(OutputFormat::Npy));
        assert_eq!(OutputFormat::from_path("b.txt"), None);
        assert_eq!(OutputFormat::from_path("b"), None);
        assert_eq!(OutputFormat::Npy.extension(), "npy");
    }

    #[test]
    fn suffix_is_added_before_extension() {
        assert_eq!(
            add_suffix_to_file_stem("out/cube.npy", "_frequencies"),
            PathBuf::from("out/cube_frequencies.npy")
        );
        assert_eq!(
            add_suffix_to_file_stem("cube", "_x"),
            PathBuf::from("cube_x")
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_is_written_to_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("values.json");
        save_data_as_json(&path, &vec![1.0, 2.5]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1.0,2.5]");
    }

    #[cfg(feature = "npy")]
    #[test]
    fn npy_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.npy");
        save_array_as_npy(&path, &ndarray::Array2::<f64>::zeros((2, 3))).unwrap();
        let array: ndarray::Array2<f64> = ndarray_npy::read_npy(&path).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
    }
}
