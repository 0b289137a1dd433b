//! Error handling.

use crate::fsz;
use std::io;
use thiserror::Error;

/// Errors that can occur while synthesizing SZ signals.
///
/// Every configuration problem is reported before any integration starts, so
/// an `Err` never comes with a partially filled output.
#[derive(Debug, Error)]
pub enum SzError {
    #[error("Invalid value {value} for {name}: must be {requirement}")]
    InvalidParameter {
        name: &'static str,
        value: fsz,
        requirement: &'static str,
    },
    #[error("Length of {what} must be {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("The {what} grid is empty")]
    EmptyGrid { what: &'static str },
    #[error(
        "Power-law normalization is degenerate for gamma range [{lower_gamma}, {upper_gamma}]"
    )]
    DegenerateNormalization {
        lower_gamma: fsz,
        upper_gamma: fsz,
    },
    #[error("Could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "json")]
    #[error("Could not serialize data: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "npy")]
    #[error("Could not write array: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

impl SzError {
    /// Returns an error for a parameter value violating the given requirement.
    pub fn invalid(name: &'static str, value: fsz, requirement: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            requirement,
        }
    }
}

/// Returns an error unless `value` is finite and larger than zero.
pub fn require_positive(name: &'static str, value: fsz) -> Result<(), SzError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SzError::invalid(name, value, "finite and larger than zero"))
    }
}

/// Returns an error unless `value` is finite and larger than or equal to zero.
pub fn require_non_negative(name: &'static str, value: fsz) -> Result<(), SzError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SzError::invalid(
            name,
            value,
            "finite and larger than or equal to zero",
        ))
    }
}

/// Returns an error unless the buffer has the expected length.
pub fn require_length(what: &'static str, expected: usize, actual: usize) -> Result<(), SzError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SzError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(not(feature = "for-testing"))]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        eprintln!($($print_arg)*);
        quit::with_code(1);
    }};
}

#[cfg(feature = "for-testing")]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        panic!($($print_arg)*);
    }};
}

#[macro_export]
macro_rules! exit_on_error {
    ($result:expr, $($print_arg:tt)*) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::exit_with_error!($($print_arg)*, err)
            }
        }
    };
}

#[macro_export]
macro_rules! exit_on_false {
    ($logic:expr, $($print_arg:tt)*) => {
        if $logic {
            true
        } else {
            $crate::exit_with_error!($($print_arg)*)
        }
    };
}
