//! Command line interface.

pub mod build;
pub mod distribution;
pub mod kernel;
pub mod multi_kernel;
pub mod run;
pub mod screen;
pub mod spectrum;
pub mod utils;
