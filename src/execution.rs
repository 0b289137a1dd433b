//! Explicit worker pool for running batches of synthesis tasks.

use crate::{
    error::{require_length, SzError},
    fsz,
    synthesis::{SignalConfig, SinglePointing},
    transfer::{validate_frequencies, TransferReport},
};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

/// Configuration parameters for the worker pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of worker threads, or zero to use one per logical core.
    pub n_threads: usize,
}

/// A single-pointing spectrum to compute, owning its input and output.
#[derive(Clone, Debug)]
pub struct SynthesisTask {
    frequencies: Vec<fsz>,
    signal: SignalConfig,
    output: Vec<fsz>,
    report: Option<TransferReport>,
}

/// A dedicated pool of worker threads for running synthesis tasks.
#[derive(Debug)]
pub struct Engine {
    pool: ThreadPool,
}

impl EngineConfig {
    pub const DEFAULT_N_THREADS: usize = 0;
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            n_threads: Self::DEFAULT_N_THREADS,
        }
    }
}

impl SynthesisTask {
    /// Creates a task for the given frequencies [Hz] and signal configuration.
    pub fn new(frequencies: Vec<fsz>, signal: SignalConfig) -> Self {
        let output = vec![0.0; frequencies.len()];
        Self {
            frequencies,
            signal,
            output,
            report: None,
        }
    }

    pub fn frequencies(&self) -> &[fsz] {
        &self.frequencies
    }

    pub fn signal(&self) -> &SignalConfig {
        &self.signal
    }

    /// Returns the computed specific intensities, which are zero until the
    /// task has been run.
    pub fn output(&self) -> &[fsz] {
        &self.output
    }

    /// Returns the report of the scattering computation, if any.
    pub fn report(&self) -> Option<&TransferReport> {
        self.report.as_ref()
    }

    /// Consumes the task and returns the computed specific intensities.
    pub fn into_output(self) -> Vec<fsz> {
        self.output
    }

    fn validate(&self) -> Result<(), SzError> {
        self.signal.validate()?;
        validate_frequencies(&self.frequencies)?;
        require_length("task output", self.frequencies.len(), self.output.len())
    }
}

impl Engine {
    /// Creates a new engine with its own pool of worker threads.
    pub fn new(config: &EngineConfig) -> Result<Self, SzError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.n_threads)
            .thread_name(|idx| format!("mocksz-worker-{}", idx))
            .build()?;
        Ok(Self { pool })
    }

    /// Returns the number of worker threads.
    pub fn n_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs the given closure inside the worker pool, so that any parallel
    /// iteration it performs uses the worker threads.
    pub fn install<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(f)
    }

    /// Runs all the given tasks with the given synthesizer, writing each
    /// result into the output of its task.
    ///
    /// Every task is validated before any of them is run, so an invalid task
    /// leaves all outputs untouched.
    pub fn run_tasks(
        &self,
        pointing: &SinglePointing,
        tasks: &mut [SynthesisTask],
    ) -> Result<(), SzError> {
        tasks.iter().try_for_each(SynthesisTask::validate)?;

        self.pool.install(|| {
            tasks.par_iter_mut().try_for_each(|task| {
                task.report =
                    pointing.signal_into(&task.frequencies, &task.signal, &mut task.output)?;
                Ok(())
            })
        })
    }
}
