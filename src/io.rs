//! File input/output and console feedback.

pub mod utils;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;

/// How much feedback to give while computing.
#[derive(Clone)]
pub enum Verbosity {
    /// Print nothing except warnings.
    Quiet,
    /// Print status messages.
    Messages,
    /// Print status messages and show progress bars with the given style.
    Progress(ProgressStyle),
}

impl Verbosity {
    /// Whether status messages should be printed.
    pub fn print_messages(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Whether progress bars should be shown.
    pub fn show_progress(&self) -> bool {
        matches!(self, Self::Progress(_))
    }

    /// Creates a progress bar for the given number of steps, which is hidden
    /// unless progress should be shown.
    pub fn create_progress_bar(&self, n_steps: usize) -> ProgressBar {
        match self {
            Self::Progress(style) => {
                let bar = ProgressBar::new(n_steps as u64);
                bar.set_style(style.clone());
                bar
            }
            _ => ProgressBar::with_draw_target(Some(n_steps as u64), ProgressDrawTarget::hidden()),
        }
    }
}

impl fmt::Debug for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "Quiet"),
            Self::Messages => write!(f, "Messages"),
            Self::Progress(_) => write!(f, "Progress"),
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Quiet
    }
}
