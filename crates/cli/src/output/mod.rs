//! Output formatting
//!
//! Human-readable output goes to stdout with optional colors; `--json` switches
//! every command to machine-readable JSON on stdout and JSON errors on stderr.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::{BarProgress, EventLines};

/// Output settings shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub no_color: bool,
    pub quiet: bool,
}

impl OutputConfig {
    /// Progress bars only make sense for a human watching a terminal
    pub fn show_progress(&self) -> bool {
        !self.json && !self.quiet && console::user_attended_stderr()
    }
}
