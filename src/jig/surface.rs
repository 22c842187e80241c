use indicatif::{ProgressBar, ProgressStyle};
use linkbot_jig::{ControlSurface, JigError};
use tracing::{debug, error, warn};

pub(crate) fn create_progress_bar(total_steps: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_steps);

    let style = ProgressStyle::default_bar()
        .template("[{spinner:.green} {elapsed_precise}] {bar:40.cyan/blue} {pos}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(msg.to_owned());

    pb
}

/// Terminal rendering of the jig controls
pub(crate) struct CliSurface {
    bar: ProgressBar,
}

impl CliSurface {
    pub(crate) fn new(title: &str) -> Self {
        CliSurface {
            bar: create_progress_bar(100, title),
        }
    }
}

impl ControlSurface for CliSurface {
    fn set_inputs_enabled(&self, enabled: bool) {
        debug!("Inputs {}", if enabled { "enabled" } else { "disabled" });
    }

    fn set_progress(&self, percent: u8) {
        self.bar.set_position(percent as u64);
    }

    fn report_error(&self, error: &JigError) {
        self.bar.abandon_with_message("Programming Exception");
        error!("{}", error);
    }

    fn report_warning(&self, message: &str) {
        self.bar.suspend(|| warn!("{}", message));
    }

    fn report_success(&self) {
        self.bar.finish_with_message("Done");
    }
}
