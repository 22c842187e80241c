use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::controls::ControlSurface;
use crate::error::JigResult;
use crate::orchestrator::FlashSession;

#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Running { percent: u8 },
    Finished(JigResult<()>),
}

/// Samples a [`FlashSession`] and mirrors it onto a [`ControlSurface`].
pub struct ProgressPoller {
    session: FlashSession,
    surface: Arc<dyn ControlSurface>,
    interval: Duration,
    shown: u8,
    outcome: Option<JigResult<()>>,
}

impl ProgressPoller {
    pub fn new(
        session: FlashSession,
        surface: Arc<dyn ControlSurface>,
        interval: Duration,
    ) -> Self {
        ProgressPoller {
            session,
            surface,
            interval,
            shown: 0,
            outcome: None,
        }
    }

    pub fn session(&self) -> &FlashSession {
        &self.session
    }

    /// One sample. Once the session has ended this keeps returning the same
    /// `Finished` state without touching the surface again.
    pub fn tick(&mut self) -> PollState {
        if let Some(outcome) = &self.outcome {
            return PollState::Finished(outcome.clone());
        }

        let progress = self.session.progress.clone();
        // Read the flag before the fraction: if the session was already done,
        // the fraction read afterwards is final.
        let active = progress.is_active();
        self.show((progress.fraction() * 100.0).floor() as u8);

        if active {
            return PollState::Running {
                percent: self.shown,
            };
        }

        self.session.close();
        let outcome = match progress.failure() {
            Some(e) => {
                self.surface.report_error(&e);
                Err(e)
            }
            None => {
                self.show(100);
                self.surface.report_success();
                info!("Programming complete");
                Ok(())
            }
        };
        self.outcome = Some(outcome.clone());
        PollState::Finished(outcome)
    }

    /// Tick every interval until the session ends.
    pub fn run(mut self) -> JigResult<()> {
        loop {
            if let PollState::Finished(outcome) = self.tick() {
                return outcome;
            }
            thread::sleep(self.interval);
        }
    }

    fn show(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent > self.shown {
            debug!("Progress {}%", percent);
            self.shown = percent;
            self.surface.set_progress(percent);
        }
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        if self.outcome.is_none() && self.session.progress.is_active() {
            // Abandoned mid-session; the worker stops before its next step.
            self.session.cancel();
        }
    }
}

