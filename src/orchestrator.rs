//! Starts programming sessions: connect, plan, submit to a worker thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::boards::BoardKind;
use crate::config::JigConfig;
use crate::controls::{ControlSurface, InputLock};
use crate::error::{JigError, JigResult};
use crate::firmware::FirmwareImage;
use crate::progress::{CancelToken, ProgressHandle};
use crate::protocols::{FlashPlan, ProgrammerFactory};
use crate::robot_id::RobotId;

/// Operator input for one flash.
#[derive(Debug, Clone)]
pub struct FlashRequest {
    pub board: BoardKind,
    pub port: Option<String>,
    pub firmware: Option<FirmwareImage>,
    /// Ignored for boards that cannot verify
    pub verify: bool,
}

/// A running programming session. Dropping it does not stop the worker, and
/// inputs stay disabled until the worker has finished.
pub struct FlashSession {
    pub(crate) progress: ProgressHandle,
    pub(crate) worker: Option<JoinHandle<()>>,
    cancel: CancelToken,
    plan: FlashPlan,
}

impl FlashSession {
    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    pub fn plan(&self) -> &FlashPlan {
        &self.plan
    }

    /// Serial id being burned in, for main-boards
    pub fn serial_id(&self) -> Option<&RobotId> {
        self.plan.serial_id.as_ref()
    }

    /// Ask the worker to stop before its next step. A step already under
    /// way runs to completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Reap the worker once the session is over. Inputs are re-enabled by
    /// the time this returns.
    pub(crate) fn close(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Programming worker panicked");
            }
        }
    }
}

pub struct FlashOrchestrator {
    config: JigConfig,
    programmers: Arc<dyn ProgrammerFactory>,
}

impl FlashOrchestrator {
    pub fn new(config: JigConfig, programmers: Arc<dyn ProgrammerFactory>) -> Self {
        FlashOrchestrator {
            config,
            programmers,
        }
    }

    pub fn config(&self) -> &JigConfig {
        &self.config
    }

    /// Connect to the programmer and submit the write sequence. Returns as
    /// soon as the worker is running; watch it with a
    /// [`ProgressPoller`](crate::poller::ProgressPoller).
    ///
    /// Validation and connection failures are reported on `surface` and
    /// returned; inputs stay enabled and nothing is left running.
    pub fn start(
        &self,
        request: &FlashRequest,
        surface: Arc<dyn ControlSurface>,
    ) -> JigResult<FlashSession> {
        self.try_start(request, surface.clone()).inspect_err(|e| {
            warn!("Programming not started: {}", e);
            surface.report_error(e);
        })
    }

    fn try_start(
        &self,
        request: &FlashRequest,
        surface: Arc<dyn ControlSurface>,
    ) -> JigResult<FlashSession> {
        let port = request
            .port
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| JigError::Validation("No serial port selected".to_string()))?;
        let firmware = request
            .firmware
            .as_ref()
            .ok_or_else(|| JigError::Validation("No firmware selected".to_string()))?;
        firmware.validate()?;

        let mut client = self.programmers.connect(port, request.board)?;
        let plan = self.plan(request.board, firmware, request.verify);
        info!(
            "Programming {} on {}: {:?}",
            firmware.display_name(),
            port,
            plan.images
        );

        let lock = InputLock::engage(surface.clone());
        surface.set_progress(0);

        let progress = ProgressHandle::started();
        let cancel = CancelToken::new();
        let worker = {
            let progress = progress.clone();
            let cancel = cancel.clone();
            let plan = plan.clone();
            thread::Builder::new()
                .name("flash-worker".to_string())
                .spawn(move || {
                    let outcome = client.program_all(&plan, &progress, &cancel);
                    if let Err(e) = &outcome {
                        error!("Programming failed: {}", e);
                    }
                    progress.finish(outcome);
                    drop(lock);
                })
                .map_err(|e| {
                    JigError::WriteVerify(format!("Failed to start programming worker: {}", e))
                })?
        };

        Ok(FlashSession {
            progress,
            worker: Some(worker),
            cancel,
            plan,
        })
    }

    /// Main-boards: [application, bootloader] plus the calibration image with
    /// a fresh serial id. Dongles: [application], never verified.
    pub fn plan(&self, board: BoardKind, firmware: &FirmwareImage, verify: bool) -> FlashPlan {
        let profile = board.profile();
        let mut images = vec![firmware.image_path()];
        if profile.writes_bootloader {
            images.push(self.config.bootloader_image.clone());
        }
        let (calibration, serial_id) = if profile.assigns_serial_id {
            (Some(firmware.calibration_path()), Some(RobotId::generate()))
        } else {
            (None, None)
        };

        FlashPlan {
            board,
            images,
            calibration,
            serial_id,
            serial_id_address: self.config.serial_id_eeprom_address,
            verify: verify && profile.allows_verify,
        }
    }
}
