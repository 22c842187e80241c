//! Post-flash smoke test: exercise the jig robot, then reach the new board.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::JigConfig;
use crate::constants::FULL_MOTOR_POWER;
use crate::controls::{ControlSurface, InputLock};
use crate::error::{JigError, JigResult};
use crate::link::{Acceleration, JointAngles, LinkFactory, RobotLink};
use crate::robot_id::RobotId;
use crate::util::with_timeout;

/// Result of the jig robot's own motor and accelerometer check.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalCheck {
    /// The jig robot has no motors; nothing was exercised.
    NoMotors,
    Exercised {
        acceleration: Acceleration,
        level: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub target: RobotId,
    pub local: JigResult<LocalCheck>,
    /// Joint angles read back from the freshly flashed board
    pub remote: JigResult<JointAngles>,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        let local_ok = match &self.local {
            Ok(LocalCheck::NoMotors) => true,
            Ok(LocalCheck::Exercised { level, .. }) => *level,
            Err(_) => false,
        };
        local_ok && self.remote.is_ok()
    }
}

/// An in-flight test. Exactly one report is delivered.
pub struct TestRun {
    report: Receiver<TestReport>,
    worker: JoinHandle<()>,
}

impl TestRun {
    /// Block until the run is over.
    pub fn wait(self) -> JigResult<TestReport> {
        let report = self.report.recv().map_err(|_| {
            JigError::Communication("Test worker ended without a report".to_string())
        });
        let _ = self.worker.join();
        report
    }

    /// Non-blocking check for the report
    pub fn try_report(&self) -> Option<TestReport> {
        match self.report.try_recv() {
            Ok(report) => Some(report),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[derive(Clone)]
pub struct RobotTestRunner {
    links: Arc<dyn LinkFactory>,
    motor_run: Duration,
    timeout: Duration,
    tolerance: f64,
}

impl RobotTestRunner {
    pub fn new(config: &JigConfig, links: Arc<dyn LinkFactory>) -> Self {
        RobotTestRunner {
            links,
            motor_run: config.motor_run,
            timeout: config.robot_timeout,
            tolerance: config.accel_tolerance,
        }
    }

    /// Start a test of the board addressed by `target` on a worker thread.
    /// Inputs are disabled until the worker is done, whatever happens in it.
    pub fn spawn(
        &self,
        target: RobotId,
        surface: Arc<dyn ControlSurface>,
    ) -> JigResult<TestRun> {
        let lock = InputLock::engage(surface.clone());
        let (tx, report) = mpsc::channel();
        let runner = self.clone();

        let worker = thread::Builder::new()
            .name("robot-test".to_string())
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| runner.run(&target, &*surface)));
                let report = outcome.unwrap_or_else(|_| {
                    let failure = JigError::Communication("Robot test aborted".to_string());
                    surface.report_error(&failure);
                    TestReport {
                        target: target.clone(),
                        local: Err(failure.clone()),
                        remote: Err(failure),
                    }
                });
                drop(lock);
                let _ = tx.send(report);
            })
            .map_err(|e| JigError::Communication(format!("Failed to start robot test: {}", e)))?;

        Ok(TestRun { report, worker })
    }

    fn run(&self, target: &RobotId, surface: &dyn ControlSurface) -> TestReport {
        info!("Testing robot {}", target);

        let local = self.check_local();
        match &local {
            Ok(LocalCheck::Exercised { level: false, acceleration }) => {
                warn!("Accelerometer anomaly: {:?}", acceleration);
                surface.report_warning("Accelerometer anomaly detected.");
            }
            Err(e) => {
                warn!("Jig robot check failed: {}", e);
                surface.report_error(e);
            }
            Ok(_) => {}
        }

        let remote = self.check_remote(target);
        match &remote {
            Ok(angles) => info!("Robot {} joint angles {:?}", target, angles),
            Err(e) => {
                warn!("Error communicating with remote robot {}: {}", target, e);
                surface.report_error(&JigError::Communication(format!(
                    "Error communicating with remote robot {}: {}",
                    target, e
                )));
            }
        }

        TestReport {
            target: target.clone(),
            local,
            remote,
        }
    }

    fn check_local(&self) -> JigResult<LocalCheck> {
        let links = self.links.clone();
        let (link, form_factor) = with_timeout(self.timeout, move || {
            let mut link = links.connect_local()?;
            let form_factor = link.form_factor()?;
            Ok((link, form_factor))
        })?;
        if !form_factor.has_motors() {
            return Ok(LocalCheck::NoMotors);
        }

        let acceleration = self.exercise(link).inspect_err(|_| self.stop_motors())?;
        Ok(LocalCheck::Exercised {
            acceleration,
            level: acceleration.is_level(self.tolerance),
        })
    }

    /// Full power forward, then reverse, then stop and sample at rest.
    fn exercise(&self, link: Box<dyn RobotLink>) -> JigResult<Acceleration> {
        let full = FULL_MOTOR_POWER;
        let (link, _) = self.call(link, move |l| l.set_motor_powers([full; 3]))?;
        thread::sleep(self.motor_run);
        let (link, _) = self.call(link, move |l| l.set_motor_powers([-full; 3]))?;
        thread::sleep(self.motor_run);
        let (link, _) = self.call(link, |l| l.set_motor_powers([0; 3]))?;
        let (_, acceleration) = self.call(link, |l| l.accelerometer())?;
        Ok(acceleration)
    }

    /// Best-effort stop over a fresh link; the old one may be stuck in a call.
    fn stop_motors(&self) {
        let links = self.links.clone();
        let stopped = with_timeout(self.timeout, move || {
            let mut link = links.connect_local()?;
            link.set_motor_powers([0; 3])
        });
        if let Err(e) = stopped {
            warn!("Could not stop jig robot motors: {}", e);
        }
    }

    fn check_remote(&self, target: &RobotId) -> JigResult<JointAngles> {
        let links = self.links.clone();
        let target = target.clone();
        with_timeout(self.timeout, move || {
            let mut link = links.connect(&target)?;
            link.joint_angles()
        })
    }

    fn call<T, F>(&self, link: Box<dyn RobotLink>, f: F) -> JigResult<(Box<dyn RobotLink>, T)>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn RobotLink) -> JigResult<T> + Send + 'static,
    {
        with_timeout(self.timeout, move || {
            let mut link = link;
            let value = f(link.as_mut())?;
            Ok((link, value))
        })
    }
}
