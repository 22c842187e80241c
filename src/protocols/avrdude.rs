//! Programmer client that drives an STK500v2 programmer through `avrdude`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{FlashPlan, ProgrammerClient, ProgrammerFactory, eeprom};
use crate::boards::{BoardKind, BoardProfile};
use crate::error::{JigError, JigResult};
use crate::interface::serialport::{BaudRate, probe};
use crate::progress::{CancelToken, ProgressHandle};

const PROGRAMMER_ID: &str = "stk500v2";
const STDERR_TAIL_LINES: usize = 5;

/// Creates [`AvrdudeProgrammer`]s
#[derive(Debug, Clone, Default)]
pub struct AvrdudeFactory {
    /// Executable to run; looked up on `PATH` when `None`
    pub avrdude: Option<PathBuf>,
    pub baud: Option<BaudRate>,
}

impl AvrdudeFactory {
    fn executable(&self) -> JigResult<PathBuf> {
        match &self.avrdude {
            Some(path) => Ok(path.clone()),
            None => which::which("avrdude").map_err(|e| {
                JigError::Connection(format!("avrdude not found on PATH: {}", e))
            }),
        }
    }
}

impl ProgrammerFactory for AvrdudeFactory {
    fn connect(&self, port: &str, board: BoardKind) -> JigResult<Box<dyn ProgrammerClient>> {
        let avrdude = self.executable()?;
        let profile = board.profile();
        let baud = self.baud.unwrap_or(profile.baud);
        probe(port, baud)?;

        info!("Connected to programmer at {} ({})", port, profile.part);
        Ok(Box::new(AvrdudeProgrammer {
            avrdude,
            port: port.to_string(),
            baud,
            profile,
        }))
    }
}

pub struct AvrdudeProgrammer {
    avrdude: PathBuf,
    port: String,
    baud: BaudRate,
    profile: BoardProfile,
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Flash { image: PathBuf, erase: bool },
    Eeprom { image: PathBuf },
}

impl AvrdudeProgrammer {
    fn args(&self, step: &Step, verify: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-p".into(),
            self.profile.part.into(),
            "-c".into(),
            PROGRAMMER_ID.into(),
            "-P".into(),
            self.port.clone().into(),
            "-b".into(),
            self.baud.to_string().into(),
        ];
        if !verify {
            args.push("-V".into());
        }

        let (memory, image) = match step {
            Step::Flash { image, erase } => {
                // avrdude erases before a flash write unless told not to.
                if !erase {
                    args.push("-D".into());
                }
                ("flash", image)
            }
            Step::Eeprom { image } => {
                args.push("-D".into());
                ("eeprom", image)
            }
        };
        args.push("-U".into());
        args.push(memory_operation(memory, image));
        args
    }

    fn run(&self, step: &Step, verify: bool) -> JigResult<()> {
        debug!("avrdude step {:?}", step);
        let output = Command::new(&self.avrdude)
            .args(self.args(step, verify))
            .output()
            .map_err(|e| {
                JigError::WriteVerify(format!(
                    "Failed to run {}: {}",
                    self.avrdude.display(),
                    e
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
        Err(JigError::WriteVerify(format!(
            "avrdude exited with {}: {}",
            output.status, tail
        )))
    }
}

fn memory_operation(memory: &str, image: &Path) -> OsString {
    let mut op = OsString::from(format!("{}:w:", memory));
    op.push(image.as_os_str());
    op.push(":i");
    op
}

fn plan_steps(plan: &FlashPlan, eeprom_image: Option<&Path>) -> Vec<Step> {
    let mut steps: Vec<Step> = plan
        .images
        .iter()
        .enumerate()
        .map(|(i, image)| Step::Flash {
            image: image.clone(),
            erase: i == 0,
        })
        .collect();
    if let Some(image) = eeprom_image {
        steps.push(Step::Eeprom {
            image: image.to_path_buf(),
        });
    }
    steps
}

impl ProgrammerClient for AvrdudeProgrammer {
    fn program_all(
        &mut self,
        plan: &FlashPlan,
        progress: &ProgressHandle,
        cancel: &CancelToken,
    ) -> JigResult<()> {
        // Keeps the temporary file alive until every step has run.
        let patched = match (&plan.calibration, &plan.serial_id) {
            (Some(calibration), Some(id)) => Some(eeprom::patched_calibration(
                calibration,
                id,
                plan.serial_id_address,
            )?),
            _ => None,
        };
        let steps = plan_steps(plan, patched.as_ref().map(|f| f.path()));
        let total = steps.len();

        info!("Started programming {} step(s) on {}", total, self.port);
        for (done, step) in steps.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(JigError::Cancelled);
            }
            self.run(step, plan.verify)?;
            progress.advance_to((done + 1) as f64 / total as f64);
        }

        if let Some(id) = &plan.serial_id {
            info!("Programmed board with serial id {}", id);
        }
        Ok(())
    }
}
