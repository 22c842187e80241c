use std::path::PathBuf;

use crate::boards::BoardKind;
use crate::error::JigResult;
use crate::progress::{CancelToken, ProgressHandle};
use crate::robot_id::RobotId;

pub mod avrdude;
pub(crate) mod eeprom;

/// Everything a programmer client needs to write one board.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashPlan {
    pub board: BoardKind,
    /// Flash images in write order
    pub images: Vec<PathBuf>,
    /// Paired calibration image, written to EEPROM with `serial_id` overlaid
    pub calibration: Option<PathBuf>,
    pub serial_id: Option<RobotId>,
    pub serial_id_address: u16,
    pub verify: bool,
}

/// A connected programmer. `program_all` runs on a worker thread; it reports
/// through `progress` and should give up between steps once `cancel` fires.
pub trait ProgrammerClient: Send {
    fn program_all(
        &mut self,
        plan: &FlashPlan,
        progress: &ProgressHandle,
        cancel: &CancelToken,
    ) -> JigResult<()>;
}

/// Binds programmer clients to serial ports.
pub trait ProgrammerFactory: Send + Sync {
    fn connect(&self, port: &str, board: BoardKind) -> JigResult<Box<dyn ProgrammerClient>>;
}
