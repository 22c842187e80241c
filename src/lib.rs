pub use boards::{BoardKind, BoardProfile};
pub use config::JigConfig;
pub use controls::{ControlSurface, InputLock, Selection};
pub use error::{ErrorKind, JigError, JigResult};
pub use firmware::FirmwareImage;
pub use keepalive::{DongleKeepalive, KeepaliveHandle};
pub use link::{Acceleration, FormFactor, JointAngles, LinkFactory, RobotLink};
pub use orchestrator::{FlashOrchestrator, FlashRequest, FlashSession};
pub use poller::{PollState, ProgressPoller};
pub use progress::{CancelToken, ProgressHandle};
pub use protocols::{FlashPlan, ProgrammerClient, ProgrammerFactory};
pub use robot_id::RobotId;
pub use test_runner::{LocalCheck, RobotTestRunner, TestReport, TestRun};

pub mod boards;
pub mod config;
pub(crate) mod constants;
pub mod controls;
pub mod discovery;
pub mod error;
pub mod firmware;
pub(crate) mod interface;
pub mod keepalive;
pub mod link;
pub mod orchestrator;
pub mod poller;
pub mod progress;
pub mod protocols;
pub mod robot_id;
pub mod test_runner;
pub(crate) mod util;
