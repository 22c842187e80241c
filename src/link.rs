//! Robot communication collaborator. The radio protocol lives outside this
//! crate; front ends plug in an implementation of these traits.

use crate::error::JigResult;
use crate::robot_id::RobotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFactor {
    I,
    L,
    T,
    /// No motors
    Dongle,
}

impl FormFactor {
    pub fn has_motors(self) -> bool {
        !matches!(self, FormFactor::Dongle)
    }
}

/// Acceleration in units of g
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    /// Lying flat at rest: x and y near zero, z near one g (either sign).
    pub fn is_level(&self, tolerance: f64) -> bool {
        self.x.abs() < tolerance
            && self.y.abs() < tolerance
            && (self.z.abs() - 1.0).abs() < tolerance
    }
}

/// Joint angles in degrees
pub type JointAngles = [f64; 3];

pub trait RobotLink: Send {
    fn form_factor(&mut self) -> JigResult<FormFactor>;

    /// Per-joint power in -255..=255
    fn set_motor_powers(&mut self, powers: [i16; 3]) -> JigResult<()>;

    fn accelerometer(&mut self) -> JigResult<Acceleration>;

    fn joint_angles(&mut self) -> JigResult<JointAngles>;
}

pub trait LinkFactory: Send + Sync {
    /// The robot attached to the jig itself
    fn connect_local(&self) -> JigResult<Box<dyn RobotLink>>;

    fn connect(&self, id: &RobotId) -> JigResult<Box<dyn RobotLink>>;

    /// Power-cycle the USB radio dongle
    fn cycle_dongle(&self, seconds: u8) -> JigResult<()>;
}
