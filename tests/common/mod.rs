#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use linkbot_jig::{ControlSurface, FirmwareImage, JigConfig, JigError};

pub const HEX: &str = ":040000001122334452\n:00000001FF\n";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Inputs(bool),
    Progress(u8),
    Error(JigError),
    Warning(String),
    Success,
}

/// Records everything a front end would have shown.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<Event>>,
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn toggles(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Inputs(enabled) => Some(enabled),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<JigError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Warning(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ControlSurface for RecordingSurface {
    fn set_inputs_enabled(&self, enabled: bool) {
        self.push(Event::Inputs(enabled));
    }

    fn set_progress(&self, percent: u8) {
        self.push(Event::Progress(percent));
    }

    fn report_error(&self, error: &JigError) {
        self.push(Event::Error(error.clone()));
    }

    fn report_warning(&self, message: &str) {
        self.push(Event::Warning(message.to_string()));
    }

    fn report_success(&self) {
        self.push(Event::Success);
    }
}

/// A firmware pair `<dir>/<name>.{hex,eeprom}`
pub fn firmware_pair(dir: &Path, name: &str) -> FirmwareImage {
    fs::write(dir.join(format!("{}.hex", name)), HEX).unwrap();
    fs::write(dir.join(format!("{}.eeprom", name)), HEX).unwrap();
    FirmwareImage::from_base(dir.join(name), "hex", "eeprom").unwrap()
}

pub fn test_config(dir: &Path) -> JigConfig {
    let mut config = JigConfig::with_resource_dir(dir);
    config.user_firmware_dirs = Vec::new();
    config.poll_interval = std::time::Duration::from_millis(5);
    config.motor_run = std::time::Duration::from_millis(10);
    config.robot_timeout = std::time::Duration::from_millis(300);
    config
}
