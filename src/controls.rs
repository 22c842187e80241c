//! Front-end neutral view of the operator controls.

use std::sync::Arc;

use crate::error::JigError;
use crate::firmware::FirmwareImage;
use crate::robot_id::RobotId;

/// What a front end has to render. Implementations are shared between the
/// thread driving the poller and background workers.
pub trait ControlSurface: Send + Sync {
    /// Enable or disable the flash/test inputs
    fn set_inputs_enabled(&self, enabled: bool);

    /// Progress in the 0..=100 display range
    fn set_progress(&self, percent: u8);

    fn report_error(&self, error: &JigError);

    fn report_warning(&self, message: &str);

    fn report_success(&self) {}
}

/// Keeps inputs disabled while held; re-enables them when dropped.
pub struct InputLock {
    surface: Arc<dyn ControlSurface>,
}

impl InputLock {
    pub fn engage(surface: Arc<dyn ControlSurface>) -> Self {
        surface.set_inputs_enabled(false);
        InputLock { surface }
    }
}

impl Drop for InputLock {
    fn drop(&mut self) {
        self.surface.set_inputs_enabled(true);
    }
}

/// Current operator choices and the enablement rules derived from them.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub port: Option<String>,
    pub firmware: Option<FirmwareImage>,
    pub robot_id_text: String,
}

impl Selection {
    pub fn can_flash(&self) -> bool {
        self.port.as_deref().is_some_and(|p| !p.is_empty()) && self.firmware.is_some()
    }

    pub fn can_test(&self) -> bool {
        RobotId::parse(&self.robot_id_text).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Toggles(Mutex<Vec<bool>>);

    impl ControlSurface for Toggles {
        fn set_inputs_enabled(&self, enabled: bool) {
            self.0.lock().unwrap().push(enabled);
        }
        fn set_progress(&self, _percent: u8) {}
        fn report_error(&self, _error: &JigError) {}
        fn report_warning(&self, _message: &str) {}
    }

    #[test]
    fn lock_disables_then_enables_once() {
        let toggles = Arc::new(Toggles::default());
        {
            let _lock = InputLock::engage(toggles.clone());
            assert_eq!(*toggles.0.lock().unwrap(), vec![false]);
        }
        assert_eq!(*toggles.0.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn empty_selection_cannot_flash() {
        let mut selection = Selection::default();
        assert!(!selection.can_flash());
        selection.port = Some(String::new());
        assert!(!selection.can_flash());
        selection.port = Some("/dev/ttyACM0".into());
        assert!(!selection.can_flash());
    }

    #[test]
    fn test_needs_four_character_id() {
        let mut selection = Selection {
            robot_id_text: "ZRG".into(),
            ..Default::default()
        };
        assert!(!selection.can_test());
        selection.robot_id_text.push('6');
        assert!(selection.can_test());
    }
}
