//! Runtime configuration, built once at startup and handed to every component.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    ACCEL_TOLERANCE, BOOTLOADER_FILE, CALIBRATION_EXTENSION, IMAGE_EXTENSION,
    KEEPALIVE_INTERVAL_MS, MOTOR_RUN_MS, POLL_INTERVAL_MS, ROBOT_TIMEOUT_MS,
    SERIAL_ID_EEPROM_ADDRESS, USER_FIRMWARE_SUBDIRS,
};

#[derive(Debug, Clone)]
pub struct JigConfig {
    /// Directory holding the bundled firmware pairs (`<resources>/hexfiles`).
    pub bundled_firmware_dir: PathBuf,
    /// Bootloader written after the application image on main-boards.
    pub bootloader_image: PathBuf,
    /// Extra directories scanned for user-installed firmware pairs.
    pub user_firmware_dirs: Vec<PathBuf>,
    pub image_extension: String,
    pub calibration_extension: String,

    pub poll_interval: Duration,
    pub keepalive_interval: Duration,
    pub motor_run: Duration,
    /// Upper bound for each group of calls made to a robot during testing.
    pub robot_timeout: Duration,
    pub accel_tolerance: f64,

    pub serial_id_eeprom_address: u16,

    /// `avrdude` executable; looked up on `PATH` when unset.
    pub avrdude: Option<PathBuf>,
    /// Overrides the board profile's baud rate.
    pub baud: Option<u32>,
}

impl JigConfig {
    /// Configuration for a resource directory laid out as
    /// `hexfiles/*.{hex,eeprom}` and `bootloader/<bootloader>.hex`.
    pub fn with_resource_dir(resources: impl AsRef<Path>) -> Self {
        let resources = resources.as_ref();
        JigConfig {
            bundled_firmware_dir: resources.join("hexfiles"),
            bootloader_image: resources.join("bootloader").join(BOOTLOADER_FILE),
            user_firmware_dirs: Self::user_firmware_dirs(),
            image_extension: IMAGE_EXTENSION.to_string(),
            calibration_extension: CALIBRATION_EXTENSION.to_string(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            keepalive_interval: Duration::from_millis(KEEPALIVE_INTERVAL_MS),
            motor_run: Duration::from_millis(MOTOR_RUN_MS),
            robot_timeout: Duration::from_millis(ROBOT_TIMEOUT_MS),
            accel_tolerance: ACCEL_TOLERANCE,
            serial_id_eeprom_address: SERIAL_ID_EEPROM_ADDRESS,
            avrdude: None,
            baud: None,
        }
    }

    /// Per-user firmware directories. Empty when no home directory is known,
    /// in which case only the bundled firmware is offered.
    pub fn user_firmware_dirs() -> Vec<PathBuf> {
        match dirs::home_dir() {
            Some(home) => USER_FIRMWARE_SUBDIRS
                .iter()
                .map(|sub| home.join(sub))
                .collect(),
            None => {
                tracing::warn!("No home directory; user firmware will not be searched");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_dir_layout() {
        let config = JigConfig::with_resource_dir("/opt/jig");
        assert_eq!(
            config.bundled_firmware_dir,
            PathBuf::from("/opt/jig/hexfiles")
        );
        assert_eq!(
            config.bootloader_image,
            PathBuf::from("/opt/jig/bootloader/ATmegaBOOT_168_mega128rfa1_8MHz.hex")
        );
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.keepalive_interval, Duration::from_secs(1));
    }
}
