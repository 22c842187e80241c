pub(crate) const SERIAL_PROBE_TIMEOUT_MS: u64 = 100;

pub(crate) const POLL_INTERVAL_MS: u64 = 500;
pub(crate) const KEEPALIVE_INTERVAL_MS: u64 = 1000;
pub(crate) const MOTOR_RUN_MS: u64 = 2000;
pub(crate) const ROBOT_TIMEOUT_MS: u64 = 5000;

pub(crate) const ACCEL_TOLERANCE: f64 = 0.1;
pub(crate) const FULL_MOTOR_POWER: i16 = 255;

/// Argument of the dongle-cycle command issued by the keepalive loop.
pub(crate) const DONGLE_CYCLE_SECONDS: u8 = 2;

/// EEPROM byte address where the 4 ASCII digits of the serial id are stored.
pub(crate) const SERIAL_ID_EEPROM_ADDRESS: u16 = 0x0412;

pub(crate) const ROBOT_ID_MIN: u16 = 1000;
pub(crate) const ROBOT_ID_MAX: u16 = 9999;

pub(crate) const IMAGE_EXTENSION: &str = "hex";
pub(crate) const CALIBRATION_EXTENSION: &str = "eeprom";

pub(crate) const BOOTLOADER_FILE: &str = "ATmegaBOOT_168_mega128rfa1_8MHz.hex";

/// Per-user firmware locations, relative to the home directory.
pub(crate) const USER_FIRMWARE_SUBDIRS: [&str; 2] = [
    ".local/share/Barobo/LinkbotLabs/firmware",
    "usr/share/Barobo/LinkbotLabs/firmware",
];
