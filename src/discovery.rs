//! Serial port and firmware discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, warn};

use crate::config::JigConfig;
use crate::firmware::FirmwareImage;

/// Names of the currently attached serial ports, sorted. Enumeration failures
/// are logged and yield an empty list.
pub fn serial_ports() -> Vec<String> {
    let mut names: Vec<String> = match serialport::available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|port| platform_port_name(&port.port_name))
            .collect(),
        Err(e) => {
            warn!("Could not get available ports. Err {:?}", e);
            Vec::new()
        }
    };
    names.sort();
    names.dedup();
    names
}

#[cfg(windows)]
fn platform_port_name(name: &str) -> String {
    if name.starts_with(r"\\.\") {
        name.to_string()
    } else {
        format!(r"\\.\{}", name)
    }
}

#[cfg(not(windows))]
fn platform_port_name(name: &str) -> String {
    name.to_string()
}

/// Bundled default followed by every user-installed pair, deduplicated and
/// sorted by base path. Only complete pairs are returned.
pub fn firmware_images(config: &JigConfig) -> Vec<FirmwareImage> {
    let mut found: BTreeSet<FirmwareImage> = BTreeSet::new();

    match bundled_default(config) {
        Some(image) => {
            found.insert(image);
        }
        None => warn!(
            "No bundled firmware pair in {}",
            config.bundled_firmware_dir.display()
        ),
    }

    for dir in &config.user_firmware_dirs {
        found.extend(pairs_in(dir, config));
    }

    found.into_iter().collect()
}

/// Lexicographically first complete pair in the bundled firmware directory.
pub fn bundled_default(config: &JigConfig) -> Option<FirmwareImage> {
    pairs_in(&config.bundled_firmware_dir, config).into_iter().next()
}

fn pairs_in(dir: &Path, config: &JigConfig) -> Vec<FirmwareImage> {
    let pattern = dir.join(format!("*.{}", config.image_extension));
    let entries = match glob(&pattern.to_string_lossy()) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Bad firmware search pattern {}: {}", pattern.display(), e);
            return Vec::new();
        }
    };

    let mut images: Vec<FirmwareImage> = entries
        .filter_map(Result::ok)
        .filter_map(|path| {
            let base: PathBuf = path.with_extension("");
            let image = FirmwareImage::from_base(
                base,
                &config.image_extension,
                &config.calibration_extension,
            );
            if image.is_none() {
                debug!("Skipping {}: no paired calibration file", path.display());
            }
            image
        })
        .collect();
    images.sort();
    images
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), ":00000001FF\n").unwrap();
    }

    fn config_for(bundled: &Path, user: &[&Path]) -> JigConfig {
        let mut config = JigConfig::with_resource_dir(bundled);
        config.bundled_firmware_dir = bundled.to_path_buf();
        config.user_firmware_dirs = user.iter().map(|p| p.to_path_buf()).collect();
        config
    }

    #[test]
    fn unpaired_images_are_excluded() {
        let bundled = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        touch(bundled.path(), "default.hex");
        touch(bundled.path(), "default.eeprom");
        touch(user.path(), "fw1.hex");
        touch(user.path(), "fw1.eeprom");
        touch(user.path(), "fw2.hex");

        let config = config_for(bundled.path(), &[user.path()]);
        let names: Vec<String> = firmware_images(&config)
            .iter()
            .map(|image| {
                let stem = image.base().file_name().unwrap();
                stem.to_string_lossy().into_owned()
            })
            .collect();

        assert!(names.contains(&"default".to_string()));
        assert!(names.contains(&"fw1".to_string()));
        assert!(!names.contains(&"fw2".to_string()));
        for image in firmware_images(&config) {
            assert!(image.calibration_path().is_file());
        }
    }

    #[test]
    fn bundled_default_is_first_valid_pair() {
        let bundled = tempfile::tempdir().unwrap();
        touch(bundled.path(), "a.hex");
        touch(bundled.path(), "b.hex");
        touch(bundled.path(), "b.eeprom");
        touch(bundled.path(), "c.hex");
        touch(bundled.path(), "c.eeprom");

        let config = config_for(bundled.path(), &[]);
        let default = bundled_default(&config).unwrap();
        assert_eq!(default.base(), bundled.path().join("b"));
    }

    #[test]
    fn missing_search_directories_degrade_to_bundled() {
        let bundled = tempfile::tempdir().unwrap();
        touch(bundled.path(), "default.hex");
        touch(bundled.path(), "default.eeprom");

        let gone = bundled.path().join("does-not-exist");
        let config = config_for(bundled.path(), &[gone.as_path()]);
        assert_eq!(firmware_images(&config).len(), 1);
    }
}
