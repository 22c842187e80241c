use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ihex::{Reader, Record};

use crate::error::{JigError, JigResult};

/// A firmware unit: a base path `P` with a flashable image `P.<image-ext>`
/// and a paired calibration file `P.<calib-ext>` next to it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareImage {
    base: PathBuf,
    image_ext: String,
    calibration_ext: String,
}

impl FirmwareImage {
    /// Returns `None` unless both files of the pair exist.
    pub fn from_base(
        base: impl Into<PathBuf>,
        image_ext: &str,
        calibration_ext: &str,
    ) -> Option<Self> {
        let image = FirmwareImage {
            base: base.into(),
            image_ext: image_ext.to_string(),
            calibration_ext: calibration_ext.to_string(),
        };
        if image.image_path().is_file() && image.calibration_path().is_file() {
            Some(image)
        } else {
            None
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn image_path(&self) -> PathBuf {
        self.sibling(&self.image_ext)
    }

    pub fn calibration_path(&self) -> PathBuf {
        self.sibling(&self.calibration_ext)
    }

    // Base names may contain dots (`fw-1.2`), so append rather than replace.
    fn sibling(&self, ext: &str) -> PathBuf {
        let mut path = self.base.clone().into_os_string();
        path.push(".");
        path.push(ext);
        path.into()
    }

    /// Base path as shown to the operator
    pub fn display_name(&self) -> String {
        self.base.to_string_lossy().into_owned()
    }

    /// True when `name` is this image's full base path or its file stem.
    pub fn matches(&self, name: &str) -> bool {
        self.display_name() == name
            || self
                .base
                .file_name()
                .is_some_and(|stem| stem.to_string_lossy() == name)
    }

    /// Check that the flashable image is well-formed Intel HEX.
    pub fn validate(&self) -> JigResult<()> {
        read_intel_hex(&self.image_path()).map(|_| ())
    }
}

/// Contiguous byte image decoded from an Intel HEX file, keyed by absolute
/// address.
pub(crate) type MemoryImage = BTreeMap<u32, u8>;

pub(crate) fn read_intel_hex(path: &Path) -> JigResult<MemoryImage> {
    let content = fs::read_to_string(path).map_err(|e| {
        JigError::FirmwareError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_intel_hex(&content).map_err(|e| match e {
        JigError::FirmwareError(msg) => {
            JigError::FirmwareError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse intel hex file raw string to an address map
pub(crate) fn parse_intel_hex(hex_content: &str) -> JigResult<MemoryImage> {
    let mut image = MemoryImage::new();
    let mut upper: u32 = 0;

    for record in Reader::new(hex_content) {
        match record {
            Ok(Record::Data { offset, value }) => {
                let start = upper + offset as u32;
                for (i, byte) in value.into_iter().enumerate() {
                    image.insert(start + i as u32, byte);
                }
            }
            Ok(Record::ExtendedSegmentAddress(segment)) => upper = (segment as u32) << 4,
            Ok(Record::ExtendedLinearAddress(high)) => upper = (high as u32) << 16,
            Ok(Record::EndOfFile) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(JigError::FirmwareError(format!(
                    "Failed parsing record in hex file {:?}",
                    e
                )));
            }
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_with_linear_address() {
        let hex = ":020000040001F9\n:0400100001020304E2\n:00000001FF\n";
        let image = parse_intel_hex(hex).unwrap();
        assert_eq!(image.len(), 4);
        assert_eq!(image[&0x0001_0010], 0x01);
        assert_eq!(image[&0x0001_0013], 0x04);
    }

    #[test]
    fn rejects_bad_checksum() {
        let hex = ":0400100001020304E3\n:00000001FF\n";
        assert!(matches!(
            parse_intel_hex(hex),
            Err(JigError::FirmwareError(_))
        ));
    }
}
