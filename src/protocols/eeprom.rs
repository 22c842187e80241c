//! Serial id burn-in: the calibration image with the id overlaid.

use std::io::Write;
use std::path::Path;

use ihex::Record;
use tempfile::NamedTempFile;

use crate::error::{JigError, JigResult};
use crate::firmware::{MemoryImage, read_intel_hex};
use crate::robot_id::RobotId;

const BYTES_PER_RECORD: usize = 16;

/// Overlay the ASCII bytes of `id` at `address`.
pub(crate) fn overlay_serial_id(image: &mut MemoryImage, id: &RobotId, address: u16) {
    for (i, byte) in id.as_bytes().iter().enumerate() {
        image.insert(address as u32 + i as u32, *byte);
    }
}

/// Encode an address map as Intel HEX, one record per 16-byte run.
pub(crate) fn to_intel_hex(image: &MemoryImage) -> JigResult<String> {
    let mut records = Vec::new();
    let mut upper: Option<u16> = None;
    let mut run: Vec<u8> = Vec::with_capacity(BYTES_PER_RECORD);
    let mut run_start: u32 = 0;

    for (&address, &byte) in image {
        let high = (address >> 16) as u16;
        let contiguous = !run.is_empty()
            && address == run_start + run.len() as u32
            && run.len() < BYTES_PER_RECORD
            && upper == Some(high);

        if !contiguous {
            flush(&mut records, run_start, &mut run);
            if upper != Some(high) {
                if high != 0 || upper.is_some() {
                    records.push(Record::ExtendedLinearAddress(high));
                }
                upper = Some(high);
            }
            run_start = address;
        }
        run.push(byte);
    }
    flush(&mut records, run_start, &mut run);
    records.push(Record::EndOfFile);

    ihex::create_object_file_representation(&records)
        .map_err(|e| JigError::FirmwareError(format!("Failed encoding EEPROM image {:?}", e)))
}

fn flush(records: &mut Vec<Record>, start: u32, run: &mut Vec<u8>) {
    if !run.is_empty() {
        records.push(Record::Data {
            offset: (start & 0xFFFF) as u16,
            value: std::mem::take(run),
        });
    }
}

/// Write the calibration file at `calibration`, with `id` burned in, to a
/// temporary Intel HEX file. The file is removed when the handle drops.
pub(crate) fn patched_calibration(
    calibration: &Path,
    id: &RobotId,
    address: u16,
) -> JigResult<NamedTempFile> {
    let mut image = read_intel_hex(calibration)?;
    overlay_serial_id(&mut image, id, address);
    let encoded = to_intel_hex(&image)?;

    let mut file = tempfile::Builder::new()
        .prefix("linkbot-eeprom-")
        .suffix(".hex")
        .tempfile()
        .map_err(|e| JigError::FirmwareError(format!("Failed to create EEPROM image: {}", e)))?;
    file.write_all(encoded.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| JigError::FirmwareError(format!("Failed to write EEPROM image: {}", e)))?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firmware::parse_intel_hex;

    #[test]
    fn id_lands_at_address_and_keeps_calibration() {
        let mut image = parse_intel_hex(":040000001122334452\n:00000001FF\n").unwrap();
        overlay_serial_id(&mut image, &RobotId::from_number(1234), 0x0412);

        let decoded = parse_intel_hex(&to_intel_hex(&image).unwrap()).unwrap();
        assert_eq!(decoded[&0], 0x11);
        assert_eq!(decoded[&3], 0x44);
        let id: Vec<u8> = (0x0412..0x0416).map(|a| decoded[&a]).collect();
        assert_eq!(id, b"1234");
    }

    #[test]
    fn long_runs_are_split_into_records() {
        let image: MemoryImage = (0u32..40).map(|a| (a, a as u8)).collect();
        let encoded = to_intel_hex(&image).unwrap();
        // 16 + 16 + 8 data records, then EOF
        assert_eq!(encoded.lines().count(), 4);
        assert_eq!(parse_intel_hex(&encoded).unwrap(), image);
    }

    #[test]
    fn patched_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let calibration = dir.path().join("fw1.eeprom");
        std::fs::write(&calibration, ":040000001122334452\n:00000001FF\n").unwrap();

        let patched =
            patched_calibration(&calibration, &RobotId::from_number(4821), 0x0412).unwrap();
        let decoded = read_intel_hex(patched.path()).unwrap();
        assert_eq!(decoded[&0x0412], b'4');
        assert_eq!(decoded[&0x0415], b'1');
    }
}
