use tracing::debug;

use crate::constants::SERIAL_PROBE_TIMEOUT_MS;
use crate::error::{JigError, JigResult};

pub type BaudRate = u32;

/// Open and immediately release `port`, so an absent or busy port fails
/// before any programming is attempted.
pub(crate) fn probe(port: &str, baud: BaudRate) -> JigResult<()> {
    let serial_port = serialport::new(port, baud)
        .timeout(std::time::Duration::from_millis(SERIAL_PROBE_TIMEOUT_MS))
        .dtr_on_open(false)
        .open()
        .map_err(|e| {
            JigError::Connection(format!(
                "Unable to connect to programmer at com port {}. {}",
                port, e
            ))
        })?;

    debug!(
        "Probed {} ({:?})",
        port,
        serial_port.name().unwrap_or_else(|| port.to_string())
    );
    Ok(())
}
