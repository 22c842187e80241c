use linkbot_jig::{JigConfig, discovery};

pub(crate) fn list_ports() {
    let ports = discovery::serial_ports();
    if ports.is_empty() {
        tracing::warn!("No serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
}

pub(crate) fn list_firmware(config: &JigConfig) {
    let images = discovery::firmware_images(config);
    if images.is_empty() {
        tracing::warn!("No firmware found");
    }
    for image in images {
        println!("{}", image.display_name());
    }
}
