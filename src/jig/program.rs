use std::sync::Arc;

use clap::Parser;
use linkbot_jig::{
    BoardKind, FlashOrchestrator, FlashRequest, JigConfig, ProgressPoller, Selection,
    discovery,
    error::{JigError, JigResult},
    protocols::avrdude::AvrdudeFactory,
};
use tracing::{error, info};

use crate::surface::CliSurface;

#[derive(Parser, Debug, Clone)]
pub(crate) struct ProgramOptions {
    /// Board type
    #[clap(short, long, value_enum, default_value_t = BoardKind::MainBoard)]
    board: BoardKind,

    /// Firmware base name (default: first available)
    #[clap(short, long)]
    firmware: Option<String>,

    /// Serial port (default: first available)
    #[clap(short, long)]
    serial: Option<String>,

    /// Verify after writing (main-boards only)
    #[clap(long, default_value_t = false)]
    verify: bool,
}

fn select(opts: &ProgramOptions, config: &JigConfig) -> JigResult<Selection> {
    let images = discovery::firmware_images(config);
    let firmware = match &opts.firmware {
        Some(name) => Some(
            images
                .into_iter()
                .find(|image| image.matches(name))
                .ok_or_else(|| JigError::Validation(format!("Unknown firmware {}", name)))?,
        ),
        None => images.into_iter().next(),
    };
    let port = opts
        .serial
        .clone()
        .or_else(|| discovery::serial_ports().into_iter().next());

    Ok(Selection {
        port,
        firmware,
        robot_id_text: String::new(),
    })
}

fn checked_selection(opts: &ProgramOptions, config: &JigConfig) -> JigResult<Selection> {
    let selection = select(opts, config)?;
    if !selection.can_flash() {
        return Err(JigError::Validation(
            "Need both a serial port and a firmware image to program".to_string(),
        ));
    }
    Ok(selection)
}

/// Every failure is reported exactly once, either here or on the surface.
pub(crate) fn handle_programming(opts: ProgramOptions, config: JigConfig) -> JigResult<()> {
    let selection = checked_selection(&opts, &config).inspect_err(|e| error!("{}", e))?;

    let surface = Arc::new(CliSurface::new(opts.board.title()));
    let programmers = Arc::new(AvrdudeFactory {
        avrdude: config.avrdude.clone(),
        baud: config.baud,
    });
    let poll_interval = config.poll_interval;
    let orchestrator = FlashOrchestrator::new(config, programmers);

    let request = FlashRequest {
        board: opts.board,
        port: selection.port,
        firmware: selection.firmware,
        verify: opts.verify,
    };
    let session = orchestrator.start(&request, surface.clone())?;
    if let Some(id) = session.serial_id() {
        info!("Assigned serial id {}", id);
    }

    ProgressPoller::new(session, surface, poll_interval).run()
}
