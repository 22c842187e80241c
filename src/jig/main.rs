use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use linkbot_jig::{ErrorKind, JigConfig, error::JigResult};
use list::{list_firmware, list_ports};
use program::{ProgramOptions, handle_programming};

mod list;
mod program;
mod surface;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalOptions {
    /// Directory with the bundled `hexfiles/` and `bootloader/`
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    /// avrdude executable (default: found on PATH)
    #[arg(long, global = true)]
    avrdude: Option<PathBuf>,

    /// Programmer baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Program a board on the jig
    #[command(name = "program", alias = "p")]
    Program(ProgramOptions),

    /// List attached serial ports
    Ports,

    /// List available firmware
    Firmware,
}

impl GlobalOptions {
    fn config(&self) -> JigConfig {
        let resources = self.resources.clone().unwrap_or_else(default_resources);
        let mut config = JigConfig::with_resource_dir(resources);
        config.avrdude = self.avrdude.clone();
        config.baud = self.baud;
        config
    }
}

/// `resources/` next to the executable
fn default_resources() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("resources")))
        .unwrap_or_else(|| PathBuf::from("resources"))
}

/// Failures are already reported by the time they get here; only the exit
/// status is left to set.
fn exit_code(outcome: &JigResult<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(e) => match e.kind() {
            ErrorKind::Connection => 2,
            ErrorKind::WriteVerify => 3,
            ErrorKind::Communication => 4,
            ErrorKind::Validation => 5,
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.global.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = cli.global.config();
    let outcome = match cli.command {
        Command::Program(opts) => handle_programming(opts, config),
        Command::Ports => {
            list_ports();
            Ok(())
        }
        Command::Firmware => {
            list_firmware(&config);
            Ok(())
        }
    };

    ExitCode::from(exit_code(&outcome))
}

#[cfg(test)]
mod tests {
    use linkbot_jig::JigError;

    use super::*;

    #[test]
    fn failures_exit_non_zero_by_kind() {
        assert_eq!(exit_code(&Ok(())), 0);
        assert_eq!(exit_code(&Err(JigError::Connection("busy".to_string()))), 2);
        assert_eq!(exit_code(&Err(JigError::Cancelled)), 3);
        assert_eq!(exit_code(&Err(JigError::Validation("no port".to_string()))), 5);
    }
}
