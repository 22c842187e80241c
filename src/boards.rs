use clap::ValueEnum;

/// Boards the jig knows how to program
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoardKind {
    /// Robot main-board (ATmega128RFA1): application image, then bootloader.
    /// A fresh serial id is burned into EEPROM.
    #[value(name = "main", alias = "main-board")]
    MainBoard,

    /// USB radio dongle (ATmega16U4): application image only
    Dongle,
}

/// Programming parameters for a given board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProfile {
    /// Part id understood by the programmer tool
    pub part: &'static str,
    pub baud: u32,
    /// Write the fixed bootloader after the application image
    pub writes_bootloader: bool,
    /// Generate and burn a serial id
    pub assigns_serial_id: bool,
    /// Honour the operator's verify toggle; when false verification is off
    pub allows_verify: bool,
}

impl BoardKind {
    pub fn profile(self) -> BoardProfile {
        match self {
            BoardKind::MainBoard => BoardProfile {
                part: "m128rfa1",
                baud: 115200,
                writes_bootloader: true,
                assigns_serial_id: true,
                allows_verify: true,
            },
            BoardKind::Dongle => BoardProfile {
                part: "m16u4",
                baud: 115200,
                writes_bootloader: false,
                assigns_serial_id: false,
                allows_verify: false,
            },
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            BoardKind::MainBoard => "Linkbot Jig Main-Board Programmer",
            BoardKind::Dongle => "Linkbot Jig USB-Board Programmer",
        }
    }
}
