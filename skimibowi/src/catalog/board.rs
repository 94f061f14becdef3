//! Board footprint fragment. Always the last one: it breaks out whatever
//! the earlier fragments created.

use super::{not_configured, FragmentWriter, PartSpec};
use crate::config::{BoardConfig, BoardFootprint};
use crate::core::SkimibowiError;
use crate::nets::{GND, RST, RX, SCL, SDA, TX, VBATT, VBUS};
use crate::parts::{BOARD, MCU};

pub fn board(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let footprint = config.board.ok_or_else(|| not_configured(w, "board footprint"))?;

    w.part(
        BOARD,
        PartSpec::new(footprint.library(), footprint.part(), footprint.footprint()),
    );
    w.tie(BOARD, "GND", GND);
    match footprint {
        BoardFootprint::Feather => {
            w.tie(BOARD, "3V3", config.rail());
            w.tie(BOARD, "RX", RX);
            w.tie(BOARD, "TX", TX);
            w.tie(BOARD, "SDA", SDA);
            w.tie(BOARD, "SCL", SCL);
            // Optional pins, only when the net exists on this board
            for (pin, net) in [("RST", RST), ("BAT", VBATT), ("USB", VBUS)] {
                if w.has_net(net) {
                    w.tie(BOARD, pin, net);
                }
            }
        }
        BoardFootprint::ArduinoNano => {
            w.tie(BOARD, "+5V", config.rail());
            w.tie(BOARD, "RX", RX);
            w.tie(BOARD, "TX", TX);
            w.tie(BOARD, "A4", SDA);
            w.tie(BOARD, "A5", SCL);
            if w.has_net(RST) {
                w.tie(BOARD, "RESET", RST);
            }
            for (header, pin) in config.profile().header_pins {
                let lhs = w.pin(BOARD, header);
                let rhs = w.pin(MCU, pin);
                w.connect(lhs, rhs);
            }
        }
    }
    Ok(())
}
