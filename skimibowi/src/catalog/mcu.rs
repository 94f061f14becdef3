//! Microcontroller fragment.

use super::{FragmentWriter, PartSpec};
use crate::config::BoardConfig;
use crate::core::SkimibowiError;
use crate::nets::{GND, RX, TX};
use crate::parts::{MCU, MCU_RESONATOR};

const RESONATOR_FOOTPRINT: &str = "Crystal:Resonator_SMD_muRata_CSTxExxV-3Pin_3.0x1.1mm";

/// `U1` with its supply, strap and serial connections.
pub fn microcontroller(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let profile = config.profile();
    let rail = config.rail();

    w.part(MCU, PartSpec::new(profile.library, profile.part, &config.mcu_footprint));

    for pin in profile.supply_pins {
        w.tie(MCU, pin, rail);
    }
    for pin in profile.ground_pins {
        w.tie(MCU, pin, GND);
    }

    if let Some(enable) = profile.enable_pin {
        let pin = w.pin(MCU, enable);
        let pull_up = w.resistor("10k");
        let net = w.net(rail);
        w.chain([pin, pull_up, net]);
    }
    if let Some(strap) = profile.strap_low_pin {
        let pin = w.pin(MCU, strap);
        let pull_down = w.resistor("4k7");
        let net = w.net(GND);
        w.chain([pin, pull_down, net]);
    }

    if profile.resonator {
        w.part(MCU_RESONATOR, PartSpec::new("Device", "Resonator", RESONATOR_FOOTPRINT));
        let xtal1 = w.pin(MCU, "XTAL1");
        let res1 = w.pin(MCU_RESONATOR, "1");
        w.connect(xtal1, res1);
        let xtal2 = w.pin(MCU, "XTAL2");
        let res3 = w.pin(MCU_RESONATOR, "3");
        w.connect(xtal2, res3);
        w.tie(MCU_RESONATOR, "2", GND);

        let xtal1 = w.pin(MCU, "XTAL1");
        let feedback = w.resistor("1M");
        let xtal2 = w.pin(MCU, "XTAL2");
        w.chain([xtal1, feedback, xtal2]);
    }

    w.tie(MCU, profile.uart.tx, TX);
    w.tie(MCU, profile.uart.rx, RX);
    Ok(())
}
