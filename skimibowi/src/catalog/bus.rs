//! Shared buses and the peripherals hanging off them.
//!
//! A bus fragment creates the bus nets and ties them to the
//! microcontroller; consumers only ever attach to the existing nets.

use super::{FragmentWriter, PartSpec};
use crate::config::BoardConfig;
use crate::core::SkimibowiError;
use crate::nets::{DQ, GND, SCL, SDA};
use crate::parts::{DS18B20, DS18B20U, MCU, ONEWIRE_CONN};

const BUS_PULL_UP: &str = "4k7";

pub fn i2c_bus(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    let pins = config.profile().i2c;
    w.tie(MCU, pins.sda, SDA);
    w.tie(MCU, pins.scl, SCL);
    for line in [SDA, SCL] {
        pull_up(config, w, line);
    }
    Ok(())
}

pub fn onewire_bus(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.tie(MCU, config.profile().onewire_pin, DQ);
    pull_up(config, w, DQ);
    Ok(())
}

pub fn ds18b20(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    temperature_sensor(config, w, DS18B20, "DS18B20", "Package_TO_SOT_THT:TO-92_Inline");
    Ok(())
}

pub fn ds18b20u(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    temperature_sensor(config, w, DS18B20U, "DS18B20U", "Package_SO:MSOP-8_3x3mm_P0.65mm");
    Ok(())
}

/// Three-pin header for off-board sensors: ground, data, supply.
pub fn onewire_connector(config: &BoardConfig, w: &mut FragmentWriter<'_>) -> Result<(), SkimibowiError> {
    w.part(
        ONEWIRE_CONN,
        PartSpec::new(
            "Connector",
            "Conn_01x03_Female",
            "Connector_PinHeader_2.54mm:PinHeader_1x03_P2.54mm_Vertical",
        ),
    );
    w.tie(ONEWIRE_CONN, "1", GND);
    w.tie(ONEWIRE_CONN, "2", DQ);
    w.tie(ONEWIRE_CONN, "3", config.rail());
    Ok(())
}

fn temperature_sensor(
    config: &BoardConfig,
    w: &mut FragmentWriter<'_>,
    name: &str,
    part: &str,
    footprint: &str,
) {
    w.part(name, PartSpec::new("Sensor_Temperature", part, footprint));
    w.tie(name, "VDD", config.rail());
    w.tie(name, "GND", GND);
    w.tie(name, "DQ", DQ);
}

fn pull_up(config: &BoardConfig, w: &mut FragmentWriter<'_>, line: &str) {
    let line = w.net(line);
    let resistor = w.resistor(BUS_PULL_UP);
    let rail = w.net(config.rail());
    w.chain([line, resistor, rail]);
}
