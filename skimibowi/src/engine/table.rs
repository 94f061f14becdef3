//! The built-in feature table.
//!
//! Entries are evaluated top to bottom; the position of an entry is the
//! only dependency-resolution mechanism there is. Every entry names the
//! parts/nets it needs from earlier entries (`requires`), the entries it
//! may reference when they happen to be present (`follows`), and the
//! parts/nets it introduces (`provides`).

use std::fmt;

use crate::catalog::{board, bus, interface, mcu, power, Builder};
use crate::config::BoardConfig;
use crate::nets::{DQ, DTR, RST, RTS, RX, SCL, SDA, TX, USB_DM, USB_DP};
use crate::parts::*;
use crate::power_path::{self, PowerPathFlags};

/// Part and net names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSet {
    pub parts: &'static [&'static str],
    pub nets: &'static [&'static str],
}

impl NameSet {
    pub const EMPTY: NameSet = NameSet { parts: &[], nets: &[] };

    pub const fn parts(parts: &'static [&'static str]) -> Self {
        NameSet { parts, nets: &[] }
    }

    pub const fn nets(nets: &'static [&'static str]) -> Self {
        NameSet { parts: &[], nets }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.nets.is_empty()
    }
}

/// One row of the feature table.
#[derive(Clone, Copy)]
pub struct FeatureEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub predicate: fn(&BoardConfig) -> bool,
    pub build: Builder,
    pub requires: NameSet,
    pub follows: &'static [&'static str],
    pub provides: NameSet,
}

impl fmt::Debug for FeatureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureEntry")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("follows", &self.follows)
            .field("provides", &self.provides)
            .finish_non_exhaustive()
    }
}

fn always(_: &BoardConfig) -> bool {
    true
}

fn has_power_path(config: &BoardConfig) -> bool {
    power_path::resolve(&PowerPathFlags::from_config(config)).is_some()
}

/// Composition order of the built-in fragments.
pub fn builtin() -> Vec<FeatureEntry> {
    vec![
        FeatureEntry {
            name: "microcontroller",
            title: "Microcontroller",
            predicate: always,
            build: mcu::microcontroller,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet {
                parts: &[MCU, MCU_RESONATOR],
                nets: &[TX, RX],
            },
        },
        FeatureEntry {
            name: "power_source",
            title: "Power source",
            predicate: |c| c.power_source.is_some(),
            build: power::power_source,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet::parts(&[BATTERY]),
        },
        FeatureEntry {
            name: "battery_manager",
            title: "Battery management",
            predicate: |c| c.battery_manager.is_some(),
            build: power::battery_manager,
            requires: NameSet::EMPTY,
            follows: &["power_source"],
            provides: NameSet::parts(&[BATTERY_MANAGER, CHARGE_LED]),
        },
        FeatureEntry {
            name: "regulator",
            title: "Regulator",
            predicate: |c| c.regulator.is_some(),
            build: power::regulator,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet::parts(&[REGULATOR]),
        },
        FeatureEntry {
            name: "fuse",
            title: "Fuse",
            predicate: |c| c.toggles.fuse,
            build: power::fuse,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet::parts(&[FUSE]),
        },
        FeatureEntry {
            name: "power_switch",
            title: "Power switch",
            predicate: |c| c.toggles.power_switch,
            build: power::power_switch,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet::parts(&[POWER_SWITCH]),
        },
        FeatureEntry {
            name: "i2c_bus",
            title: "I2C bus",
            predicate: BoardConfig::needs_i2c_bus,
            build: bus::i2c_bus,
            requires: NameSet::parts(&[MCU]),
            follows: &[],
            provides: NameSet::nets(&[SDA, SCL]),
        },
        FeatureEntry {
            name: "current_monitor",
            title: "Current monitor",
            predicate: |c| c.toggles.current_monitor,
            build: power::current_monitor,
            requires: NameSet::nets(&[SDA, SCL]),
            follows: &[],
            provides: NameSet::parts(&[CURRENT_MONITOR, SHUNT]),
        },
        FeatureEntry {
            name: "power_path",
            title: "Power path",
            predicate: has_power_path,
            build: power::power_path,
            requires: NameSet::EMPTY,
            follows: &["regulator", "current_monitor", "power_switch", "fuse", "power_source"],
            provides: NameSet::EMPTY,
        },
        FeatureEntry {
            name: "reset_line",
            title: "Reset line",
            predicate: |c| c.toggles.reset_line,
            build: interface::reset_line,
            requires: NameSet::parts(&[MCU]),
            follows: &[],
            provides: NameSet::nets(&[RST]),
        },
        FeatureEntry {
            name: "reset_button",
            title: "Reset button",
            predicate: |c| c.toggles.reset_button,
            build: interface::reset_button,
            requires: NameSet::nets(&[RST]),
            follows: &[],
            provides: NameSet::parts(&[RESET_BUTTON]),
        },
        FeatureEntry {
            name: "flash_button",
            title: "Flash button",
            predicate: |c| c.toggles.flash_button,
            build: interface::flash_button,
            requires: NameSet::parts(&[MCU]),
            follows: &[],
            provides: NameSet::parts(&[FLASH_BUTTON]),
        },
        FeatureEntry {
            name: "power_led",
            title: "Power LED",
            predicate: |c| c.toggles.power_led,
            build: power::power_led,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet::parts(&[POWER_LED]),
        },
        FeatureEntry {
            name: "onewire_bus",
            title: "1-Wire bus",
            predicate: BoardConfig::needs_onewire_bus,
            build: bus::onewire_bus,
            requires: NameSet::parts(&[MCU]),
            follows: &[],
            provides: NameSet::nets(&[DQ]),
        },
        FeatureEntry {
            name: "ds18b20",
            title: "DS18B20 temperature sensor",
            predicate: |c| c.toggles.ds18b20,
            build: bus::ds18b20,
            requires: NameSet::nets(&[DQ]),
            follows: &[],
            provides: NameSet::parts(&[DS18B20]),
        },
        FeatureEntry {
            name: "ds18b20u",
            title: "DS18B20U temperature sensor",
            predicate: |c| c.toggles.ds18b20u,
            build: bus::ds18b20u,
            requires: NameSet::nets(&[DQ]),
            follows: &[],
            provides: NameSet::parts(&[DS18B20U]),
        },
        FeatureEntry {
            name: "onewire_connector",
            title: "1-Wire connector",
            predicate: |c| c.toggles.onewire_connector,
            build: bus::onewire_connector,
            requires: NameSet::nets(&[DQ]),
            follows: &[],
            provides: NameSet::parts(&[ONEWIRE_CONN]),
        },
        FeatureEntry {
            name: "usb_connector",
            title: "USB connector",
            predicate: |c| c.usb_connector.is_some(),
            build: interface::usb_connector,
            requires: NameSet::EMPTY,
            follows: &[],
            provides: NameSet {
                parts: &[USB_CONN],
                nets: &[USB_DP, USB_DM],
            },
        },
        FeatureEntry {
            name: "usb_serial",
            title: "USB to UART bridge",
            predicate: |c| c.usb_serial.is_some(),
            build: interface::usb_serial,
            requires: NameSet {
                parts: &[],
                nets: &[USB_DP, USB_DM, TX, RX],
            },
            follows: &[],
            provides: NameSet {
                parts: &[USB_UART],
                nets: &[DTR, RTS],
            },
        },
        FeatureEntry {
            name: "auto_reset",
            title: "Auto reset",
            predicate: |c| c.usb_serial.is_some(),
            build: interface::auto_reset,
            requires: NameSet {
                parts: &[MCU],
                nets: &[DTR, RTS, RST],
            },
            follows: &[],
            provides: NameSet::parts(&[AUTORESET_Q1, AUTORESET_Q2]),
        },
        FeatureEntry {
            name: "ftdi_header",
            title: "FTDI header",
            predicate: |c| c.toggles.ftdi_header,
            build: interface::ftdi_header,
            requires: NameSet::nets(&[TX, RX]),
            follows: &[],
            provides: NameSet::parts(&[FTDI_HEADER]),
        },
        FeatureEntry {
            name: "icsp_header",
            title: "ICSP header",
            predicate: |c| c.toggles.icsp_header,
            build: interface::icsp_header,
            requires: NameSet::parts(&[MCU]),
            follows: &[],
            provides: NameSet::parts(&[ICSP_HEADER]),
        },
        FeatureEntry {
            name: "lora",
            title: "LoRa radio",
            predicate: |c| c.toggles.lora,
            build: interface::lora,
            requires: NameSet::parts(&[MCU]),
            follows: &[],
            provides: NameSet::parts(&[LORA]),
        },
        FeatureEntry {
            name: "board",
            title: "Board footprint",
            predicate: |c| c.board.is_some(),
            build: board::board,
            requires: NameSet {
                parts: &[MCU],
                nets: &[TX, RX, SDA, SCL],
            },
            follows: &["reset_line", "power_source", "usb_connector"],
            provides: NameSet::parts(&[BOARD]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique() {
        let table = builtin();
        let names: HashSet<_> = table.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), table.len());
    }

    #[test]
    fn test_microcontroller_first_board_last() {
        let table = builtin();
        assert_eq!(table.first().map(|e| e.name), Some("microcontroller"));
        assert_eq!(table.last().map(|e| e.name), Some("board"));
    }
}
