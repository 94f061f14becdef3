//! Built-in microcontroller pin tables
//!
//! Fragments never hard-code a module's pin names; they look them up here so
//! one template serves every supported family.

use serde::Serialize;

use crate::config::Microcontroller;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum McuFamily {
    Esp8266,
    Esp32,
    Avr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UartPins {
    pub tx: &'static str,
    pub rx: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct I2cPins {
    pub sda: &'static str,
    pub scl: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpiPins {
    pub sck: &'static str,
    pub miso: &'static str,
    pub mosi: &'static str,
    pub cs: &'static str,
    /// Interrupt input for peripherals that signal completion (radio DIO0).
    pub irq: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IcspPins {
    pub miso: &'static str,
    pub sck: &'static str,
    pub mosi: &'static str,
    pub reset: &'static str,
}

/// Static description of one microcontroller part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct McuProfile {
    pub family: McuFamily,
    pub library: &'static str,
    pub part: &'static str,
    pub default_footprint: &'static str,
    pub supply_pins: &'static [&'static str],
    pub ground_pins: &'static [&'static str],
    /// Chip enable, tied to the supply rail through a pull-up.
    pub enable_pin: Option<&'static str>,
    /// Boot strap that must be held low for a normal boot.
    pub strap_low_pin: Option<&'static str>,
    /// Pins joined onto the `RST` net by the reset line.
    pub reset_pins: &'static [&'static str],
    /// Whether the reset net needs its own pull-up.
    pub reset_pull_up: bool,
    /// Pin pulled low to enter the serial bootloader.
    pub boot_pin: Option<&'static str>,
    pub uart: UartPins,
    pub i2c: I2cPins,
    pub onewire_pin: &'static str,
    pub spi: Option<SpiPins>,
    pub icsp: Option<IcspPins>,
    /// Needs an external ceramic resonator on XTAL1/XTAL2.
    pub resonator: bool,
    /// Board header name -> microcontroller pin, for footprints that break
    /// the GPIOs out one by one.
    pub header_pins: &'static [(&'static str, &'static str)],
}

const ESP8266_UART: UartPins = UartPins { tx: "TX", rx: "RX" };
const ESP8266_I2C: I2cPins = I2cPins { sda: "GPIO4", scl: "GPIO5" };
const ESP8266_SPI: SpiPins = SpiPins {
    sck: "GPIO14",
    miso: "GPIO12",
    mosi: "GPIO13",
    cs: "GPIO15",
    irq: None,
};

pub const ESP_12E: McuProfile = McuProfile {
    family: McuFamily::Esp8266,
    library: "RF_Module",
    part: "ESP-12E",
    default_footprint: "RF_Module:ESP-12E",
    supply_pins: &["VCC"],
    ground_pins: &["GND"],
    enable_pin: Some("EN"),
    strap_low_pin: Some("GPIO15"),
    reset_pins: &["RST", "GPIO16"],
    reset_pull_up: false,
    boot_pin: Some("GPIO0"),
    uart: ESP8266_UART,
    i2c: ESP8266_I2C,
    onewire_pin: "GPIO2",
    spi: Some(ESP8266_SPI),
    icsp: None,
    resonator: false,
    header_pins: &[],
};

pub const ESP_07: McuProfile = McuProfile {
    part: "ESP-07",
    default_footprint: "RF_Module:ESP-07",
    ..ESP_12E
};

pub const ESP32_WROOM_32: McuProfile = McuProfile {
    family: McuFamily::Esp32,
    library: "RF_Module",
    part: "ESP32-WROOM-32",
    default_footprint: "RF_Module:ESP32-WROOM-32",
    supply_pins: &["VDD"],
    ground_pins: &["GND"],
    enable_pin: Some("EN"),
    strap_low_pin: None,
    reset_pins: &["EN"],
    reset_pull_up: false,
    boot_pin: Some("IO0"),
    uart: UartPins { tx: "TXD0", rx: "RXD0" },
    i2c: I2cPins { sda: "IO21", scl: "IO22" },
    onewire_pin: "IO4",
    spi: Some(SpiPins {
        sck: "IO18",
        miso: "IO19",
        mosi: "IO23",
        cs: "IO5",
        irq: Some("IO26"),
    }),
    icsp: None,
    resonator: false,
    header_pins: &[],
};

pub const ATMEGA328P_AU: McuProfile = McuProfile {
    family: McuFamily::Avr,
    library: "MCU_Microchip_ATmega",
    part: "ATmega328P-AU",
    default_footprint: "Package_QFP:TQFP-32_7x7mm_P0.8mm",
    supply_pins: &["VCC", "AVCC"],
    ground_pins: &["GND"],
    enable_pin: None,
    strap_low_pin: None,
    reset_pins: &["RESET"],
    reset_pull_up: true,
    boot_pin: None,
    uart: UartPins { tx: "PD1", rx: "PD0" },
    i2c: I2cPins { sda: "PC4", scl: "PC5" },
    onewire_pin: "PD4",
    spi: Some(SpiPins {
        sck: "PB5",
        miso: "PB4",
        mosi: "PB3",
        cs: "PB2",
        irq: Some("PD2"),
    }),
    icsp: Some(IcspPins {
        miso: "PB4",
        sck: "PB5",
        mosi: "PB3",
        reset: "RESET",
    }),
    resonator: true,
    header_pins: &[
        ("D2", "PD2"),
        ("D3", "PD3"),
        ("D4", "PD4"),
        ("D5", "PD5"),
        ("D6", "PD6"),
        ("D7", "PD7"),
        ("D8", "PB0"),
        ("D9", "PB1"),
        ("D10", "PB2"),
        ("D11", "PB3"),
        ("D12", "PB4"),
        ("D13", "PB5"),
        ("A0", "PC0"),
        ("A1", "PC1"),
        ("A2", "PC2"),
        ("A3", "PC3"),
        ("AREF", "AREF"),
    ],
};

impl Microcontroller {
    pub fn profile(&self) -> &'static McuProfile {
        match self {
            Microcontroller::Esp12e => &ESP_12E,
            Microcontroller::Esp07 => &ESP_07,
            Microcontroller::Esp32Wroom32 => &ESP32_WROOM_32,
            Microcontroller::Atmega328pAu => &ATMEGA328P_AU,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mcu_has_profile() {
        for mcu in Microcontroller::ALL {
            let profile = mcu.profile();
            assert_eq!(profile.part, mcu.as_str());
            assert!(!profile.supply_pins.is_empty());
            assert!(!profile.reset_pins.is_empty());
        }
    }

    #[test]
    fn test_icsp_only_on_avr() {
        for mcu in Microcontroller::ALL {
            let profile = mcu.profile();
            assert_eq!(profile.icsp.is_some(), profile.family == McuFamily::Avr);
        }
    }

    #[test]
    fn test_esp07_shares_esp12e_pins() {
        assert_eq!(ESP_07.uart, ESP_12E.uart);
        assert_eq!(ESP_07.reset_pins, ESP_12E.reset_pins);
        assert_ne!(ESP_07.default_footprint, ESP_12E.default_footprint);
    }
}
