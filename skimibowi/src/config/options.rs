//! Enumerated option values recognised in a board configuration.
//!
//! Every enum maps one-to-one onto the strings the wizard front-end offers,
//! and parsing an unknown string yields a [`ConfigError::InvalidValue`]
//! naming the configuration key it came from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::nets;

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal,
        { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// All recognised values, in the order the wizard lists them.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Configuration key this option is read from.
            pub const FIELD: &'static str = $field;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ConfigError::InvalidValue {
                        field: Self::FIELD.to_string(),
                        value: other.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

option_enum! {
    /// Microcontroller module or chip placed as `U1`.
    Microcontroller, field = "mcu", {
        Esp12e => "ESP-12E",
        Esp07 => "ESP-07",
        Esp32Wroom32 => "ESP32-WROOM-32",
        Atmega328pAu => "ATmega328P-AU",
    }
}

option_enum! {
    /// Rail feeding the microcontroller supply pins.
    SupplyRail, field = "mcurail", {
        VBatt => "+VBatt",
        V3V3 => "+3V3",
        V5 => "+5V",
        V3 => "+3V",
    }
}

impl SupplyRail {
    pub fn net_name(&self) -> &'static str {
        match self {
            SupplyRail::VBatt => nets::VBATT,
            SupplyRail::V3V3 => nets::V3V3,
            SupplyRail::V5 => nets::V5,
            SupplyRail::V3 => nets::V3,
        }
    }
}

option_enum! {
    /// Kind of battery or battery connector.
    PowerSourceKind, field = "powersource", {
        Battery => "Battery",
        CoinCell => "Coin cell",
        JstConnector => "JST PH connector",
    }
}

impl PowerSourceKind {
    pub fn library(&self) -> &'static str {
        match self {
            PowerSourceKind::Battery | PowerSourceKind::CoinCell => "Device",
            PowerSourceKind::JstConnector => "Connector",
        }
    }

    pub fn part(&self) -> &'static str {
        match self {
            PowerSourceKind::Battery => "Battery",
            PowerSourceKind::CoinCell => "Battery_Cell",
            PowerSourceKind::JstConnector => "Conn_01x02_Female",
        }
    }

    pub fn default_footprint(&self) -> &'static str {
        match self {
            PowerSourceKind::Battery => "Battery:BatteryHolder_Keystone_2460_1xAA",
            PowerSourceKind::CoinCell => "Battery:BatteryHolder_Keystone_3034_1x20mm",
            PowerSourceKind::JstConnector => {
                "Connector_JST:JST_PH_S2B-PH-K_1x02_P2.00mm_Horizontal"
            }
        }
    }

    /// Positive and negative terminal pins.
    pub fn terminals(&self) -> (&'static str, &'static str) {
        match self {
            PowerSourceKind::Battery | PowerSourceKind::CoinCell => ("+", "-"),
            PowerSourceKind::JstConnector => ("1", "2"),
        }
    }
}

option_enum! {
    /// Battery charge management IC.
    BatteryManager, field = "battery_manager", {
        Mcp73831 => "MCP73831",
    }
}

impl BatteryManager {
    pub fn library(&self) -> &'static str {
        "Battery_Management"
    }

    pub fn part(&self) -> &'static str {
        match self {
            BatteryManager::Mcp73831 => "MCP73831-2-OT",
        }
    }

    pub fn footprint(&self) -> &'static str {
        match self {
            BatteryManager::Mcp73831 => "Package_TO_SOT_SMD:SOT-23-5",
        }
    }
}

option_enum! {
    /// USB receptacle.
    UsbConnectorKind, field = "usb_connector", {
        MicroB => "USB Micro-B",
        MiniB => "USB Mini-B",
    }
}

impl UsbConnectorKind {
    pub fn default_part(&self) -> &'static str {
        match self {
            UsbConnectorKind::MicroB => "USB_B_Micro",
            UsbConnectorKind::MiniB => "USB_B_Mini",
        }
    }

    pub fn default_footprint(&self) -> &'static str {
        match self {
            UsbConnectorKind::MicroB => {
                "Connector_USB:USB_Micro-B_Amphenol_10103594-0001LF_Horizontal"
            }
            UsbConnectorKind::MiniB => "Connector_USB:USB_Mini-B_Lumberg_2486_01_Horizontal",
        }
    }
}

option_enum! {
    /// USB to UART bridge chip.
    UsbSerialBridge, field = "usb_serial", {
        Ft231xs => "FT231XS",
        Cp2104 => "CP2104",
    }
}

impl UsbSerialBridge {
    pub fn part(&self) -> &'static str {
        self.as_str()
    }

    pub fn footprint(&self) -> &'static str {
        match self {
            UsbSerialBridge::Ft231xs => "Package_SO:SSOP-20_3.9x8.7mm_P0.635mm",
            UsbSerialBridge::Cp2104 => "Package_DFN_QFN:QFN-24-1EP_4x4mm_P0.5mm_EP2.6x2.6mm",
        }
    }
}

option_enum! {
    /// Mechanical board outline the circuit is laid out on.
    BoardFootprint, field = "board", {
        Feather => "Adafruit Feather",
        ArduinoNano => "Arduino Nano",
    }
}

impl BoardFootprint {
    pub fn library(&self) -> &'static str {
        match self {
            BoardFootprint::Feather => "./library/feather.lib",
            BoardFootprint::ArduinoNano => "MCU_Module",
        }
    }

    pub fn part(&self) -> &'static str {
        match self {
            BoardFootprint::Feather => "Adafruit_Feather",
            BoardFootprint::ArduinoNano => "Arduino_Nano_v3.x",
        }
    }

    pub fn footprint(&self) -> &'static str {
        match self {
            BoardFootprint::Feather => "Skimibowi:Adafruit_Feather",
            BoardFootprint::ArduinoNano => "Module:Arduino_Nano",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("ESP-12E".parse::<Microcontroller>().unwrap(), Microcontroller::Esp12e);
        assert_eq!("+3V3".parse::<SupplyRail>().unwrap(), SupplyRail::V3V3);
        assert_eq!(
            "Adafruit Feather".parse::<BoardFootprint>().unwrap(),
            BoardFootprint::Feather
        );
    }

    #[test]
    fn test_unknown_value_names_field() {
        let err = "ESP-01".parse::<Microcontroller>().unwrap_err();
        match err {
            ConfigError::InvalidValue { field, value, expected } => {
                assert_eq!(field, Microcontroller::FIELD);
                assert_eq!(value, "ESP-01");
                assert!(expected.contains("ESP-12E"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_matches_wizard_text() {
        for rail in SupplyRail::ALL {
            assert_eq!(rail.to_string().parse::<SupplyRail>().unwrap(), *rail);
            assert_eq!(rail.as_str(), rail.net_name());
        }
    }
}
