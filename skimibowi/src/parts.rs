//! Part names declared so far in a composition.

use std::collections::HashSet;

pub const MCU: &str = "U1";
pub const MCU_RESONATOR: &str = "MCU_RESONATOR";
pub const BATTERY: &str = "BATTERY";
pub const BATTERY_MANAGER: &str = "BATTERYMANAGER";
pub const CHARGE_LED: &str = "CHARGE_LED";
pub const REGULATOR: &str = "REGULATOR";
pub const FUSE: &str = "FUSE";
pub const POWER_SWITCH: &str = "POWER_SWITCH";
pub const CURRENT_MONITOR: &str = "CURRENT_MONITOR";
pub const SHUNT: &str = "SHUNT";
pub const RESET_BUTTON: &str = "SW1";
pub const FLASH_BUTTON: &str = "SW2";
pub const POWER_LED: &str = "POWER_LED";
pub const DS18B20: &str = "U2";
pub const DS18B20U: &str = "U3";
pub const ONEWIRE_CONN: &str = "ONEWIRE_CONN";
pub const USB_CONN: &str = "USB_CONN";
pub const USB_UART: &str = "USB_UART";
pub const AUTORESET_Q1: &str = "AUTORESET_Q1";
pub const AUTORESET_Q2: &str = "AUTORESET_Q2";
pub const FTDI_HEADER: &str = "FTDI_HEADER";
pub const ICSP_HEADER: &str = "ICSP_HEADER";
pub const LORA: &str = "LORA";
pub const BOARD: &str = "BOARD";

/// Ordered set of declared part names.
#[derive(Debug, Default, Clone)]
pub struct PartRegistry {
    order: Vec<String>,
    names: HashSet<String>,
}

impl PartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration. Returns `false` if the name was already taken.
    pub fn declare(&mut self, name: &str) -> bool {
        if !self.names.insert(name.to_string()) {
            return false;
        }
        self.order.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_once() {
        let mut parts = PartRegistry::new();
        assert!(parts.declare(MCU));
        assert!(parts.declare(BATTERY));
        assert!(!parts.declare(MCU));
        assert_eq!(parts.iter().collect::<Vec<_>>(), vec![MCU, BATTERY]);
        assert!(parts.contains(BATTERY));
        assert!(!parts.contains(FUSE));
    }
}
