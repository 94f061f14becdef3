//! Power-path resolver.
//!
//! The power path is the series chain between the regulator input and
//! whatever feeds it. Elements are always linked in [`PRECEDENCE`] order;
//! absent elements are skipped and their neighbours joined directly.

use serde::Serialize;

use crate::config::BoardConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PowerPathElement {
    RegulatorInput,
    CurrentShunt,
    PowerSwitch,
    Fuse,
    Battery,
    BusRail,
}

pub const PRECEDENCE: [PowerPathElement; 6] = [
    PowerPathElement::RegulatorInput,
    PowerPathElement::CurrentShunt,
    PowerPathElement::PowerSwitch,
    PowerPathElement::Fuse,
    PowerPathElement::Battery,
    PowerPathElement::BusRail,
];

/// Which power-path elements a configuration engages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerPathFlags {
    pub regulator: bool,
    pub current_shunt: bool,
    pub power_switch: bool,
    pub fuse: bool,
    pub battery: bool,
    pub bus_rail: bool,
}

impl PowerPathFlags {
    /// The USB rail only joins the chain on boards without a battery, so the
    /// chain never ties the battery straight onto VBUS.
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            regulator: config.regulator.is_some(),
            current_shunt: config.toggles.current_monitor,
            power_switch: config.toggles.power_switch,
            fuse: config.toggles.fuse,
            battery: config.has_battery(),
            bus_rail: config.usb_connector.is_some() && !config.has_battery(),
        }
    }

    pub fn engages(&self, element: PowerPathElement) -> bool {
        match element {
            PowerPathElement::RegulatorInput => self.regulator,
            PowerPathElement::CurrentShunt => self.current_shunt,
            PowerPathElement::PowerSwitch => self.power_switch,
            PowerPathElement::Fuse => self.fuse,
            PowerPathElement::Battery => self.battery,
            PowerPathElement::BusRail => self.bus_rail,
        }
    }
}

/// A resolved chain of at least two elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerChain {
    elements: Vec<PowerPathElement>,
}

impl PowerChain {
    pub fn elements(&self) -> &[PowerPathElement] {
        &self.elements
    }

    /// Adjacent pairs that end up connected.
    pub fn links(&self) -> impl Iterator<Item = (PowerPathElement, PowerPathElement)> + '_ {
        self.elements.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Filter the precedence list down to the engaged elements. A single
/// element has nothing to connect to, so fewer than two yields `None`.
pub fn resolve(flags: &PowerPathFlags) -> Option<PowerChain> {
    let elements: Vec<PowerPathElement> = PRECEDENCE
        .iter()
        .copied()
        .filter(|element| flags.engages(*element))
        .collect();

    if elements.len() < 2 {
        return None;
    }
    Some(PowerChain { elements })
}
