//! Net namespace for a single composition.
//!
//! Every fragment receives the same [`NetNamespace`] instance. The first
//! fragment that names a net declares it; every later fragment gets the
//! existing handle back and emits no declaration.

use std::collections::HashMap;

use serde::Serialize;

pub const GND: &str = "GND";
pub const VBATT: &str = "+VBatt";
pub const VBUS: &str = "+VBus";
pub const V3V3: &str = "+3V3";
pub const V5: &str = "+5V";
pub const V3: &str = "+3V";

/// Ground, battery, bus and the regulated rails. These are never owned by a
/// single fragment; whoever touches one first declares it.
pub const RESERVED_NETS: [&str; 6] = [GND, VBATT, VBUS, V3V3, V5, V3];

pub const TX: &str = "tx";
pub const RX: &str = "rx";
pub const RST: &str = "RST";
pub const SDA: &str = "SDA";
pub const SCL: &str = "SCL";
pub const DQ: &str = "DQ";
pub const USB_DP: &str = "USBD+";
pub const USB_DM: &str = "USBD-";
pub const DTR: &str = "DTR";
pub const RTS: &str = "RTS";

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NETS.contains(&name)
}

/// Stable identifier of a declared net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NetHandle(usize);

impl NetHandle {
    /// Declaration order, starting at zero.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Outcome of [`NetNamespace::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// First reference: the caller must emit a declaration statement.
    Declared(NetHandle),
    /// Already declared earlier in this composition.
    Existing(NetHandle),
}

impl Resolution {
    pub fn handle(&self) -> NetHandle {
        match self {
            Resolution::Declared(handle) | Resolution::Existing(handle) => *handle,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Resolution::Declared(_))
    }
}

/// Registry of the nets declared so far.
#[derive(Debug, Default)]
pub struct NetNamespace {
    index: HashMap<String, NetHandle>,
    names: Vec<String>,
}

impl NetNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-declare. Names are compared byte for byte, so `rx` and `RX`
    /// are distinct nets.
    pub fn resolve(&mut self, name: &str) -> Resolution {
        if let Some(&handle) = self.index.get(name) {
            return Resolution::Existing(handle);
        }
        let handle = NetHandle(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), handle);
        Resolution::Declared(handle)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn handle(&self, name: &str) -> Option<NetHandle> {
        self.index.get(name).copied()
    }

    /// Declared names in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_resolve_declares() {
        let mut nets = NetNamespace::new();
        let first = nets.resolve(GND);
        assert!(first.is_new());
        let second = nets.resolve(GND);
        assert!(!second.is_new());
        assert_eq!(first.handle(), second.handle());
        assert_eq!(nets.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut nets = NetNamespace::new();
        let lower = nets.resolve("rx").handle();
        let upper = nets.resolve("RX").handle();
        assert_ne!(lower, upper);
        assert_eq!(nets.handle("rx"), Some(lower));
        assert_eq!(nets.handle("RX"), Some(upper));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut nets = NetNamespace::new();
        for name in [VBATT, GND, RST, GND, VBATT] {
            nets.resolve(name);
        }
        assert_eq!(nets.declared().collect::<Vec<_>>(), vec![VBATT, GND, RST]);
        assert_eq!(nets.handle(RST).map(|h| h.index()), Some(2));
        assert!(!nets.is_declared(DQ));
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved(GND));
        assert!(is_reserved(VBUS));
        assert!(!is_reserved(SDA));
    }
}
