//! Fragment catalog.
//!
//! A fragment is one sub-circuit of the generated program. Builders are
//! plain functions of the validated configuration; they write through a
//! [`FragmentWriter`], which owns the statement syntax and keeps track of
//! every part and net the fragment declares or touches.

pub mod board;
pub mod bus;
pub mod interface;
pub mod mcu;
pub mod power;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::BoardConfig;
use crate::core::SkimibowiError;
use crate::nets::NetNamespace;
use crate::parts::PartRegistry;
use crate::render::py_str;

pub const LED_FOOTPRINT: &str = "LED_SMD:LED_1206_3216Metric";
pub const PUSH_BUTTON_FOOTPRINT: &str = "Button_Switch_SMD:SW_SPST_B3U-1000P";

/// Signature shared by every fragment builder.
pub type Builder = fn(&BoardConfig, &mut FragmentWriter<'_>) -> Result<(), SkimibowiError>;

/// A builder was invoked although the configuration lacks what it needs.
/// Only reachable through a custom table whose predicate is too loose.
pub(crate) fn not_configured(w: &FragmentWriter<'_>, what: &str) -> SkimibowiError {
    SkimibowiError::InternalConsistency {
        fragment: w.feature().to_string(),
        detail: format!("{what} is not configured"),
    }
}

/// Output of one fragment builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub feature: &'static str,
    pub text: String,
    pub declared_parts: Vec<String>,
    pub declared_nets: Vec<String>,
    pub referenced_nets: BTreeSet<String>,
    pub referenced_parts: BTreeSet<String>,
}

/// Library symbol and footprint of a part declaration.
#[derive(Debug, Clone, Copy)]
pub struct PartSpec<'a> {
    pub library: &'a str,
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub footprint: &'a str,
}

impl<'a> PartSpec<'a> {
    pub fn new(library: &'a str, name: &'a str, footprint: &'a str) -> Self {
        Self {
            library,
            name,
            value: None,
            footprint,
        }
    }

    pub fn with_value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }
}

/// Statement builder for a single fragment.
pub struct FragmentWriter<'a> {
    feature: &'static str,
    nets: &'a mut NetNamespace,
    parts: &'a PartRegistry,
    lines: Vec<String>,
    declared_parts: Vec<String>,
    declared_nets: Vec<String>,
    referenced_nets: BTreeSet<String>,
    referenced_parts: BTreeSet<String>,
    undeclared: BTreeSet<String>,
    duplicates: Vec<String>,
}

impl<'a> FragmentWriter<'a> {
    pub fn new(feature: &'static str, nets: &'a mut NetNamespace, parts: &'a PartRegistry) -> Self {
        Self {
            feature,
            nets,
            parts,
            lines: Vec::new(),
            declared_parts: Vec::new(),
            declared_nets: Vec::new(),
            referenced_nets: BTreeSet::new(),
            referenced_parts: BTreeSet::new(),
            undeclared: BTreeSet::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn feature(&self) -> &'static str {
        self.feature
    }

    /// Read-only view of the namespace, for fragments that attach to nets
    /// only when an earlier fragment created them.
    pub fn has_net(&self, name: &str) -> bool {
        self.nets.is_declared(name)
    }

    pub fn comment(&mut self, text: &str) {
        self.lines.push(format!("# {text}"));
    }

    /// `NAME = Part('library', 'name', value='...', footprint='...')`
    pub fn part(&mut self, name: &str, spec: PartSpec<'_>) {
        if self.is_declared(name) {
            self.duplicates.push(name.to_string());
        }
        let mut args = vec![py_str(spec.library), py_str(spec.name)];
        if let Some(value) = spec.value {
            args.push(format!("value={}", py_str(value)));
        }
        args.push(format!("footprint={}", py_str(spec.footprint)));
        self.lines.push(format!("{name} = Part({})", args.join(", ")));
        self.declared_parts.push(name.to_string());
    }

    /// Expression for a net, declaring it first if nobody has yet.
    pub fn net(&mut self, name: &str) -> String {
        if self.nets.resolve(name).is_new() {
            self.lines.push(format!("NETS[{q}] = Net({q})", q = py_str(name)));
            self.declared_nets.push(name.to_string());
        }
        self.referenced_nets.insert(name.to_string());
        format!("NETS[{}]", py_str(name))
    }

    /// Expression for a part pin. Numeric pins are indexed by number.
    pub fn pin(&mut self, part: &str, pin: &str) -> String {
        self.reference(part);
        if !pin.is_empty() && pin.chars().all(|c| c.is_ascii_digit()) {
            format!("{part}[{pin}]")
        } else {
            format!("{part}[{}]", py_str(pin))
        }
    }

    /// Expression for a whole two-terminal part inside a series chain.
    pub fn part_ref(&mut self, part: &str) -> String {
        self.reference(part);
        part.to_string()
    }

    pub fn resistor(&self, value: &str) -> String {
        format!("R({})", py_str(value))
    }

    pub fn capacitor(&self, value: &str) -> String {
        format!("C({})", py_str(value))
    }

    /// Explicit no-connect.
    pub fn nc(&self) -> String {
        "NC".to_string()
    }

    /// `lhs += rhs`
    pub fn connect(&mut self, lhs: String, rhs: String) {
        self.lines.push(format!("{lhs} += {rhs}"));
    }

    /// `PART['pin'] += NETS['net']`
    pub fn tie(&mut self, part: &str, pin: &str, net: &str) {
        let lhs = self.pin(part, pin);
        let rhs = self.net(net);
        self.connect(lhs, rhs);
    }

    /// `a & b & c`
    pub fn chain<I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = String>,
    {
        let elements: Vec<String> = elements.into_iter().collect();
        self.lines.push(elements.join(" & "));
    }

    /// Close the fragment. Fails if it referenced a part nobody declared or
    /// declared a name that was already taken.
    pub fn finish(self) -> Result<Fragment, SkimibowiError> {
        if let Some(name) = self.duplicates.first() {
            return Err(SkimibowiError::InternalConsistency {
                fragment: self.feature.to_string(),
                detail: format!("part {name} is declared more than once"),
            });
        }
        if !self.undeclared.is_empty() {
            return Err(SkimibowiError::InternalConsistency {
                fragment: self.feature.to_string(),
                detail: format!(
                    "references undeclared part(s): {}",
                    self.undeclared.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        let mut text = String::from("\n");
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }

        Ok(Fragment {
            feature: self.feature,
            text,
            declared_parts: self.declared_parts,
            declared_nets: self.declared_nets,
            referenced_nets: self.referenced_nets,
            referenced_parts: self.referenced_parts,
        })
    }

    fn is_declared(&self, part: &str) -> bool {
        self.parts.contains(part) || self.declared_parts.iter().any(|p| p == part)
    }

    fn reference(&mut self, part: &str) {
        if !self.is_declared(part) {
            self.undeclared.insert(part.to_string());
        }
        self.referenced_parts.insert(part.to_string());
    }
}
