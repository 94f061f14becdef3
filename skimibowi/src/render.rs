//! Program renderer.
//!
//! Rendering is plain concatenation. Every structural decision (which
//! fragments, in which order, with which declarations) has already been
//! made by the composition engine.

use crate::config::PassiveFootprints;

pub const BANNER: &str = "# Generated by Skimibowi - SKiDL Microcontroller Board Wizard";

/// Statement that makes SKiDL write the netlist.
pub const POSTAMBLE: &str = "\ngenerate_netlist()\n";

/// Header of every generated program: banner, imports, passive helpers and
/// the net dictionary that fragments fill in.
pub fn preamble(passives: &PassiveFootprints) -> String {
    let mut out = String::new();

    out.push_str(BANNER);
    out.push('\n');
    out.push_str("\"\"\"Creates Kicad netlist file for a microcontroller board\"\"\"\n\n");
    out.push_str("from skidl import Net, NC, Part, generate_netlist\n\n\n");

    out.push_str("def R(value):\n");
    out.push_str("    \"\"\"Creates default resistor footprint\"\"\"\n");
    out.push_str(&format!(
        "    return Part('Device', 'R', value=value, footprint={})\n\n\n",
        py_str(&passives.resistor)
    ));

    out.push_str("def C(value):\n");
    out.push_str("    \"\"\"Creates default capacitor footprint\"\"\"\n");
    out.push_str(&format!(
        "    return Part('Device', 'C', value=value, footprint={})\n\n\n",
        py_str(&passives.capacitor)
    ));

    out.push_str("NETS = {}\n");
    out
}

/// Concatenate verbatim, in the given order.
pub fn render<'a, I>(preamble: &str, fragments: I, postamble: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::from(preamble);
    for text in fragments {
        out.push_str(text);
    }
    out.push_str(postamble);
    out
}

/// Single-quoted Python string literal. Control characters are escaped so
/// the literal always stays on one line.
pub fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_plain_concatenation() {
        let text = render("head\n", ["\na\n", "\nb\n"], POSTAMBLE);
        assert_eq!(text, "head\n\na\n\nb\n\ngenerate_netlist()\n");
    }

    #[test]
    fn test_render_keeps_duplicates() {
        let text = render("", ["x", "x"], "");
        assert_eq!(text, "xx");
    }

    #[test]
    fn test_py_str_escapes() {
        assert_eq!(py_str("RF_Module:ESP-12E"), "'RF_Module:ESP-12E'");
        assert_eq!(py_str("it's"), "'it\\'s'");
        assert_eq!(py_str("a\\b"), "'a\\\\b'");
    }

    #[test]
    fn test_py_str_escapes_control_characters() {
        assert_eq!(py_str("ESP\r12E"), "'ESP\\r12E'");
        assert_eq!(py_str("a\tb"), "'a\\tb'");
        assert_eq!(py_str("nul\0"), "'nul\\x00'");
        assert_eq!(py_str("\u{1b}[0m"), "'\\x1b[0m'");
        assert_eq!(py_str("\u{85}"), "'\\x85'");
        assert!(!py_str("x\ry\0z\u{7f}").chars().any(char::is_control));
    }

    #[test]
    fn test_preamble_binds_passive_footprints() {
        let passives = PassiveFootprints {
            resistor: "Resistor_SMD:R_0603_1608Metric".to_string(),
            capacitor: "Capacitor_SMD:C_0603_1608Metric".to_string(),
        };
        let text = preamble(&passives);
        assert!(text.starts_with(BANNER));
        assert!(text.contains("footprint='Resistor_SMD:R_0603_1608Metric'"));
        assert!(text.contains("footprint='Capacitor_SMD:C_0603_1608Metric'"));
        assert!(text.ends_with("NETS = {}\n"));
    }
}
