//! Referential integrity of generated programs.
//!
//! Scans the program text line by line: every net and part must be declared
//! before it is referenced, declared exactly once, and every declared net
//! must actually be used.

use regex::Regex;
use skimibowi::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

const VALID_FIXTURES: &[&str] = &[
    "minimal_esp12e.json",
    "feather_esp12e.json",
    "arduino_nano.json",
    "maximal_esp12e.json",
    "maximal_atmega.json",
];

struct Scan {
    net_declarations: HashMap<String, usize>,
    net_references: HashMap<String, usize>,
    part_declarations: HashMap<String, usize>,
}

fn check_program(program: &str) -> Result<Scan, String> {
    let net_decl = Regex::new(r"^NETS\['([^']+)'\] = Net\('([^']+)'\)$").unwrap();
    let net_ref = Regex::new(r"NETS\['([^']+)'\]").unwrap();
    let part_decl = Regex::new(r"^([A-Z][A-Z0-9_]*) = Part\(").unwrap();
    let pin_ref = Regex::new(r"\b([A-Z][A-Z0-9_]*)\[").unwrap();
    let bare_ref = Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap();

    let mut scan = Scan {
        net_declarations: HashMap::new(),
        net_references: HashMap::new(),
        part_declarations: HashMap::new(),
    };
    let mut parts: HashSet<String> = HashSet::new();

    let body = program
        .split_once("NETS = {}\n")
        .map(|(_, body)| body)
        .ok_or("missing net dictionary")?;

    for line in body.lines() {
        if let Some(caps) = net_decl.captures(line) {
            let name = caps[1].to_string();
            if caps[1] != caps[2] {
                return Err(format!("net key and name differ: {line}"));
            }
            if scan.net_declarations.insert(name.clone(), 1).is_some() {
                return Err(format!("net {name} declared twice"));
            }
            continue;
        }

        if let Some(caps) = part_decl.captures(line) {
            let name = caps[1].to_string();
            if !parts.insert(name.clone()) {
                return Err(format!("part {name} declared twice"));
            }
            scan.part_declarations.insert(name, 1);
            continue;
        }

        for caps in net_ref.captures_iter(line) {
            let name = &caps[1];
            if !scan.net_declarations.contains_key(name) {
                return Err(format!("net {name} referenced before declaration: {line}"));
            }
            *scan.net_references.entry(name.to_string()).or_default() += 1;
        }

        let mut referenced: Vec<String> = pin_ref
            .captures_iter(line)
            .map(|caps| caps[1].to_string())
            .filter(|name| name != "NETS")
            .collect();
        for element in line.split(" & ") {
            let element = element.trim();
            if bare_ref.is_match(element) && element != "NC" {
                referenced.push(element.to_string());
            }
        }
        for name in referenced {
            if !parts.contains(&name) {
                return Err(format!("part {name} referenced before declaration: {line}"));
            }
        }
    }

    for name in scan.net_declarations.keys() {
        if !scan.net_references.contains_key(name) {
            return Err(format!("net {name} is declared but never used"));
        }
    }

    Ok(scan)
}

fn program(name: &str) -> String {
    let json = std::fs::read_to_string(fixture_path(name)).unwrap();
    SkimibowiCore::generate_json(&json, GenerationOptions::default())
        .unwrap_or_else(|e| panic!("{} should generate: {}", name, e))
        .program
}

#[test]
fn test_fixtures_are_referentially_sound() {
    for name in VALID_FIXTURES {
        let program = program(name);
        if let Err(problem) = check_program(&program) {
            panic!("{}: {}\n{}", name, problem, program);
        }
    }
}

#[test]
fn test_section_comments_keep_integrity() {
    let json = std::fs::read_to_string(fixture_path("maximal_esp12e.json")).unwrap();
    let result = SkimibowiCore::generate_json(
        &json,
        GenerationOptions {
            section_comments: true,
        },
    )
    .unwrap();
    assert!(result.program.contains("\n# Power path\n"));
    check_program(&result.program).unwrap();
}

#[test]
fn test_reported_names_match_program() {
    let json = std::fs::read_to_string(fixture_path("maximal_atmega.json")).unwrap();
    let result = SkimibowiCore::generate_json(&json, GenerationOptions::default()).unwrap();
    let scan = check_program(&result.program).unwrap();

    let mut declared_parts: Vec<_> = scan.part_declarations.keys().cloned().collect();
    declared_parts.sort();
    let mut reported_parts = result.parts.clone();
    reported_parts.sort();
    assert_eq!(declared_parts, reported_parts);

    let mut declared_nets: Vec<_> = scan.net_declarations.keys().cloned().collect();
    declared_nets.sort();
    let mut reported_nets = result.nets.clone();
    reported_nets.sort();
    assert_eq!(declared_nets, reported_nets);
}

#[test]
fn test_checker_catches_reference_before_declaration() {
    let program = "NETS = {}\nU1['VCC'] += NETS['+3V3']\n";
    assert!(check_program(program).is_err());
}

#[test]
fn test_every_single_toggle_is_sound() {
    let toggles = [
        "reset", "reset_button", "flash_button", "power_led", "ds18b20", "ds18b20u",
        "onewire_connector", "current_monitor", "ftdi_header", "fuse", "power_switch", "lora",
    ];
    for mcu in ["ESP-12E", "ESP-07", "ESP32-WROOM-32"] {
        for toggle in toggles {
            let json = format!(r#"{{"mcu": "{mcu}", "mcurail": "+3V3", "{toggle}": true}}"#);
            let result = SkimibowiCore::generate_json(&json, GenerationOptions::default())
                .unwrap_or_else(|e| panic!("{} + {}: {}", mcu, toggle, e));
            if let Err(problem) = check_program(&result.program) {
                panic!("{} + {}: {}", mcu, toggle, problem);
            }
        }
    }
}
