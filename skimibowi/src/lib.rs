//! Skimibowi - SKiDL microcontroller board program generator
//!
//! Turns a declarative board configuration (microcontroller, power
//! architecture, peripherals, programming interface, form factor) into a
//! SKiDL program that produces the board's KiCad netlist.
//!
//! # Quick Start
//!
//! ```no_run
//! use skimibowi::{GenerationOptions, SkimibowiCore};
//!
//! let json = r#"{"mcu": "ESP-12E", "mcurail": "+3V3", "reset_button": true}"#;
//! let result = SkimibowiCore::generate_json(json, GenerationOptions::default()).unwrap();
//!
//! print!("{}", result.program);
//! ```
//!
//! # Pipeline
//!
//! - **Configuration**: raw option record -> validated [`BoardConfig`],
//!   followed by the cross-feature compatibility check
//! - **Composition**: the feature table is walked in order; each selected
//!   fragment declares its parts and nets through one shared namespace
//! - **Rendering**: preamble, fragments and postamble concatenated verbatim

pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod mcu;
pub mod nets;
pub mod parts;
pub mod power_path;
pub mod render;

// Re-export main types
pub use crate::core::{
    prepare, GenerationOptions, GenerationResult, GenerationStats, SkimibowiCore, SkimibowiError,
};
pub use catalog::Fragment;
pub use config::{validate, BoardConfig, ConfigError, RawConfig};
pub use engine::{Composer, Composition, FeatureEntry};
pub use nets::{NetHandle, NetNamespace};

/// Generate a program with default options (convenience wrapper).
pub fn generate(raw: &RawConfig) -> Result<String, SkimibowiError> {
    SkimibowiCore::generate(raw, GenerationOptions::default()).map(|result| result.program)
}

/// Generate a program from a JSON option record (convenience wrapper).
pub fn generate_from_json(json: &str) -> Result<String, SkimibowiError> {
    SkimibowiCore::generate_json(json, GenerationOptions::default()).map(|result| result.program)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BoardConfig, Composer, ConfigError, GenerationOptions, GenerationResult, RawConfig,
        SkimibowiCore, SkimibowiError,
    };
}
