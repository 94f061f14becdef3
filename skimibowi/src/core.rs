//! Generation pipeline shared by the CLI and library callers.
//! No I/O: callers hand in the configuration and get text back.

use serde::Serialize;

use crate::catalog::Fragment;
use crate::config::{check_compatibility, validate, BoardConfig, ConfigError, RawConfig};
use crate::engine::{Composer, Composition};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkimibowiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Unsupported combination: {feature}: {reason}")]
    UnsupportedCombination { feature: String, reason: String },
    #[error("Internal consistency error in {fragment}: {detail}")]
    InternalConsistency { fragment: String, detail: String },
}

/// Options for a generation run.
#[derive(Clone, Debug, Default)]
pub struct GenerationOptions {
    /// Prefix every fragment with a `# Title` comment.
    pub section_comments: bool,
}

/// Generated program with the fragments it was assembled from.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub program: String,
    pub fragments: Vec<Fragment>,
    pub parts: Vec<String>,
    pub nets: Vec<String>,
    pub stats: GenerationStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub fragments: usize,
    pub parts: usize,
    pub nets: usize,
    pub lines: usize,
}

impl GenerationResult {
    pub fn features(&self) -> Vec<&'static str> {
        self.fragments.iter().map(|f| f.feature).collect()
    }

    fn from_composition(composition: Composition) -> Self {
        let program = composition.render();
        let stats = GenerationStats {
            fragments: composition.fragments.len(),
            parts: composition.parts.len(),
            nets: composition.nets.len(),
            lines: program.lines().count(),
        };
        Self {
            program,
            fragments: composition.fragments,
            parts: composition.parts,
            nets: composition.nets,
            stats,
        }
    }
}

/// Validate and run the compatibility checks. Nothing is composed.
pub fn prepare(raw: &RawConfig) -> Result<BoardConfig, SkimibowiError> {
    let config = validate(raw)?;
    check_compatibility(&config)?;
    Ok(config)
}

/// Generation API used by both the CLI and library callers.
pub struct SkimibowiCore;

impl SkimibowiCore {
    /// Generate the program for a raw option record.
    pub fn generate(
        raw: &RawConfig,
        options: GenerationOptions,
    ) -> Result<GenerationResult, SkimibowiError> {
        let config = prepare(raw)?;
        Self::generate_validated(&config, options)
    }

    /// Generate from an already validated configuration.
    pub fn generate_validated(
        config: &BoardConfig,
        options: GenerationOptions,
    ) -> Result<GenerationResult, SkimibowiError> {
        let composer = Composer::new().section_comments(options.section_comments);
        let composition = composer.compose(config)?;
        Ok(GenerationResult::from_composition(composition))
    }

    /// Parse a JSON option record and generate.
    pub fn generate_json(
        json: &str,
        options: GenerationOptions,
    ) -> Result<GenerationResult, SkimibowiError> {
        let raw = RawConfig::from_json(json)?;
        Self::generate(&raw, options)
    }
}
