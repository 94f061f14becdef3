//! Composition engine.
//!
//! Walks the feature table once, top to bottom. For every entry whose
//! predicate holds it checks the entry's prerequisites, runs the builder
//! against the shared net namespace and part registry, and records what the
//! fragment declared. A false predicate contributes nothing at all.

pub mod audit;
pub mod table;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::catalog::{Fragment, FragmentWriter};
use crate::config::BoardConfig;
use crate::core::SkimibowiError;
use crate::nets::NetNamespace;
use crate::parts::PartRegistry;
use crate::render::{self, POSTAMBLE};
pub use audit::{audit, dependency_graph, Dependency};
pub use table::{FeatureEntry, NameSet};

/// Everything a program is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub preamble: String,
    pub fragments: Vec<Fragment>,
    pub postamble: String,
    /// Parts in declaration order.
    pub parts: Vec<String>,
    /// Nets in declaration order.
    pub nets: Vec<String>,
}

impl Composition {
    pub fn render(&self) -> String {
        render::render(
            &self.preamble,
            self.fragments.iter().map(|f| f.text.as_str()),
            &self.postamble,
        )
    }

    /// Names of the fragments that were emitted, in order.
    pub fn features(&self) -> Vec<&'static str> {
        self.fragments.iter().map(|f| f.feature).collect()
    }
}

/// Runs a feature table against validated configurations.
#[derive(Debug, Clone)]
pub struct Composer {
    table: Vec<FeatureEntry>,
    section_comments: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    /// Composer over the built-in table.
    pub fn new() -> Self {
        Self {
            table: table::builtin(),
            section_comments: false,
        }
    }

    /// Composer over a custom table. The table is audited first.
    pub fn with_table(table: Vec<FeatureEntry>) -> Result<Self, SkimibowiError> {
        audit(&table)?;
        Ok(Self {
            table,
            section_comments: false,
        })
    }

    /// Start every fragment with a `# Title` comment line.
    pub fn section_comments(mut self, enabled: bool) -> Self {
        self.section_comments = enabled;
        self
    }

    pub fn table(&self) -> &[FeatureEntry] {
        &self.table
    }

    pub fn compose(&self, config: &BoardConfig) -> Result<Composition, SkimibowiError> {
        let mut nets = NetNamespace::new();
        let mut parts = PartRegistry::new();
        let mut fragments = Vec::new();

        for entry in &self.table {
            if !(entry.predicate)(config) {
                trace!("Skipping {}", entry.name);
                continue;
            }
            check_prerequisites(entry, &nets, &parts)?;

            let mut writer = FragmentWriter::new(entry.name, &mut nets, &parts);
            if self.section_comments {
                writer.comment(entry.title);
            }
            (entry.build)(config, &mut writer)?;
            let fragment = writer.finish()?;

            self.check_ownership(entry, &fragment)?;
            for part in &fragment.declared_parts {
                if !parts.declare(part) {
                    return Err(inconsistency(entry, format!("part {part} is declared twice")));
                }
            }

            debug!(
                "Fragment {}: {} part(s), {} new net(s)",
                entry.name,
                fragment.declared_parts.len(),
                fragment.declared_nets.len()
            );
            fragments.push(fragment);
        }

        info!(
            "Composed {} fragment(s) for {}: {} part(s), {} net(s)",
            fragments.len(),
            config.mcu,
            parts.len(),
            nets.len()
        );

        Ok(Composition {
            preamble: render::preamble(&config.passives),
            fragments,
            postamble: POSTAMBLE.to_string(),
            parts: parts.iter().map(str::to_string).collect(),
            nets: nets.declared().map(str::to_string).collect(),
        })
    }

    /// A fragment may only declare the parts it lists, and may not declare a
    /// net another entry owns.
    fn check_ownership(&self, entry: &FeatureEntry, fragment: &Fragment) -> Result<(), SkimibowiError> {
        if let Some(part) = fragment
            .declared_parts
            .iter()
            .find(|part| !entry.provides.parts.contains(&part.as_str()))
        {
            return Err(inconsistency(entry, format!("declares unlisted part {part}")));
        }

        for net in &fragment.declared_nets {
            let owner = self
                .table
                .iter()
                .find(|other| other.name != entry.name && other.provides.nets.contains(&net.as_str()));
            if let Some(owner) = owner {
                return Err(inconsistency(
                    entry,
                    format!("declares net {net}, which belongs to {}", owner.name),
                ));
            }
        }
        Ok(())
    }
}

fn check_prerequisites(
    entry: &FeatureEntry,
    nets: &NetNamespace,
    parts: &PartRegistry,
) -> Result<(), SkimibowiError> {
    if let Some(part) = entry.requires.parts.iter().find(|part| !parts.contains(part)) {
        return Err(inconsistency(entry, format!("part {part} has not been declared")));
    }
    if let Some(net) = entry.requires.nets.iter().find(|net| !nets.is_declared(net)) {
        return Err(inconsistency(entry, format!("net {net} has not been declared")));
    }
    Ok(())
}

fn inconsistency(entry: &FeatureEntry, detail: String) -> SkimibowiError {
    SkimibowiError::InternalConsistency {
        fragment: entry.name.to_string(),
        detail,
    }
}
