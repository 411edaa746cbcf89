//! Configuration file support for the showcase page
//!
//! Loads page settings and the ingot list from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.slagrc.json` in project root
//! 3. `slag.config.json` in project root
//! 4. `"slag"` key in `package.json`
//!
//! All fields are optional. Without any config the built-in example ingots
//! are rendered.

use crate::ingot::{example_ingots, Ingot};
use crate::page::PAGE_SECTION_IDS;
use crate::sexp::parse_crucible;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_TITLE: &str = "slag";
pub const DEFAULT_TAGLINE: &str = "Smelt ideas, skim the bugs, forge the product.";
pub const DEFAULT_CONTAINER_ID: &str = "ingot-display";
pub const DEFAULT_COMPANION_DOCUMENT: &str = "/slag.md";

/// Snippets shown with copy buttons when the config lists none
const DEFAULT_SNIPPETS: &[(&str, &str)] = &[
    ("install", "cargo install slag"),
    ("forge", "slag \"build a todo app with a REST API\""),
    ("resume", "slag resume"),
];

/// Showcase configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlagConfig {
    /// Page title (default: "slag")
    #[serde(default)]
    pub title: Option<String>,

    /// Line shown under the title
    #[serde(default)]
    pub tagline: Option<String>,

    /// Id of the element the ingot cards are mounted into
    #[serde(default)]
    pub container_id: Option<String>,

    /// Site path of the companion Markdown document (default: "/slag.md")
    #[serde(default)]
    pub companion_document: Option<String>,

    /// Command snippets shown with copy buttons
    #[serde(default)]
    pub snippets: Vec<Snippet>,

    /// Inline ingot list
    #[serde(default)]
    pub ingots: Option<Vec<Ingot>>,

    /// Crucible file to read ingots from, relative to the config file
    #[serde(default)]
    pub crucible: Option<PathBuf>,
}

/// A copyable command shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snippet {
    pub label: String,
    pub command: String,
}

/// Resolved configuration with the ingot list materialized
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub title: String,
    pub tagline: String,
    pub container_id: String,
    pub companion_document: String,
    pub snippets: Vec<Snippet>,
    /// Ingots in display order
    pub ingots: Vec<Ingot>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl SlagConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref id) = self.container_id {
            if id.is_empty() {
                anyhow::bail!("container_id must not be empty");
            }
            if !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                anyhow::bail!(
                    "container_id may only contain ASCII letters, digits, '-' and '_' (got {:?})",
                    id
                );
            }
            if PAGE_SECTION_IDS.contains(&id.as_str()) {
                anyhow::bail!("container_id {:?} is already used by the page", id);
            }
        }

        if let Some(ref doc) = self.companion_document {
            if !doc.starts_with('/') {
                anyhow::bail!(
                    "companion_document must be a site path starting with '/' (got {:?})",
                    doc
                );
            }
        }

        for (i, snippet) in self.snippets.iter().enumerate() {
            if snippet.command.trim().is_empty() {
                anyhow::bail!("snippets[{}].command must not be empty", i);
            }
        }

        if self.ingots.is_some() && self.crucible.is_some() {
            anyhow::bail!("ingots and crucible are mutually exclusive");
        }

        Ok(())
    }

    /// Resolve config, reading a crucible relative to the current directory
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_in(Path::new("."))
    }

    /// Resolve config, reading a crucible relative to `base_dir`
    pub fn resolve_in(&self, base_dir: &Path) -> Result<ResolvedConfig> {
        self.validate()?;

        let ingots = match (&self.ingots, &self.crucible) {
            (Some(ingots), _) => ingots.clone(),
            (None, Some(crucible)) => load_crucible(&base_dir.join(crucible))?,
            (None, None) => example_ingots(),
        };
        warn_suspicious_ingots(&ingots);

        let snippets = if self.snippets.is_empty() {
            DEFAULT_SNIPPETS
                .iter()
                .map(|(label, command)| Snippet {
                    label: label.to_string(),
                    command: command.to_string(),
                })
                .collect()
        } else {
            self.snippets.clone()
        };

        Ok(ResolvedConfig {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            tagline: self
                .tagline
                .clone()
                .unwrap_or_else(|| DEFAULT_TAGLINE.to_string()),
            container_id: self
                .container_id
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_string()),
            companion_document: self
                .companion_document
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPANION_DOCUMENT.to_string()),
            snippets,
            ingots,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        SlagConfig::default().resolve()
    }

    /// Replace the ingot list with the contents of a crucible file
    pub fn with_crucible(mut self, path: &Path) -> Result<Self> {
        self.ingots = load_crucible(path)?;
        warn_suspicious_ingots(&self.ingots);
        Ok(self)
    }
}

/// Read ingots from a crucible file
pub fn load_crucible(path: &Path) -> Result<Vec<Ingot>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read crucible file: {}", path.display()))?;
    let ingots = parse_crucible(&content);
    log::debug!("read {} ingot(s) from {}", ingots.len(), path.display());
    Ok(ingots)
}

/// Log duplicate ids and out-of-range heat; neither is rejected
fn warn_suspicious_ingots(ingots: &[Ingot]) {
    let mut seen = HashSet::new();
    for ingot in ingots {
        if !seen.insert(ingot.id.as_str()) {
            log::warn!("duplicate ingot id {:?}", ingot.id);
        }
        if !ingot.heat_in_bounds() {
            log::warn!(
                "ingot {:?} has heat {} outside 0..={}",
                ingot.id,
                ingot.heat,
                ingot.max
            );
        }
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.slagrc.json`
/// 2. `slag.config.json`
/// 3. `"slag"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(SlagConfig, PathBuf)>> {
    for name in [".slagrc.json", "slag.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<SlagConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: SlagConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load slag config from the "slag" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<SlagConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("slag") {
        Some(value) => {
            let config: SlagConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid slag config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid slag config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (SlagConfig::default(), None),
        }
    };

    match source_path {
        Some(ref p) => log::debug!("using config {}", p.display()),
        None => log::debug!("no config file found, using defaults"),
    }

    let base_dir = source_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(project_root);
    let mut resolved = config.resolve_in(base_dir)?;
    resolved.config_path = source_path;
    Ok(resolved)
}
