use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::bridge::VisionSettings;
use crate::catalog::{Catalog, CategorySpec};
use crate::composition::{CompositionStrategy, GeometricParams};
use crate::rules::{BackgroundRules, TextPolicy};

const BUILTIN_GUIDELINE: &str = include_str!("../config/guideline.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionSettings {
    #[serde(default)]
    pub strategy: CompositionStrategy,
    #[serde(default)]
    pub vision: VisionSettings,
    #[serde(default)]
    pub geometric: GeometricParams,
}

/// One revision of the design guideline: catalog, color rules, word lists and
/// collaborator settings. Revisions differ only in data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineConfig {
    pub categories: Vec<CategorySpec>,
    pub background: BackgroundRules,
    pub text_policy: TextPolicy,
    #[serde(default)]
    pub composition: CompositionSettings,
}

impl GuidelineConfig {
    /// The guideline revision shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_GUIDELINE).context("built-in guideline is invalid")
    }

    /// Reads `path` when given, otherwise falls back to the built-in revision.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read guideline config from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid guideline config in {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: GuidelineConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.background.validate()?;
        self.text_policy.validate()?;
        if self.composition.vision.timeout_secs == 0 {
            bail!("vision timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::new(self.categories.clone())
    }
}

/// Reads the credential named by `env_name`. Missing or blank is an error.
pub fn resolve_api_key(env_name: &str) -> Result<String> {
    match env::var(env_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => bail!("environment variable {env_name} is set but empty"),
        Err(err) => bail!("vision API key not available from {env_name}: {err}"),
    }
}
