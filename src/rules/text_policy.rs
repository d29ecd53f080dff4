use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::CategorySpec;
use crate::report::StageOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCurrency {
    pub canonical: String,
    pub banned_aliases: Vec<String>,
}

/// Keywords that call for a manual placement review without failing the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryTrigger {
    pub keywords: Vec<String>,
    pub advisory: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPolicy {
    pub reward_currency: RewardCurrency,
    #[serde(default)]
    pub banned_phrases: Vec<String>,
    #[serde(default)]
    pub advisory_triggers: Vec<AdvisoryTrigger>,
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: Vec<String>,
    #[serde(default = "default_ocr_command")]
    pub ocr_command: String,
}

fn default_ocr_languages() -> Vec<String> {
    vec!["kor".into(), "eng".into()]
}

fn default_ocr_command() -> String {
    "tesseract".into()
}

/// Lowercases and drops all whitespace so "Down Load" matches "download".
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl TextPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.reward_currency.canonical.trim().is_empty() {
            bail!("reward currency canonical term must not be empty");
        }
        let all_terms = self
            .reward_currency
            .banned_aliases
            .iter()
            .chain(&self.banned_phrases)
            .chain(self.advisory_triggers.iter().flat_map(|t| &t.keywords));
        for term in all_terms {
            if normalize(term).is_empty() {
                bail!("text policy contains a blank term");
            }
        }
        if self.ocr_languages.is_empty() {
            bail!("at least one OCR language is required");
        }
        Ok(())
    }

    /// Evaluates OCR fragments in extraction order.
    pub fn check(&self, fragments: &[String], spec: Option<&CategorySpec>) -> StageOutcome {
        let text: String = fragments.iter().map(|f| normalize(f)).collect();
        let mut outcome = StageOutcome::default();

        for alias in &self.reward_currency.banned_aliases {
            if text.contains(&normalize(alias)) {
                outcome = outcome.with_error(format!(
                    "Reward currency must be called '{}': found '{alias}'",
                    self.reward_currency.canonical
                ));
            }
        }

        for phrase in &self.banned_phrases {
            if text.contains(&normalize(phrase)) {
                outcome = outcome.with_error(format!(
                    "Banned call-to-action '{phrase}': use a visit/access phrasing instead of install/download"
                ));
            }
        }

        if let Some((limit, name)) = spec.and_then(|s| s.max_text_chars.map(|l| (l, &s.name))) {
            let count = text.chars().count();
            if count > limit {
                outcome = outcome.with_error(format!(
                    "Text length {count} characters exceeds the {limit}-character limit for {name}"
                ));
            }
        }

        for trigger in &self.advisory_triggers {
            if trigger
                .keywords
                .iter()
                .any(|keyword| text.contains(&normalize(keyword)))
            {
                outcome = outcome.with_advisory(trigger.advisory.clone());
            }
        }

        if outcome.errors.is_empty() {
            let summary = if text.is_empty() {
                "No text detected".to_string()
            } else {
                format!(
                    "No banned terms or phrases in {} text fragment(s)",
                    fragments.len()
                )
            };
            outcome = outcome.with_pass(summary);
        }
        outcome
    }
}
