use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

const VARIABLE_KEYWORD: &str = "variable";

/// Expected height of a category: an exact pixel count, or unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHeight", into = "RawHeight")]
pub enum HeightSpec {
    Fixed(u32),
    Variable,
}

impl HeightSpec {
    pub fn admits(&self, height: u32) -> bool {
        match self {
            HeightSpec::Fixed(expected) => *expected == height,
            HeightSpec::Variable => true,
        }
    }
}

impl std::fmt::Display for HeightSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeightSpec::Fixed(px) => write!(f, "{px}"),
            HeightSpec::Variable => f.write_str(VARIABLE_KEYWORD),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawHeight {
    Pixels(u32),
    Keyword(String),
}

impl TryFrom<RawHeight> for HeightSpec {
    type Error = anyhow::Error;

    fn try_from(raw: RawHeight) -> Result<Self> {
        match raw {
            RawHeight::Pixels(px) => Ok(HeightSpec::Fixed(px)),
            RawHeight::Keyword(word) if word.eq_ignore_ascii_case(VARIABLE_KEYWORD) => {
                Ok(HeightSpec::Variable)
            }
            RawHeight::Keyword(word) => Err(anyhow!(
                "invalid height '{word}': expected a pixel count or \"{VARIABLE_KEYWORD}\""
            )),
        }
    }
}

impl From<HeightSpec> for RawHeight {
    fn from(height: HeightSpec) -> Self {
        match height {
            HeightSpec::Fixed(px) => RawHeight::Pixels(px),
            HeightSpec::Variable => RawHeight::Keyword(VARIABLE_KEYWORD.into()),
        }
    }
}

/// One creative category from the design guideline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub width: u32,
    pub height: HeightSpec,
    pub size_limit_kb: f64,
    /// Guideline page reference shown alongside a successful match.
    #[serde(default)]
    pub guide_ref: Option<String>,
    /// Manual-review reminder appended whenever this category matches.
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub max_text_chars: Option<usize>,
    /// Device frames are permitted for this category.
    #[serde(default)]
    pub allows_device_mockup: bool,
}

impl CategorySpec {
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height.admits(height)
    }

    pub fn dimensions_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("category name must not be empty");
        }
        if self.width == 0 {
            bail!("category '{}' has zero width", self.name);
        }
        if self.height == HeightSpec::Fixed(0) {
            bail!("category '{}' has zero height", self.name);
        }
        if !(self.size_limit_kb.is_finite() && self.size_limit_kb > 0.0) {
            bail!(
                "category '{}' has invalid size limit {}",
                self.name,
                self.size_limit_kb
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_accepts_pixels_and_variable_keyword() {
        let fixed: HeightSpec = serde_json::from_str("360").unwrap();
        assert_eq!(fixed, HeightSpec::Fixed(360));

        let variable: HeightSpec = serde_json::from_str("\"Variable\"").unwrap();
        assert_eq!(variable, HeightSpec::Variable);

        assert!(serde_json::from_str::<HeightSpec>("\"tall\"").is_err());
    }

    #[test]
    fn variable_height_serializes_as_keyword() {
        let json = serde_json::to_string(&HeightSpec::Variable).unwrap();
        assert_eq!(json, "\"variable\"");
    }

    #[test]
    fn rejects_non_positive_size_limit() {
        let spec = CategorySpec {
            name: "banner".into(),
            width: 720,
            height: HeightSpec::Fixed(210),
            size_limit_kb: 0.0,
            guide_ref: None,
            note: None,
            max_text_chars: None,
            allows_device_mockup: false,
        };
        assert!(spec.validate().is_err());
    }
}
