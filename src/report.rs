//! Report assembly.
//!
//! Stages hand in a `StageOutcome` in whatever order they finish; the
//! assembler emits them in the fixed stage order regardless.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::asset::{Asset, AssetFormat};
use crate::catalog::Classification;

/// Validation stages in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Classification,
    SizeFormat,
    Background,
    Composition,
    TextPolicy,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Classification => "classification",
            Stage::SizeFormat => "size/format",
            Stage::Background => "background color",
            Stage::Composition => "composition",
            Stage::TextPolicy => "text policy",
        }
    }
}

/// What a single stage contributes to the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub errors: Vec<String>,
    pub passes: Vec<String>,
    pub advisories: Vec<String>,
}

impl StageOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self::default().with_error(message)
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::default().with_pass(message)
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self::default().with_advisory(message)
    }

    /// A collaborator could not produce a verdict for `stage`.
    pub fn indeterminate(stage: Stage, reason: impl fmt::Display) -> Self {
        Self::advisory(format!(
            "{} check indeterminate: {reason}; review manually",
            stage.label()
        ))
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn with_pass(mut self, message: impl Into<String>) -> Self {
        self.passes.push(message.into());
        self
    }

    pub fn with_advisory(mut self, message: impl Into<String>) -> Self {
        self.advisories.push(message.into());
        self
    }

    pub fn merge(&mut self, other: StageOutcome) {
        self.errors.extend(other.errors);
        self.passes.extend(other.passes);
        self.advisories.extend(other.advisories);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.passes.is_empty() && self.advisories.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub request_id: Uuid,
    pub checked_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    pub format: AssetFormat,
    pub classification: Classification,
    pub verdict: Verdict,
    pub errors: Vec<String>,
    pub passes: Vec<String>,
    pub advisories: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.verdict {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        };
        writeln!(
            f,
            "Result: {verdict}  ({}x{}, {:.1}KB, {:?})",
            self.width,
            self.height,
            self.byte_size as f64 / 1024.0,
            self.format
        )?;
        writeln!(f, "Category: {}", self.classification)?;

        for (heading, marker, lines) in [
            ("Errors", "x", &self.errors),
            ("Passed", "v", &self.passes),
            ("Manual review", "!", &self.advisories),
        ] {
            if lines.is_empty() {
                continue;
            }
            writeln!(f, "\n{heading}:")?;
            for line in lines {
                writeln!(f, "  [{marker}] {line}")?;
            }
        }
        write!(f, "\nRequest {}", self.request_id)
    }
}

/// Collects stage outcomes for one request and builds the final report.
pub struct ReportAssembler {
    request_id: Uuid,
    width: u32,
    height: u32,
    byte_size: u64,
    format: AssetFormat,
    classification: Classification,
    stages: BTreeMap<Stage, StageOutcome>,
}

impl ReportAssembler {
    pub fn new(request_id: Uuid, asset: &Asset, classification: Classification) -> Self {
        Self {
            request_id,
            width: asset.width(),
            height: asset.height(),
            byte_size: asset.byte_size(),
            format: asset.format(),
            classification,
            stages: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.entry(stage).or_default().merge(outcome);
    }

    pub fn finish(self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut passes = Vec::new();
        let mut advisories = Vec::new();

        for outcome in self.stages.into_values() {
            errors.extend(outcome.errors);
            passes.extend(outcome.passes);
            advisories.extend(outcome.advisories);
        }

        let verdict = if errors.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        ValidationReport {
            request_id: self.request_id,
            checked_at: Utc::now(),
            width: self.width,
            height: self.height,
            byte_size: self.byte_size,
            format: self.format,
            classification: self.classification,
            verdict,
            errors,
            passes,
            advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use pretty_assertions::assert_eq;

    fn assembler() -> ReportAssembler {
        let asset = Asset::from_parts(RgbImage::new(720, 360), 1024, AssetFormat::Png);
        ReportAssembler::new(
            Uuid::new_v4(),
            &asset,
            Classification::Matched("list screen".into()),
        )
    }

    #[test]
    fn emits_stages_in_fixed_order_regardless_of_arrival() {
        let mut assembler = assembler();
        assembler.record(Stage::TextPolicy, StageOutcome::error("banned phrase"));
        assembler.record(Stage::Background, StageOutcome::pass("background ok"));
        assembler.record(Stage::Classification, StageOutcome::pass("list screen"));
        assembler.record(Stage::SizeFormat, StageOutcome::error("too big"));

        let report = assembler.finish();
        assert_eq!(report.errors, vec!["too big", "banned phrase"]);
        assert_eq!(report.passes, vec!["list screen", "background ok"]);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn advisories_never_fail_the_report() {
        let mut assembler = assembler();
        assembler.record(
            Stage::Composition,
            StageOutcome::indeterminate(Stage::Composition, "vision call timed out"),
        );
        assembler.record(Stage::TextPolicy, StageOutcome::advisory("livestream marker"));

        let report = assembler.finish();
        assert!(report.passed());
        assert_eq!(report.advisories.len(), 2);
        assert!(report.advisories[0].starts_with("composition check indeterminate"));
    }

    #[test]
    fn serializes_classification_as_label() {
        let report = assembler().finish();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["classification"], "list screen");
        assert_eq!(json["verdict"], "pass");
        assert_eq!(json["format"], "png");
    }
}
