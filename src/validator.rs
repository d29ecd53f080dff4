use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::asset::Asset;
use crate::bridge::{GeminiClient, OcrEngine, TesseractOcr};
use crate::catalog::{Catalog, CategorySpec};
use crate::composition::{
    evaluate, CompositionStrategy, GeometricDetector, MockupDetector, MockupVerdict,
    VisionMockupDetector,
};
use crate::report::{ReportAssembler, Stage, StageOutcome, ValidationReport};
use crate::rules::{check_size, BackgroundRules, TextPolicy};
use crate::settings::{resolve_api_key, GuidelineConfig};

// Set to true to enable per-stage logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Runs every check for one asset and assembles the report.
///
/// Holds only read-only rule data and collaborator handles, so one instance
/// serves any number of requests.
pub struct Validator {
    catalog: Catalog,
    background: BackgroundRules,
    text_policy: TextPolicy,
    detector: Arc<dyn MockupDetector>,
    ocr: Arc<dyn OcrEngine>,
}

impl Validator {
    pub fn new(
        catalog: Catalog,
        background: BackgroundRules,
        text_policy: TextPolicy,
        detector: Arc<dyn MockupDetector>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            catalog,
            background,
            text_policy,
            detector,
            ocr,
        }
    }

    /// Wires production collaborators. Fails when the selected composition
    /// strategy needs a credential that is not configured.
    pub fn from_config(config: GuidelineConfig) -> Result<Self> {
        let catalog = config.catalog()?;
        let composition = &config.composition;

        let detector: Arc<dyn MockupDetector> = match composition.strategy {
            CompositionStrategy::Geometric => {
                Arc::new(GeometricDetector::new(composition.geometric.clone()))
            }
            CompositionStrategy::VisionModel => {
                let api_key = resolve_api_key(&composition.vision.api_key_env)
                    .context("vision_model strategy selected but no credential is configured")?;
                let client = GeminiClient::new(&composition.vision, api_key)?;
                Arc::new(VisionMockupDetector::new(
                    Arc::new(client),
                    composition.vision.timeout(),
                ))
            }
        };
        log_info!(
            "validator ready: {} categories, composition strategy {:?}",
            catalog.len(),
            composition.strategy
        );

        let ocr = Arc::new(TesseractOcr::new(config.text_policy.ocr_command.clone()));
        Ok(Self::new(
            catalog,
            config.background,
            config.text_policy,
            detector,
            ocr,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn validate_bytes(&self, bytes: &[u8]) -> Result<ValidationReport> {
        let asset = Asset::decode(bytes)?;
        Ok(self.validate(&asset).await)
    }

    pub async fn validate(&self, asset: &Asset) -> ValidationReport {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let (classification, spec) = self.catalog.classify(asset.width(), asset.height());
        log_info!(
            "[{request_id}] {}x{} {:.1}KB classified as {classification}",
            asset.width(),
            asset.height(),
            asset.size_kb()
        );

        let mut assembler = ReportAssembler::new(request_id, asset, classification);
        assembler.record(Stage::Classification, classification_outcome(spec));
        assembler.record(
            Stage::SizeFormat,
            check_size(asset, spec).with_pass(format!("Format {:?} accepted", asset.format())),
        );
        assembler.record(Stage::Background, self.background.check(asset.pixels()));

        let (composition, text) = tokio::join!(
            self.composition_stage(request_id, asset, spec),
            self.text_stage(request_id, asset, spec)
        );
        assembler.record(Stage::Composition, composition);
        assembler.record(Stage::TextPolicy, text);

        let report = assembler.finish();
        log_info!(
            "[{request_id}] verdict {:?}: {} error(s), {} advisory(ies) in {}ms",
            report.verdict,
            report.errors.len(),
            report.advisories.len(),
            started.elapsed().as_millis()
        );
        report
    }

    async fn composition_stage(
        &self,
        request_id: Uuid,
        asset: &Asset,
        spec: Option<&CategorySpec>,
    ) -> StageOutcome {
        let started = Instant::now();
        let verdict = match self.detector.detect(asset).await {
            Ok(verdict) => verdict,
            Err(err) => {
                log_warn!("[{request_id}] mockup detection failed: {err:#}");
                MockupVerdict::Indeterminate(format!("{err:#}"))
            }
        };
        log_info!(
            "[{request_id}] composition verdict {verdict:?} in {}ms",
            started.elapsed().as_millis()
        );
        evaluate(&verdict, spec)
    }

    async fn text_stage(
        &self,
        request_id: Uuid,
        asset: &Asset,
        spec: Option<&CategorySpec>,
    ) -> StageOutcome {
        let started = Instant::now();
        let ocr = Arc::clone(&self.ocr);
        let pixels = asset.shared_pixels();
        let languages = self.text_policy.ocr_languages.clone();

        match tokio::task::spawn_blocking(move || ocr.extract_text(&pixels, &languages)).await {
            Ok(Ok(fragments)) => {
                log_info!(
                    "[{request_id}] OCR found {} fragment(s) in {}ms",
                    fragments.len(),
                    started.elapsed().as_millis()
                );
                self.text_policy.check(&fragments, spec)
            }
            Ok(Err(err)) => {
                log_warn!("[{request_id}] OCR failed after {}ms: {err:#}", started.elapsed().as_millis());
                StageOutcome::indeterminate(Stage::TextPolicy, format!("OCR unavailable ({err:#})"))
            }
            Err(join_err) => {
                log_error!("[{request_id}] OCR worker join failed: {join_err}");
                StageOutcome::indeterminate(Stage::TextPolicy, "OCR worker crashed")
            }
        }
    }
}

fn classification_outcome(spec: Option<&CategorySpec>) -> StageOutcome {
    let Some(spec) = spec else {
        return StageOutcome::default();
    };

    let mut outcome = StageOutcome::pass(match &spec.guide_ref {
        Some(guide_ref) => format!(
            "Classified as {} ({}, {guide_ref})",
            spec.name,
            spec.dimensions_label()
        ),
        None => format!("Classified as {} ({})", spec.name, spec.dimensions_label()),
    });
    if let Some(note) = &spec.note {
        outcome = outcome.with_advisory(note.clone());
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_strategy_without_credential_refuses_to_start() {
        let mut config = GuidelineConfig::builtin().unwrap();
        config.composition.strategy = CompositionStrategy::VisionModel;
        config.composition.vision.api_key_env = "CREATIVE_CHECK_TEST_UNSET_KEY_1C2D".into();

        let err = Validator::from_config(config).err().unwrap();
        assert!(format!("{err:#}").contains("no credential"));
    }

    #[test]
    fn geometric_strategy_needs_no_credential() {
        let config = GuidelineConfig::builtin().unwrap();
        let validator = Validator::from_config(config).unwrap();
        assert_eq!(validator.catalog().len(), 7);
    }

    #[test]
    fn variable_height_note_becomes_advisory() {
        let config = GuidelineConfig::builtin().unwrap();
        let catalog = config.catalog().unwrap();
        let outcome = classification_outcome(catalog.get("detail event image"));
        assert_eq!(outcome.passes.len(), 1);
        assert!(outcome.passes[0].contains("720xvariable"));
        assert_eq!(outcome.advisories.len(), 1);
    }
}
