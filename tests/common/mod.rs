#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use creative_check_lib::asset::{Asset, AssetFormat};
use creative_check_lib::bridge::OcrEngine;
use creative_check_lib::composition::{MockupDetector, MockupVerdict};
use creative_check_lib::settings::GuidelineConfig;
use creative_check_lib::validator::Validator;
use image::{Rgb, RgbImage};
use std::sync::Arc;

pub const KB: u64 = 1024;
pub const MID_GRAY: [u8; 3] = [128, 128, 128];

/// Returns fixed fragments, or fails like an engine that never started.
pub struct StubOcr(pub Option<Vec<&'static str>>);

impl OcrEngine for StubOcr {
    fn extract_text(&self, _pixels: &RgbImage, _languages: &[String]) -> Result<Vec<String>> {
        match &self.0 {
            Some(fragments) => Ok(fragments.iter().map(|f| f.to_string()).collect()),
            None => Err(anyhow!("tesseract not installed")),
        }
    }
}

pub enum StubDetector {
    Verdict(MockupVerdict),
    Fails,
}

#[async_trait]
impl MockupDetector for StubDetector {
    async fn detect(&self, _asset: &Asset) -> Result<MockupVerdict> {
        match self {
            StubDetector::Verdict(verdict) => Ok(verdict.clone()),
            StubDetector::Fails => Err(anyhow!("vision service returned 503")),
        }
    }
}

pub fn validator(detector: StubDetector, ocr: StubOcr) -> Validator {
    let config = GuidelineConfig::builtin().expect("built-in guideline");
    Validator::new(
        config.catalog().expect("built-in catalog"),
        config.background,
        config.text_policy,
        Arc::new(detector),
        Arc::new(ocr),
    )
}

pub fn clean_validator() -> Validator {
    validator(
        StubDetector::Verdict(MockupVerdict::Clear),
        StubOcr(Some(Vec::new())),
    )
}

pub fn uniform_asset(width: u32, height: u32, color: [u8; 3], byte_size: u64) -> Asset {
    Asset::from_parts(
        RgbImage::from_pixel(width, height, Rgb(color)),
        byte_size,
        AssetFormat::Png,
    )
}
