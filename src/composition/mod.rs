//! Visual composition: device-mockup detection.
//!
//! Two interchangeable detectors sit behind `MockupDetector`. Their verdict is
//! turned into report lines by `evaluate`, which also applies the
//! per-category mockup exemption.

pub mod geometric;
pub mod verdict;
pub mod vision;

pub use geometric::{GeometricDetector, GeometricParams};
pub use verdict::parse_mockup_verdict;
pub use vision::VisionMockupDetector;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::catalog::CategorySpec;
use crate::report::{Stage, StageOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockupVerdict {
    Detected,
    Clear,
    /// The detector ran but could not reach a verdict.
    Indeterminate(String),
}

/// An `Err` means the detector itself failed (network, auth, timeout).
#[async_trait]
pub trait MockupDetector: Send + Sync {
    async fn detect(&self, asset: &Asset) -> Result<MockupVerdict>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionStrategy {
    #[default]
    Geometric,
    VisionModel,
}

pub fn evaluate(verdict: &MockupVerdict, spec: Option<&CategorySpec>) -> StageOutcome {
    let exempt_category = spec.filter(|s| s.allows_device_mockup).map(|s| s.name.as_str());

    match (verdict, exempt_category) {
        (MockupVerdict::Detected, None) => StageOutcome::error(
            "Device mockup detected: remove the phone frame (bezel, home button, notch) around the creative",
        ),
        (MockupVerdict::Detected, Some(name)) => StageOutcome::advisory(format!(
            "Device mockup detected; permitted for {name}"
        )),
        (MockupVerdict::Clear, _) => StageOutcome::pass("No device mockup detected"),
        (MockupVerdict::Indeterminate(_), Some(name)) => {
            StageOutcome::pass(format!("Device mockups are permitted for {name}"))
        }
        (MockupVerdict::Indeterminate(reason), None) => {
            StageOutcome::indeterminate(Stage::Composition, reason)
        }
    }
}
