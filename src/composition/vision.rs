use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::verdict::{parse_mockup_verdict, MOCKUP_INSTRUCTION};
use super::{MockupDetector, MockupVerdict};
use crate::asset::Asset;
use crate::bridge::{ImagePayload, VisionModel};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Asks a remote vision model whether the creative carries a device frame.
pub struct VisionMockupDetector {
    model: Arc<dyn VisionModel>,
    timeout: Duration,
}

impl VisionMockupDetector {
    pub fn new(model: Arc<dyn VisionModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }
}

#[async_trait]
impl MockupDetector for VisionMockupDetector {
    async fn detect(&self, asset: &Asset) -> Result<MockupVerdict> {
        let payload = ImagePayload::png(asset.encode_png()?);

        // No retry on failure or expiry; the caller records the stage as indeterminate.
        let response = match tokio::time::timeout(
            self.timeout,
            self.model.analyze(&payload, MOCKUP_INSTRUCTION),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => bail!("vision model timed out after {:?}", self.timeout),
        };

        log_debug!("vision model response: {response}");
        Ok(parse_mockup_verdict(&response))
    }
}
