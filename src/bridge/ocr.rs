use anyhow::{anyhow, bail, Context, Result};
use image::RgbImage;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::asset::encode_png;

/// Text extraction engine. Implementations block; callers run them on a
/// blocking worker.
pub trait OcrEngine: Send + Sync {
    fn extract_text(&self, pixels: &RgbImage, languages: &[String]) -> Result<Vec<String>>;
}

/// Runs the `tesseract` CLI, piping a PNG on stdin and reading text on stdout.
pub struct TesseractOcr {
    command: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn extract_text(&self, pixels: &RgbImage, languages: &[String]) -> Result<Vec<String>> {
        let png = encode_png(pixels)?;
        let langs = languages.join("+");

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", langs.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to launch OCR engine '{}'", self.command))?;

        let written = {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("OCR engine stdin unavailable"))?;
            stdin.write_all(&png)
        };

        // Always reap the child; an early exit leaves the cause on stderr.
        let output = child
            .wait_with_output()
            .context("OCR engine did not finish")?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Err(err) = written {
            bail!(
                "failed to stream image to OCR engine: {err} (exited with {}: {})",
                output.status,
                stderr.trim()
            );
        }
        if !output.status.success() {
            bail!(
                "OCR engine exited with {} ({})",
                output.status,
                stderr.trim()
            );
        }

        Ok(split_fragments(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// One fragment per non-blank output line.
pub fn split_fragments(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
