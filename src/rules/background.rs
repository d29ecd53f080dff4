//! Forbidden background color detection.
//!
//! Border pixels are sampled and averaged; the background is flagged when the
//! average sits within `tolerance` of a forbidden color on every channel.
//! Exact equality is never required since compression perturbs flat fills.

use anyhow::{anyhow, bail, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::report::StageOutcome;

pub const DEFAULT_TOLERANCE: f64 = 15.0;
pub const DEFAULT_EDGE_STEP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(value: &str) -> Result<Self> {
        let Some(hex_part) = value.strip_prefix('#') else {
            bail!("Invalid color '{value}'. Must be hex (#RRGGBB)");
        };
        if hex_part.len() != 6 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Invalid color '{value}'. Must be hex (#RRGGBB)");
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex_part[range], 16)
                .map_err(|_| anyhow!("Invalid color '{value}'. Must be hex (#RRGGBB)"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Color::parse_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenColor {
    pub label: String,
    pub hex: Color,
}

/// Which border pixels feed the average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BorderSampling {
    Corners,
    EdgeStride { step: u32 },
}

impl Default for BorderSampling {
    fn default() -> Self {
        BorderSampling::EdgeStride {
            step: DEFAULT_EDGE_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundRules {
    pub forbidden_colors: Vec<ForbiddenColor>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub sampling: BorderSampling,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl BackgroundRules {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            bail!("background tolerance must be positive, got {}", self.tolerance);
        }
        if let BorderSampling::EdgeStride { step: 0 } = self.sampling {
            bail!("edge_stride sampling step must be at least 1");
        }
        Ok(())
    }

    /// First forbidden color the border average falls within tolerance of.
    pub fn find_forbidden(&self, average: [f64; 3]) -> Option<&ForbiddenColor> {
        self.forbidden_colors.iter().find(|forbidden| {
            let target = [forbidden.hex.r, forbidden.hex.g, forbidden.hex.b];
            average
                .iter()
                .zip(target)
                .all(|(avg, channel)| (avg - f64::from(channel)).abs() < self.tolerance)
        })
    }

    pub fn check(&self, pixels: &RgbImage) -> StageOutcome {
        let Some(average) = border_average(pixels, self.sampling) else {
            return StageOutcome::advisory("Background color not checked: image has no pixels");
        };
        let observed = Color::new(
            average[0].round() as u8,
            average[1].round() as u8,
            average[2].round() as u8,
        );

        match self.find_forbidden(average) {
            Some(forbidden) => StageOutcome::error(format!(
                "Background is {} ({}): border averages {observed}, within {} of a forbidden color",
                forbidden.label, forbidden.hex, self.tolerance
            )),
            None => StageOutcome::pass(format!(
                "Background color {observed} is not a forbidden color"
            )),
        }
    }
}

/// Border sample coordinates for a `width` x `height` grid.
pub fn sample_points(width: u32, height: u32, sampling: BorderSampling) -> Vec<(u32, u32)> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let (right, bottom) = (width - 1, height - 1);

    match sampling {
        BorderSampling::Corners => vec![(0, 0), (right, 0), (0, bottom), (right, bottom)],
        BorderSampling::EdgeStride { step } => {
            let step = step.max(1) as usize;
            let mut points = Vec::new();
            for x in (0..width).step_by(step) {
                points.push((x, 0));
                points.push((x, bottom));
            }
            for y in (0..height).step_by(step) {
                points.push((0, y));
                points.push((right, y));
            }
            points
        }
    }
}

/// Mean RGB over the sampled border pixels.
pub fn border_average(pixels: &RgbImage, sampling: BorderSampling) -> Option<[f64; 3]> {
    let points = sample_points(pixels.width(), pixels.height(), sampling);
    if points.is_empty() {
        return None;
    }

    let mut sum = [0.0f64; 3];
    for &(x, y) in &points {
        let pixel = pixels.get_pixel(x, y);
        for (acc, channel) in sum.iter_mut().zip(pixel.0) {
            *acc += f64::from(channel);
        }
    }
    let count = points.len() as f64;
    Some(sum.map(|total| total / count))
}
