use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{imageops, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::edges::canny;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use super::{MockupDetector, MockupVerdict};
use crate::asset::Asset;

/// Tunable thresholds for the phone-silhouette heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometricParams {
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,

    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub epsilon_ratio: f64,
    pub min_vertices: usize,
    pub max_vertices: usize,

    /// Bounding-box width / height band of a portrait phone
    pub min_aspect: f64,
    pub max_aspect: f64,

    /// Candidate must be taller than this share of the image height
    pub min_height_ratio: f64,
}

impl Default for GeometricParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            epsilon_ratio: 0.02,
            min_vertices: 4,
            max_vertices: 8,
            min_aspect: 0.4,
            max_aspect: 0.6,
            min_height_ratio: 0.3,
        }
    }
}

/// Looks for a tall, portrait, roughly rectangular outline. Heuristic only:
/// both false positives and misses are expected.
pub struct GeometricDetector {
    params: GeometricParams,
}

impl GeometricDetector {
    pub fn new(params: GeometricParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl MockupDetector for GeometricDetector {
    async fn detect(&self, asset: &Asset) -> Result<MockupVerdict> {
        let pixels = asset.shared_pixels();
        let params = self.params.clone();
        let found = tokio::task::spawn_blocking(move || detect_device_frame(&pixels, &params))
            .await
            .context("contour scan worker join failed")?;

        Ok(if found {
            MockupVerdict::Detected
        } else {
            MockupVerdict::Clear
        })
    }
}

pub fn detect_device_frame(pixels: &RgbImage, params: &GeometricParams) -> bool {
    let gray = imageops::grayscale(pixels);
    let blurred = imageops::blur(&gray, params.blur_sigma);
    let edges = canny(&blurred, params.canny_low, params.canny_high);
    let min_height = params.min_height_ratio * f64::from(pixels.height());

    find_contours::<i32>(&edges)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer))
        .any(|contour| is_device_silhouette(&contour.points, min_height, params))
}

pub fn is_device_silhouette(points: &[Point<i32>], min_height: f64, params: &GeometricParams) -> bool {
    if points.len() < params.min_vertices {
        return false;
    }

    let perimeter = arc_length(points, true);
    if perimeter <= 0.0 {
        return false;
    }
    let polygon = approximate_polygon_dp(points, params.epsilon_ratio * perimeter, true);
    if !(params.min_vertices..=params.max_vertices).contains(&polygon.len()) {
        return false;
    }

    let Some((width, height)) = bounding_size(points) else {
        return false;
    };
    let aspect = width / height;
    (params.min_aspect..=params.max_aspect).contains(&aspect) && height > min_height
}

/// Inclusive pixel extent of the point set.
fn bounding_size(points: &[Point<i32>]) -> Option<(f64, f64)> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some((
        f64::from(max_x - min_x + 1),
        f64::from(max_y - min_y + 1),
    ))
}
