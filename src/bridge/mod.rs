//! External collaborators: the OCR engine and the remote vision model.

pub mod ocr;
pub mod vision;

pub use ocr::{OcrEngine, TesseractOcr};
pub use vision::{GeminiClient, ImagePayload, VisionModel, VisionSettings};
