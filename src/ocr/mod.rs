pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::{TesseractEngine, TextRecognizer};
pub use extract::{NameFanPair, PairExtractor};
pub use setup::ensure_tesseract;

use anyhow::Result;
use std::path::Path;

use crate::tracker::convergence::PageReader;

/// Reads name/fan pairs from captured pages: recognizer first, then extractor.
pub struct OcrPageReader<R: TextRecognizer> {
    recognizer: R,
    extractor: PairExtractor,
}

impl<R: TextRecognizer> OcrPageReader<R> {
    pub fn new(recognizer: R, extractor: PairExtractor) -> Self {
        Self {
            recognizer,
            extractor,
        }
    }
}

impl<R: TextRecognizer> PageReader for OcrPageReader<R> {
    fn read_page(&self, image_path: &Path) -> Result<Vec<NameFanPair>> {
        let detections = self.recognizer.recognize(image_path)?;
        Ok(self.extractor.extract(detections))
    }
}
