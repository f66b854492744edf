use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("engine rejected the image: {0}")]
    ImageRejected(String),
    #[error("recognition failed: {0}")]
    Engine(String),
    #[error("no OCR engine available; build with the `tesseract` feature")]
    NotAvailable,
}

/// Seam for the platform text-recognition engine. Implementations receive
/// normalized PNG bytes and return raw engine output: one detected region
/// per line, in the engine's own detection order.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset text regardless of input. Lets the extraction stage and
/// the session be exercised without an engine installed.
pub struct MockRecognizer {
    text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build the preset output from detected regions, one per line.
    pub fn with_regions<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let text = regions
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join("\n");
        Self { text }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_png: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    /// Tesseract wrapper tuned for correctness over latency: the default
    /// LSTM engine with automatic page segmentation, no fast-mode variables.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self {
                data_path,
                lang: lang.to_string(),
            }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_png)
                .map_err(|e| OcrError::ImageRejected(e.to_string()))?;
            lt.get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
