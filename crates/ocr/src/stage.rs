use std::sync::Arc;

use spamscan_core::{AcquiredImage, RecognizedText};

use crate::preprocess;
use crate::recognizer::OcrBackend;

/// Result of one extraction flight, tagged with the fingerprint of the image
/// it was computed from so the session can drop superseded completions.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub fingerprint: String,
    pub text: RecognizedText,
}

/// Asynchronous text-extraction stage. Decoding and recognition run on a
/// blocking worker, never on the caller's thread. Failures do not cross the
/// stage boundary: an undecodable image or an engine error surfaces as
/// empty text, which callers treat as "nothing recognized, retry allowed".
pub struct TextExtractor {
    recognizer: Arc<dyn OcrBackend>,
}

impl TextExtractor {
    pub fn new(recognizer: Arc<dyn OcrBackend>) -> Self {
        Self { recognizer }
    }

    pub async fn extract(&self, image: &AcquiredImage) -> ExtractionOutcome {
        let fingerprint = image.fingerprint.clone();
        let bytes = image.bytes.clone();
        let recognizer = Arc::clone(&self.recognizer);

        let text = tokio::task::spawn_blocking(move || recognize_lines(&*recognizer, &bytes))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("extraction worker died: {e}");
                RecognizedText::empty()
            });

        tracing::info!(
            fingerprint = %fingerprint,
            lines = text.line_count(),
            "extraction finished"
        );
        ExtractionOutcome { fingerprint, text }
    }
}

fn recognize_lines(recognizer: &dyn OcrBackend, bytes: &[u8]) -> RecognizedText {
    let png = match preprocess::normalize_for_ocr(bytes) {
        Ok(png) => png,
        Err(e) => {
            tracing::warn!("image not decodable, reporting no text: {e}");
            return RecognizedText::empty();
        }
    };

    match recognizer.recognize(&png) {
        Ok(raw) => RecognizedText::from_engine_output(&raw),
        Err(e) => {
            tracing::warn!("recognition failed, reporting no text: {e}");
            RecognizedText::empty()
        }
    }
}
