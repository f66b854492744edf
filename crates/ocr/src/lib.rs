pub mod preprocess;
pub mod recognizer;
pub mod stage;

pub use preprocess::{normalize_for_ocr, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use stage::{ExtractionOutcome, TextExtractor};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
