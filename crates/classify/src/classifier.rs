use spamscan_core::Verdict;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification capability is not available")]
    Unavailable,
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Seam for the spam-decision capability. The actual heuristic or model
/// lives behind this trait; this crate ships no decision logic of its own
/// and an implementation plugs in without touching the pipeline.
pub trait SpamClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Verdict, ClassifyError>;
}

/// Default wiring until an on-device model is integrated: reports the
/// capability unavailable on every call, which the stage absorbs into the
/// fixed inconclusive verdict.
pub struct StubClassifier;

impl SpamClassifier for StubClassifier {
    fn classify(&self, _text: &str) -> Result<Verdict, ClassifyError> {
        Err(ClassifyError::Unavailable)
    }
}

/// Returns a preset verdict regardless of input. Test double.
pub struct MockClassifier {
    verdict: Verdict,
}

impl MockClassifier {
    pub fn new(explanation: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::new(explanation),
        }
    }
}

impl SpamClassifier for MockClassifier {
    fn classify(&self, _text: &str) -> Result<Verdict, ClassifyError> {
        Ok(self.verdict.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_unavailable() {
        assert!(matches!(
            StubClassifier.classify("BUY NOW"),
            Err(ClassifyError::Unavailable)
        ));
    }

    #[test]
    fn mock_returns_preset_verdict() {
        let c = MockClassifier::new("Likely spam: urgency wording.");
        let v = c.classify("act now!!!").unwrap();
        assert_eq!(v.explanation(), "Likely spam: urgency wording.");
    }
}
